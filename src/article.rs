//! Canonical article record and the lenient coercion applied once at the
//! article-source boundary.
//!
//! Upstream vendors send counts as numbers, numeric strings, `null`, or
//! not at all, and timestamps in seconds or milliseconds. Everything is
//! coerced here so the analytics code only ever sees non-negative integers.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::SECONDS_PER_DAY;

/// Timestamps above this are milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// WeChat publish times without an explicit offset are Beijing time.
const CHINA_OFFSET_SECONDS: i32 = 8 * 60 * 60;

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Article {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub wx_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub read: u64,
    pub praise: u64,
    pub looking: u64,
    pub publish_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_time_str: Option<String>,
}

impl Article {
    /// `publish_time` when set, otherwise the parsed `publish_time_str`.
    pub fn resolved_publish_time(&self) -> Option<i64> {
        if self.publish_time > 0 {
            return Some(self.publish_time);
        }
        self.publish_time_str.as_deref().and_then(parse_publish_time)
    }

    pub fn age_days(&self, now: i64) -> Option<f64> {
        self.resolved_publish_time()
            .map(|published| (now - published) as f64 / SECONDS_PER_DAY as f64)
    }

    pub fn interactions(&self) -> u64 {
        self.praise.saturating_add(self.looking)
    }

    /// Title, the first `content_chars` characters of the body, and the
    /// publisher name, separated by spaces.
    pub fn text_source(&self, content_chars: usize) -> String {
        let prefix: String = self.content.chars().take(content_chars).collect();
        [self.title.as_str(), prefix.as_str(), self.wx_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Value> for Article {
    fn from(value: Value) -> Self {
        let field = |keys: &[&str]| pick(&value, keys);

        let url = coerce_text(field(&["url", "short_link"]));
        let publish_time_str = coerce_text(field(&["publish_time_str", "publishTime", "pub_time"]));

        Article {
            title: coerce_text(field(&["title"])),
            content: coerce_text(field(&["content"])),
            wx_name: coerce_text(field(&["wx_name", "author"])),
            url: Some(url).filter(|url| !url.trim().is_empty()),
            read: coerce_count(field(&["read", "read_count", "readCount"])),
            praise: coerce_count(field(&["praise", "like_count", "likeCount"])),
            looking: coerce_count(field(&["looking", "watch_count", "watchCount"])),
            publish_time: coerce_timestamp(field(&["publish_time"])),
            publish_time_str: Some(publish_time_str).filter(|text| !text.trim().is_empty()),
        }
    }
}

/// Accepts a JSON array of articles, or an object carrying one under
/// `data` or `articles` (the vendor envelope).
pub fn parse_articles(payload: &str) -> Result<Vec<Article>> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| Error::InvalidArticles(format!("malformed JSON: {}", err)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data").or_else(|| map.remove("articles")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidArticles(
                    "expected an array or an object with a `data` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(Error::InvalidArticles(
                "expected an array or an object with a `data` array".to_string(),
            ))
        }
    };

    Ok(items.into_iter().map(Article::from).collect())
}

/// Fills `publish_time` from the string form, keeps articles published
/// within the last `time_range_days` (0 keeps everything), then truncates
/// to `limit` (0 keeps everything).
pub fn prepare_corpus(
    articles: Vec<Article>,
    time_range_days: u32,
    limit: usize,
    now: i64,
) -> Vec<Article> {
    let range_seconds = i64::from(time_range_days) * SECONDS_PER_DAY;

    let mut prepared: Vec<Article> = articles
        .into_iter()
        .map(|mut article| {
            if let Some(published) = article.resolved_publish_time() {
                article.publish_time = published;
                if article.publish_time_str.is_none() {
                    article.publish_time_str = DateTime::<Utc>::from_timestamp(published, 0)
                        .map(|timestamp| timestamp.to_rfc3339());
                }
            }
            article
        })
        .filter(|article| {
            if time_range_days == 0 {
                return true;
            }
            match article.resolved_publish_time() {
                Some(published) => published >= now - range_seconds && published <= now,
                None => false,
            }
        })
        .collect();

    if limit > 0 {
        prepared.truncate(limit);
    }
    prepared
}

/// Non-empty publisher names in order of first appearance.
pub fn distinct_publishers(articles: &[Article]) -> Vec<String> {
    let mut seen = HashSet::new();
    articles
        .iter()
        .map(|article| article.wx_name.trim())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

pub fn parse_publish_time(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return trimmed.parse::<f64>().ok().map(seconds_from_epoch_number);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp());
    }

    let china = FixedOffset::east_opt(CHINA_OFFSET_SECONDS)?;

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return china
                .from_local_datetime(&naive)
                .single()
                .map(|local| local.timestamp());
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return china
                .from_local_datetime(&naive)
                .single()
                .map(|local| local.timestamp());
        }
    }

    None
}

fn pick<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| value.get(*key).filter(|found| !found.is_null()))
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(number)) => {
            if let Some(count) = number.as_u64() {
                return count;
            }
            number
                .as_f64()
                .filter(|count| count.is_finite() && *count > 0.0)
                .map(|count| count.trunc() as u64)
                .unwrap_or(0)
        }
        Some(Value::String(text)) => parse_leading_integer(text)
            .filter(|count| *count > 0)
            .map(|count| count as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

fn coerce_timestamp(value: Option<&Value>) -> i64 {
    let raw = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => parse_leading_integer(text).map(|parsed| parsed as f64),
        _ => None,
    };
    raw.filter(|timestamp| timestamp.is_finite() && *timestamp > 0.0)
        .map(seconds_from_epoch_number)
        .unwrap_or(0)
}

fn seconds_from_epoch_number(value: f64) -> i64 {
    if value > MILLIS_THRESHOLD {
        (value / 1000.0).trunc() as i64
    } else {
        value.trunc() as i64
    }
}

/// `parseInt`-style: optional sign and the leading run of digits.
fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let leading: String = digits.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    if leading.is_empty() {
        return None;
    }
    let parsed = leading.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -parsed } else { parsed })
}
