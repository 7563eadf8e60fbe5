pub mod article;
pub mod config;
pub mod distribution;
pub mod engagement;
pub mod error;
pub mod quality;
pub mod ranking;
pub mod report;
pub mod sections;
pub mod suggestions;
pub mod text;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub use article::{distinct_publishers, parse_articles, prepare_corpus, Article};
pub use distribution::{publish_time_distribution, read_count_distribution, Bucket};
pub use engagement::{average_engagement_rate, engagement_rate};
pub use error::{Error, Result};
pub use config::{AnalyticsConfig, LlmConfig, StoreConfig};
pub use quality::{quality_report, validate_article, validate_articles, ArticleQuality, ValidationSummary};
pub use ranking::{sort_articles, SortKey};
pub use report::{build_report, generate_insights, ReportBuilder, ReportConfig};
pub use sections::{build_topic_sections, TopicSections};
pub use suggestions::{
    build_fallback_suggestions, merge_with_fallback, parse_llm_suggestions, resolve_suggestions,
    select_top_articles, InsightConfig, SuggestionOrigin, SuggestionOutcome, FALLBACK_MODEL,
};
pub use text::word_cloud::{extract_top_keywords, WordCloudConfig, WordCloudEngine};

/// One weighted term of a word cloud. `count` is the number of distinct
/// articles containing the term, `score` the summed `log10(read + 10)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCloudTerm {
    pub word: String,
    pub count: usize,
    pub score: f64,
}

/// A content-strategy recommendation. The LLM collaborator and the
/// fallback rules both produce this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSuggestion {
    pub title: String,
    pub reason: String,
    pub data_support: String,
}

impl InsightSuggestion {
    pub fn new(title: impl Into<String>, reason: impl Into<String>, data_support: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reason: reason.into(),
            data_support: data_support.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.reason.trim().is_empty()
            && !self.data_support.trim().is_empty()
    }
}

/// Raw reply of the LLM collaborator, before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub model: String,
    pub content: String,
    pub latency_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLikedArticle {
    pub id: String,
    pub index: usize,
    pub title: String,
    pub wx_name: String,
    pub like_count: u64,
    pub read_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEngagementArticle {
    pub id: String,
    pub index: usize,
    pub title: String,
    pub wx_name: String,
    pub engagement_rate: f64,
    pub engagement_score: f64,
    pub read_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_articles: usize,
    pub avg_engagement_rate: f64,
    pub avg_read_count: u64,
    pub avg_praise_count: u64,
    pub read_count_distribution: [Bucket; 5],
    pub publish_time_distribution: [Bucket; 5],
}

/// Analytics report for one article corpus. Always rebuilt from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub top_liked_articles: Vec<TopLikedArticle>,
    pub top_engagement_articles: Vec<TopEngagementArticle>,
    pub word_cloud: Vec<WordCloudTerm>,
    pub insights: Vec<String>,
    pub summary: ReportSummary,
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

/// Chinese-style count: `12.3万` from ten thousand upwards, grouped digits below.
pub fn format_count_cn(value: f64) -> String {
    if value >= 10_000.0 {
        return format!("{:.1}万", value / 10_000.0);
    }
    format_number(value)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
