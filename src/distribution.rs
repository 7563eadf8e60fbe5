use serde::{Deserialize, Serialize};

use crate::article::Article;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub range: String,
    pub label: String,
    pub count: usize,
}

/// `(range, label, inclusive upper bound)`; the last bucket is open-ended.
const READ_BUCKETS: [(&str, &str, u64); 5] = [
    ("0-1000", "0-1k", 1_000),
    ("1001-5000", "1k-5k", 5_000),
    ("5001-10000", "5k-10k", 10_000),
    ("10001-50000", "10k-50k", 50_000),
    ("50001+", "50k+", u64::MAX),
];

/// `(range, label, inclusive upper bound in days)`.
const RECENCY_BUCKETS: [(&str, &str, f64); 5] = [
    ("0-1", "1天内", 1.0),
    ("1-3", "1-3天", 3.0),
    ("3-7", "3-7天", 7.0),
    ("7-30", "7-30天", 30.0),
    ("30+", "30天前", f64::INFINITY),
];

pub fn read_bucket_index(read: u64) -> usize {
    READ_BUCKETS
        .iter()
        .position(|(_, _, upper)| read <= *upper)
        .unwrap_or(READ_BUCKETS.len() - 1)
}

/// Articles without a resolvable publish time land in the oldest bucket.
pub fn recency_bucket_index(age_days: Option<f64>) -> usize {
    let last = RECENCY_BUCKETS.len() - 1;
    match age_days {
        Some(age) if age.is_finite() => RECENCY_BUCKETS
            .iter()
            .position(|(_, _, upper)| age <= *upper)
            .unwrap_or(last),
        _ => last,
    }
}

pub fn read_count_distribution(articles: &[Article]) -> [Bucket; 5] {
    let mut buckets: [Bucket; 5] = std::array::from_fn(|index| {
        let (range, label, _) = READ_BUCKETS[index];
        empty_bucket(range, label)
    });
    for article in articles {
        buckets[read_bucket_index(article.read)].count += 1;
    }
    buckets
}

/// Buckets by age relative to `now` (unix seconds).
pub fn publish_time_distribution(articles: &[Article], now: i64) -> [Bucket; 5] {
    let mut buckets: [Bucket; 5] = std::array::from_fn(|index| {
        let (range, label, _) = RECENCY_BUCKETS[index];
        empty_bucket(range, label)
    });
    for article in articles {
        buckets[recency_bucket_index(article.age_days(now))].count += 1;
    }
    buckets
}

fn empty_bucket(range: &str, label: &str) -> Bucket {
    Bucket {
        range: range.to_string(),
        label: label.to_string(),
        count: 0,
    }
}
