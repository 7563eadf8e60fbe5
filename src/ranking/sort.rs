use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::article::Article;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Praise,
    Read,
    PublishTime,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "praise" | "likes" | "like" => Ok(SortKey::Praise),
            "read" | "reads" => Ok(SortKey::Read),
            "publish_time" | "time" | "recent" => Ok(SortKey::PublishTime),
            _ => Err(Error::InvalidSortKey(value.to_string())),
        }
    }
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Praise => "praise",
            SortKey::Read => "read",
            SortKey::PublishTime => "publish_time",
        }
    }
}

/// Descending by `key`, then praise, read, and resolved publish time.
pub fn sort_articles(articles: &[Article], key: SortKey) -> Vec<&Article> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| compare_articles(a, b, key));
    sorted
}

pub fn compare_articles(a: &Article, b: &Article, key: SortKey) -> Ordering {
    let timestamp = |article: &Article| article.resolved_publish_time().unwrap_or(0);

    let primary = match key {
        SortKey::Praise => b.praise.cmp(&a.praise),
        SortKey::Read => b.read.cmp(&a.read),
        SortKey::PublishTime => timestamp(b).cmp(&timestamp(a)),
    };

    primary
        .then_with(|| b.praise.cmp(&a.praise))
        .then_with(|| b.read.cmp(&a.read))
        .then_with(|| timestamp(b).cmp(&timestamp(a)))
}
