use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use topic_insight::{average_engagement_rate, Article, InsightSuggestion};

const MAX_ANALYSES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
    pub status: AnalysisStatus,
    pub total_articles: usize,
    pub avg_engagement_rate: f64,
    pub articles: Vec<Article>,
}

impl AnalysisRecord {
    pub fn new(keyword: &str, articles: Vec<Article>, created_at: DateTime<Utc>) -> Self {
        let status = if articles.is_empty() {
            AnalysisStatus::Empty
        } else {
            AnalysisStatus::Completed
        };
        Self {
            id: record_id("analysis", keyword, created_at),
            keyword: keyword.to_string(),
            created_at,
            status,
            total_articles: articles.len(),
            avg_engagement_rate: average_engagement_rate(&articles),
            articles,
        }
    }
}

/// Listing view without the article payload.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub id: String,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
    pub status: AnalysisStatus,
    pub total_articles: usize,
    pub avg_engagement_rate: f64,
}

impl From<&AnalysisRecord> for AnalysisSummary {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id.clone(),
            keyword: record.keyword.clone(),
            created_at: record.created_at,
            status: record.status,
            total_articles: record.total_articles,
            avg_engagement_rate: record.avg_engagement_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub id: String,
    pub keyword: String,
    pub insights: Vec<InsightSuggestion>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub article_count: usize,
    pub avg_engagement_rate: f64,
    pub model_used: String,
    #[serde(default)]
    pub analysis_id: Option<String>,
}

impl InsightReport {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Everything needed to cache one insight generation.
#[derive(Debug, Clone)]
pub struct NewInsightReport {
    pub keyword: String,
    pub insights: Vec<InsightSuggestion>,
    pub article_count: usize,
    pub avg_engagement_rate: f64,
    pub model_used: String,
    pub analysis_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    analyses: Vec<AnalysisRecord>,
    #[serde(default)]
    insight_reports: Vec<InsightReport>,
}

pub struct AnalysisStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl AnalysisStore {
    pub async fn load(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read store {}", path.display()))?;
            if raw.trim().is_empty() {
                StoreData::default()
            } else {
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse store {}", path.display()))?
            }
        } else {
            StoreData::default()
        };

        debug!(
            path = %path.display(),
            analyses = data.analyses.len(),
            insight_reports = data.insight_reports.len(),
            "store loaded"
        );
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub async fn list_analyses(&self) -> Vec<AnalysisSummary> {
        let guard = self.data.lock().await;
        guard.analyses.iter().map(AnalysisSummary::from).collect()
    }

    pub async fn get_analysis(&self, analysis_id: &str) -> Option<AnalysisRecord> {
        let guard = self.data.lock().await;
        guard
            .analyses
            .iter()
            .find(|record| record.id == analysis_id)
            .cloned()
    }

    /// Newest first; the oldest analyses fall off past the retention cap.
    pub async fn add_analysis(&self, record: AnalysisRecord) -> Result<AnalysisRecord> {
        let mut guard = self.data.lock().await;
        guard.analyses.insert(0, record.clone());
        guard.analyses.truncate(MAX_ANALYSES);
        self.persist(&guard).await?;
        info!(id = %record.id, keyword = %record.keyword, articles = record.total_articles, "analysis stored");
        Ok(record)
    }

    pub async fn delete_analysis(&self, analysis_id: &str) -> Result<bool> {
        let mut guard = self.data.lock().await;
        let before = guard.analyses.len();
        guard.analyses.retain(|record| record.id != analysis_id);
        let removed = guard.analyses.len() != before;
        if removed {
            self.persist(&guard).await?;
        }
        Ok(removed)
    }

    pub async fn save_insight_report(
        &self,
        report: NewInsightReport,
        ttl_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<InsightReport> {
        let stored = InsightReport {
            id: record_id("insight", &report.keyword, now),
            keyword: report.keyword,
            insights: report.insights,
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
            article_count: report.article_count,
            avg_engagement_rate: report.avg_engagement_rate,
            model_used: report.model_used,
            analysis_id: report.analysis_id,
        };

        let mut guard = self.data.lock().await;
        guard.insight_reports.insert(0, stored.clone());
        self.persist(&guard).await?;
        Ok(stored)
    }

    /// Newest unexpired report for `keyword`.
    pub async fn valid_insight_report(&self, keyword: &str, now: DateTime<Utc>) -> Option<InsightReport> {
        let guard = self.data.lock().await;
        guard
            .insight_reports
            .iter()
            .filter(|report| report.keyword == keyword && report.is_valid_at(now))
            .max_by_key(|report| report.created_at)
            .cloned()
    }

    pub async fn delete_insight_reports(&self, keyword: &str) -> Result<usize> {
        let mut guard = self.data.lock().await;
        let before = guard.insight_reports.len();
        guard.insight_reports.retain(|report| report.keyword != keyword);
        let removed = before - guard.insight_reports.len();
        if removed > 0 {
            self.persist(&guard).await?;
        }
        Ok(removed)
    }

    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut guard = self.data.lock().await;
        let before = guard.insight_reports.len();
        guard.insight_reports.retain(|report| report.is_valid_at(now));
        let removed = before - guard.insight_reports.len();
        if removed > 0 {
            debug!(removed, "expired insight reports removed");
            self.persist(&guard).await?;
        }
        Ok(removed)
    }

    async fn persist(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(data).context("failed to serialize store")?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("failed to finalize {}", self.path.display()))?;
        Ok(())
    }
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("failed to create store dir {}", path.display()))
}

fn record_id(kind: &str, keyword: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(keyword.as_bytes());
    hasher.update(created_at.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().unwrap()
    }

    fn article(title: &str, read: u64, praise: u64) -> Article {
        Article {
            title: title.to_string(),
            wx_name: "号".to_string(),
            read,
            praise,
            ..Article::default()
        }
    }

    fn report(keyword: &str) -> NewInsightReport {
        NewInsightReport {
            keyword: keyword.to_string(),
            insights: vec![InsightSuggestion::new("t", "r", "d")],
            article_count: 1,
            avg_engagement_rate: 2.5,
            model_used: "fallback-rules".to_string(),
            analysis_id: None,
        }
    }

    #[tokio::test]
    async fn analyses_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = AnalysisStore::load(path.clone()).await.unwrap();
        let record = AnalysisRecord::new("AI", vec![article("a", 100, 10)], at(1_700_000_000));
        let stored = store.add_analysis(record).await.unwrap();
        assert_eq!(stored.status, AnalysisStatus::Completed);
        assert_eq!(stored.id.len(), 16);

        let reloaded = AnalysisStore::load(path).await.unwrap();
        let fetched = reloaded.get_analysis(&stored.id).await.unwrap();
        assert_eq!(fetched.articles.len(), 1);
        assert_eq!(fetched.articles[0].praise, 10);
        assert_eq!(reloaded.list_analyses().await.len(), 1);

        assert!(reloaded.delete_analysis(&stored.id).await.unwrap());
        assert!(!reloaded.delete_analysis(&stored.id).await.unwrap());
        assert!(reloaded.list_analyses().await.is_empty());
    }

    #[tokio::test]
    async fn insight_cache_honours_ttl() {
        let dir = TempDir::new().unwrap();
        let store = AnalysisStore::load(dir.path().join("store.json")).await.unwrap();
        let created = at(1_700_000_000);

        store.save_insight_report(report("AI"), 24, created).await.unwrap();

        let fresh = store
            .valid_insight_report("AI", created + Duration::hours(23))
            .await;
        assert!(fresh.is_some());
        assert!(store
            .valid_insight_report("AI", created + Duration::hours(24))
            .await
            .is_none());
        assert!(store.valid_insight_report("other", created).await.is_none());

        let removed = store
            .cleanup_expired(created + Duration::hours(25))
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn force_refresh_drops_keyword_reports() {
        let dir = TempDir::new().unwrap();
        let store = AnalysisStore::load(dir.path().join("store.json")).await.unwrap();
        let now = at(1_700_000_000);

        store.save_insight_report(report("AI"), 24, now).await.unwrap();
        store
            .save_insight_report(report("AI"), 24, now + Duration::seconds(1))
            .await
            .unwrap();
        store.save_insight_report(report("育儿"), 24, now).await.unwrap();

        assert_eq!(store.delete_insight_reports("AI").await.unwrap(), 2);
        assert!(store.valid_insight_report("AI", now).await.is_none());
        assert!(store.valid_insight_report("育儿", now).await.is_some());
    }
}
