use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use topic_insight::{prepare_corpus, Article, InsightSuggestion, SortKey, SuggestionOrigin, TopicSections};

use crate::insights::InsightResult;
use crate::store::{AnalysisRecord, InsightReport};

const DEFAULT_TIME_RANGE_DAYS: u32 = 0;
const DEFAULT_ARTICLE_LIMIT: usize = 0;

#[derive(Debug, Deserialize)]
pub struct ApiAnalysisRequest {
    pub keyword: Option<String>,
    #[serde(default)]
    pub articles: Vec<Article>,
    pub time_range_days: Option<u32>,
    pub limit: Option<usize>,
}

impl ApiAnalysisRequest {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<AnalysisRecord, String> {
        let keyword = self.keyword.unwrap_or_default().trim().to_string();
        if keyword.is_empty() {
            return Err("keyword is required".to_string());
        }

        let articles = prepare_corpus(
            self.articles,
            self.time_range_days.unwrap_or(DEFAULT_TIME_RANGE_DAYS),
            self.limit.unwrap_or(DEFAULT_ARTICLE_LIMIT),
            now.timestamp(),
        );
        Ok(AnalysisRecord::new(&keyword, articles, now))
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiArticlesQuery {
    pub sort: Option<String>,
}

impl ApiArticlesQuery {
    pub fn sort_key(&self) -> Result<SortKey, String> {
        match self.sort.as_deref() {
            None => Ok(SortKey::default()),
            Some(value) => value.parse::<SortKey>().map_err(|err| err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiArticlesResponse {
    pub analysis_id: String,
    pub sort: String,
    pub total: usize,
    pub articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
pub struct ApiInsightRequest {
    pub keyword: Option<String>,
    #[serde(alias = "analysisId")]
    pub analysis_id: Option<String>,
    #[serde(default, alias = "forceRefresh")]
    pub force_refresh: bool,
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInsightResponse {
    pub request_id: Option<String>,
    pub insights: Vec<InsightSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_analysis: Option<TopicSections>,
    pub from_cache: bool,
    pub article_count: usize,
    pub avg_engagement_rate: f64,
    pub model_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<SuggestionOrigin>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub warnings: Vec<String>,
}

impl ApiInsightResponse {
    pub fn from_result(result: InsightResult, request_id: Option<String>) -> Self {
        Self {
            request_id,
            insights: result.insights,
            topic_analysis: Some(result.topic_analysis),
            from_cache: result.from_cache,
            article_count: result.article_count,
            avg_engagement_rate: result.avg_engagement_rate,
            model_used: result.model_used,
            origin: result.origin,
            generated_at: result.generated_at,
            expires_at: result.expires_at,
            warnings: result.warnings,
        }
    }

    pub fn from_cached(report: InsightReport) -> Self {
        Self {
            request_id: None,
            insights: report.insights,
            topic_analysis: None,
            from_cache: true,
            article_count: report.article_count,
            avg_engagement_rate: report.avg_engagement_rate,
            model_used: report.model_used,
            origin: None,
            generated_at: report.created_at,
            expires_at: Some(report.expires_at),
            warnings: Vec::new(),
        }
    }
}
