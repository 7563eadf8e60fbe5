use chrono::{DateTime, Utc};
use tracing::{info, warn};

use topic_insight::engagement::pooled_engagement_rate;
use topic_insight::{
    build_topic_sections, resolve_suggestions, round2, select_top_articles, AnalyticsConfig, Article,
    InsightSuggestion, SuggestionOrigin, SuggestionOutcome, TopicSections,
};

use crate::llm::LlmClient;
use crate::store::{AnalysisStore, NewInsightReport};

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("keyword is required")]
    MissingKeyword,

    #[error("analysis_id is required to load articles")]
    MissingAnalysis,

    #[error("analysis not found: {0}")]
    AnalysisNotFound(String),

    #[error("analysis {0} has no articles to analyze")]
    NoArticles(String),
}

#[derive(Debug, Clone)]
pub struct InsightResult {
    pub insights: Vec<InsightSuggestion>,
    pub topic_analysis: TopicSections,
    pub from_cache: bool,
    pub article_count: usize,
    pub avg_engagement_rate: f64,
    pub model_used: String,
    /// `None` when served from cache.
    pub origin: Option<SuggestionOrigin>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub warnings: Vec<String>,
}

/// Progress hook, called with an event name and a message.
pub type Progress<'a> = &'a (dyn Fn(&str, &str) + Send + Sync);

pub struct InsightRequest<'a> {
    pub keyword: &'a str,
    pub analysis_id: Option<&'a str>,
    pub force_refresh: bool,
}

/// Asks the LLM (when configured) and resolves the final suggestion list.
/// Any LLM failure degrades to the fallback rules and is reported as a
/// warning.
pub async fn suggest(
    llm: Option<&LlmClient>,
    keyword: &str,
    top_articles: &[Article],
    config: &AnalyticsConfig,
    now: i64,
    progress: Progress<'_>,
) -> (SuggestionOutcome, Vec<String>) {
    let mut warnings = Vec::new();

    let response = match llm {
        Some(client) if !top_articles.is_empty() => {
            info!(keyword, model = client.model(), articles = top_articles.len(), "requesting LLM suggestions");
            progress("calling", "Calling LLM");
            match client.suggest_topics(keyword, top_articles).await {
                Ok(response) => {
                    progress("received", "Received LLM response");
                    Some(response)
                }
                Err(err) => {
                    warn!(keyword, error = %err, "LLM suggestion call failed");
                    progress("error", "LLM call failed");
                    warnings.push(format!("AI generation failed: {}", err));
                    None
                }
            }
        }
        Some(_) => None,
        None => {
            warnings.push("AI generation not configured: set OPENROUTER_API_KEY".to_string());
            None
        }
    };

    progress("merge", "Resolving suggestions");
    let outcome = resolve_suggestions(keyword, top_articles, response.as_ref(), now, &config.insights);
    (outcome, warnings)
}

/// Cache-aware insight generation for a stored analysis.
pub async fn generate(
    store: &AnalysisStore,
    llm: Option<&LlmClient>,
    config: &AnalyticsConfig,
    request: InsightRequest<'_>,
    now: DateTime<Utc>,
    progress: Progress<'_>,
) -> Result<InsightResult, InsightError> {
    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return Err(InsightError::MissingKeyword);
    }

    if let Err(err) = store.cleanup_expired(now).await {
        warn!(error = %err, "failed to clean up expired insight reports");
    }

    let cached = if request.force_refresh {
        match store.delete_insight_reports(keyword).await {
            Ok(removed) if removed > 0 => info!(keyword, removed, "force refresh dropped cached reports"),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "failed to drop cached reports"),
        }
        None
    } else {
        store.valid_insight_report(keyword, now).await
    };

    let analysis_id = request.analysis_id.ok_or(InsightError::MissingAnalysis)?;
    let record = store
        .get_analysis(analysis_id)
        .await
        .ok_or_else(|| InsightError::AnalysisNotFound(analysis_id.to_string()))?;
    if record.articles.is_empty() {
        return Err(InsightError::NoArticles(analysis_id.to_string()));
    }

    let top = select_top_articles(&record.articles, config.insights.top_articles);
    let avg_engagement_rate = round2(pooled_engagement_rate(&top));

    let result = match cached {
        Some(report) => {
            info!(keyword, report = %report.id, "serving cached insight report");
            InsightResult {
                topic_analysis: build_topic_sections(keyword, &top, &report.insights, now.timestamp()),
                insights: report.insights,
                from_cache: true,
                article_count: top.len(),
                avg_engagement_rate,
                model_used: report.model_used,
                origin: None,
                generated_at: report.created_at,
                expires_at: Some(report.expires_at),
                warnings: Vec::new(),
            }
        }
        None => {
            progress("start", "Preparing prompt");
            let (outcome, mut warnings) =
                suggest(llm, keyword, &top, config, now.timestamp(), progress).await;

            let saved = store
                .save_insight_report(
                    NewInsightReport {
                        keyword: keyword.to_string(),
                        insights: outcome.suggestions.clone(),
                        article_count: top.len(),
                        avg_engagement_rate,
                        model_used: outcome.model_used.clone(),
                        analysis_id: Some(analysis_id.to_string()),
                    },
                    config.insights.cache_ttl_hours,
                    now,
                )
                .await;
            let expires_at = match saved {
                Ok(report) => Some(report.expires_at),
                Err(err) => {
                    warn!(error = %err, "failed to cache insight report");
                    warnings.push(format!("insight cache not updated: {}", err));
                    None
                }
            };

            InsightResult {
                topic_analysis: build_topic_sections(keyword, &top, &outcome.suggestions, now.timestamp()),
                insights: outcome.suggestions,
                from_cache: false,
                article_count: top.len(),
                avg_engagement_rate,
                model_used: outcome.model_used,
                origin: Some(outcome.origin),
                generated_at: now,
                expires_at,
                warnings,
            }
        }
    };

    progress("done", "Insights ready");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AnalysisRecord;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn quiet(_: &str, _: &str) {}

    fn articles() -> Vec<Article> {
        (0..4)
            .map(|i| Article {
                title: format!("育儿经验分享{}", i),
                wx_name: format!("号{}", i % 2),
                read: 1000 + i * 100,
                praise: 10 * (i + 1),
                looking: 5,
                ..Article::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn fallback_result_is_cached() {
        let dir = TempDir::new().unwrap();
        let store = AnalysisStore::load(dir.path().join("store.json")).await.unwrap();
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let record = store
            .add_analysis(AnalysisRecord::new("育儿", articles(), now))
            .await
            .unwrap();
        let config = AnalyticsConfig::default();

        let request = InsightRequest {
            keyword: "育儿",
            analysis_id: Some(&record.id),
            force_refresh: false,
        };
        let first = generate(&store, None, &config, request, now, &quiet).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.origin, Some(SuggestionOrigin::Fallback));
        assert_eq!(first.model_used, "fallback-rules");
        assert_eq!(first.insights.len(), 4);
        assert_eq!(first.article_count, 4);

        let request = InsightRequest {
            keyword: "育儿",
            analysis_id: Some(&record.id),
            force_refresh: false,
        };
        let second = generate(&store, None, &config, request, now, &quiet).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.insights, first.insights);
    }

    #[tokio::test]
    async fn unknown_analysis_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = AnalysisStore::load(dir.path().join("store.json")).await.unwrap();
        let request = InsightRequest {
            keyword: "AI",
            analysis_id: Some("missing"),
            force_refresh: true,
        };
        let err = generate(&store, None, &AnalyticsConfig::default(), request, Utc::now(), &quiet)
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::AnalysisNotFound(_)));
    }
}
