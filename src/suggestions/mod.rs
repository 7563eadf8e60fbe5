pub mod fallback;
pub mod parse;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::article::Article;
use crate::{InsightSuggestion, LlmResponse};

pub use fallback::{build_fallback_suggestions, FallbackStats, KeywordDomain};
pub use parse::parse_llm_suggestions;

/// Model label recorded when no LLM output was used at all.
pub const FALLBACK_MODEL: &str = "fallback-rules";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Articles handed to the LLM and the fallback rules.
    pub top_articles: usize,
    pub min_llm_suggestions: usize,
    pub max_suggestions: usize,
    pub cache_ttl_hours: i64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            top_articles: 10,
            min_llm_suggestions: 3,
            max_suggestions: 5,
            cache_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionOrigin {
    Llm,
    LlmToppedUp,
    Fallback,
}

impl SuggestionOrigin {
    pub fn label(self) -> &'static str {
        match self {
            SuggestionOrigin::Llm => "llm",
            SuggestionOrigin::LlmToppedUp => "llm_topped_up",
            SuggestionOrigin::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionOutcome {
    pub suggestions: Vec<InsightSuggestion>,
    pub origin: SuggestionOrigin,
    pub model_used: String,
}

/// Most-praised articles first. Stable, so ties keep input order.
pub fn select_top_articles(articles: &[Article], n: usize) -> Vec<Article> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| b.praise.cmp(&a.praise));
    sorted.into_iter().take(n).cloned().collect()
}

/// Caps parsed LLM suggestions at `max_suggestions`; below
/// `min_llm_suggestions` the list is topped up from the fallback rules,
/// skipping titles already present.
pub fn merge_with_fallback(
    parsed: Vec<InsightSuggestion>,
    keyword: &str,
    articles: &[Article],
    now: i64,
    config: &InsightConfig,
) -> Vec<InsightSuggestion> {
    let mut merged = parsed;
    merged.truncate(config.max_suggestions);
    if merged.len() >= config.min_llm_suggestions {
        return merged;
    }

    let mut seen: HashSet<String> = merged.iter().map(|s| normalize_title(&s.title)).collect();
    for suggestion in build_fallback_suggestions(keyword, articles, now) {
        if merged.len() >= config.max_suggestions {
            break;
        }
        let normalized = normalize_title(&suggestion.title);
        if normalized.is_empty() || seen.contains(&normalized) {
            continue;
        }
        seen.insert(normalized);
        merged.push(suggestion);
    }
    merged
}

/// Final suggestion list for a keyword. `llm` is the raw reply when the
/// collaborator answered; `None` covers every failure mode.
pub fn resolve_suggestions(
    keyword: &str,
    articles: &[Article],
    llm: Option<&LlmResponse>,
    now: i64,
    config: &InsightConfig,
) -> SuggestionOutcome {
    let parsed = llm
        .map(|response| parse_llm_suggestions(&response.content))
        .unwrap_or_default();

    let Some(response) = llm.filter(|_| !parsed.is_empty()) else {
        info!(keyword, articles = articles.len(), "using fallback suggestions");
        let mut suggestions = build_fallback_suggestions(keyword, articles, now);
        suggestions.truncate(config.max_suggestions);
        return SuggestionOutcome {
            suggestions,
            origin: SuggestionOrigin::Fallback,
            model_used: FALLBACK_MODEL.to_string(),
        };
    };

    let parsed_count = parsed.len();
    let suggestions = merge_with_fallback(parsed, keyword, articles, now, config);
    let origin = if parsed_count >= config.min_llm_suggestions {
        SuggestionOrigin::Llm
    } else {
        SuggestionOrigin::LlmToppedUp
    };
    debug!(
        keyword,
        parsed = parsed_count,
        total = suggestions.len(),
        origin = origin.label(),
        "suggestions resolved"
    );

    SuggestionOutcome {
        suggestions,
        origin,
        model_used: response.model.clone(),
    }
}

fn normalize_title(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
