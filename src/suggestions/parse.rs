use serde_json::Value;
use tracing::warn;

use crate::InsightSuggestion;

const MAX_TITLE_CHARS: usize = 15;

/// Lenient parse of an LLM reply into suggestions. Accepts prose around a
/// `{"suggestions": [...]}` object or a bare array. Items missing any of the
/// three fields are dropped; a reply that is not JSON yields nothing.
pub fn parse_llm_suggestions(content: &str) -> Vec<InsightSuggestion> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let payload = if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        extract_json(trimmed).unwrap_or_else(|| trimmed.to_string())
    };

    let parsed: Value = match serde_json::from_str(&payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "LLM reply is not valid JSON");
            return Vec::new();
        }
    };

    let items: &[Value] = match &parsed {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("suggestions") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_suggestion(item, index))
        .filter(InsightSuggestion::is_complete)
        .collect()
}

fn normalize_suggestion(item: &Value, index: usize) -> InsightSuggestion {
    let title: String = first_text(item, &["title", "Title", "name"])
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let title = match title.trim() {
        "" => format!("洞察建议{}", index + 1),
        trimmed => trimmed.to_string(),
    };

    InsightSuggestion {
        title,
        reason: first_text(item, &["reason", "insight", "description"]),
        data_support: first_text(item, &["data_support", "dataSupport", "data"]),
    }
}

/// First non-empty value among `keys`, rendered as trimmed text.
fn first_text(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .filter_map(value_text)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}
