use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use crate::article::Article;
use crate::text::vocabulary::{
    canonical_form, is_stop_word, HONORIFIC_SUFFIXES, NICKNAME_SUFFIXES, UNIT_REWRITES,
};

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{4e00}-\x{9fa5}A-Za-z0-9]{2,}").expect("token regex is valid") // Static pattern, safe to panic
});

const MIN_TOKEN_CHARS: usize = 2;

/// CJK unified ideographs (basic block), ASCII letters and digits.
pub fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&ch)
}

/// Replaces every character that cannot be part of a token with a space.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .map(|ch| if is_token_char(ch) { ch } else { ' ' })
        .collect()
}

/// Maximal runs of two or more token characters. No segmentation.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = clean_text(text);
    TOKEN_PATTERN
        .find_iter(&cleaned)
        .map(|found| found.as_str().to_string())
        .collect()
}

/// Lower-cases and rewrites a token to its canonical form: honorific
/// suffix dropped, currency units folded, organisation aliases collapsed.
/// `None` when less than two characters survive.
pub fn canonicalize(token: &str) -> Option<String> {
    let lowered = token.trim().to_lowercase();
    let stripped = strip_honorific(&lowered)?;
    let folded = fold_unit(stripped)?;
    let canonical = canonical_form(&folded).map(str::to_string).unwrap_or(folded);
    (canonical.chars().count() >= MIN_TOKEN_CHARS).then_some(canonical)
}

fn strip_honorific(token: &str) -> Option<&str> {
    for suffix in HONORIFIC_SUFFIXES {
        if let Some(stem) = token.strip_suffix(suffix) {
            return (stem.chars().count() >= MIN_TOKEN_CHARS).then_some(stem);
        }
    }
    Some(token)
}

fn fold_unit(token: &str) -> Option<String> {
    for (suffix, replacement) in UNIT_REWRITES {
        if let Some(stem) = token.strip_suffix(suffix) {
            let folded = format!("{}{}", stem, replacement);
            return (folded.chars().count() >= MIN_TOKEN_CHARS).then_some(folded);
        }
    }
    Some(token.to_string())
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|ch| ch.is_ascii_digit())
}

/// Turns raw tokens into word-cloud terms for one query keyword.
///
/// The keyword itself, its honorific forms (`雷军老师`), its canonical
/// alias, and first-character nicknames (`雷总`) are all suppressed so a
/// search never dominates its own word cloud.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    keyword_variants: HashSet<String>,
}

impl TextNormalizer {
    pub fn new(keyword: Option<&str>) -> Self {
        Self {
            keyword_variants: keyword.map(keyword_variants).unwrap_or_default(),
        }
    }

    pub fn is_keyword_variant(&self, token: &str) -> bool {
        self.keyword_variants.contains(token)
    }

    pub fn normalize(&self, token: &str) -> Option<String> {
        let lowered = token.trim().to_lowercase();
        if lowered.chars().count() < MIN_TOKEN_CHARS || self.is_keyword_variant(&lowered) {
            return None;
        }

        let canonical = canonicalize(&lowered)?;
        if is_numeric(&canonical) || is_stop_word(&canonical) || self.is_keyword_variant(&canonical) {
            return None;
        }
        Some(canonical)
    }

    /// Distinct normalized terms of an article's title, content prefix and
    /// publisher name.
    pub fn article_terms(&self, article: &Article, content_chars: usize) -> BTreeSet<String> {
        tokenize(&article.text_source(content_chars))
            .iter()
            .filter_map(|token| self.normalize(token))
            .collect()
    }
}

fn keyword_variants(keyword: &str) -> HashSet<String> {
    let mut variants = HashSet::new();
    let lowered = keyword.trim().to_lowercase();
    if lowered.is_empty() {
        return variants;
    }

    let mut bases: Vec<String> = vec![lowered.clone()];
    bases.extend(tokenize(&lowered));
    let canonical_bases: Vec<String> = bases.iter().filter_map(|base| canonicalize(base)).collect();
    bases.extend(canonical_bases);

    for base in &bases {
        variants.insert(base.clone());
        for suffix in HONORIFIC_SUFFIXES {
            variants.insert(format!("{}{}", base, suffix));
        }
        if let Some(first) = base.chars().next() {
            for suffix in NICKNAME_SUFFIXES {
                variants.insert(format!("{}{}", first, suffix));
            }
        }
    }

    variants
}
