use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::article::Article;
use crate::text::TextNormalizer;
use crate::{round2, WordCloudTerm};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCloudConfig {
    pub limit: usize,
    pub strict_min_docs: usize,
    pub relaxed_min_docs: usize,
    pub min_terms: usize,
    pub content_prefix_chars: usize,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            limit: 15,
            strict_min_docs: 5,
            relaxed_min_docs: 3,
            min_terms: 10,
            content_prefix_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TermStats {
    doc_count: usize,
    score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WordCloudEngine {
    config: WordCloudConfig,
}

impl WordCloudEngine {
    pub fn new(config: WordCloudConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, articles: &[Article], keyword: Option<&str>) -> Vec<WordCloudTerm> {
        self.extract_with_limit(articles, keyword, self.config.limit)
    }

    pub fn extract_with_limit(
        &self,
        articles: &[Article],
        keyword: Option<&str>,
        limit: usize,
    ) -> Vec<WordCloudTerm> {
        let normalizer = TextNormalizer::new(keyword);
        let mut stats: BTreeMap<String, TermStats> = BTreeMap::new();

        for article in articles {
            let terms = normalizer.article_terms(article, self.config.content_prefix_chars);
            if terms.is_empty() {
                continue;
            }
            // Zero-read articles still contribute log10(10) = 1.
            let heat = (article.read as f64 + 10.0).log10();
            for term in terms {
                let entry = stats.entry(term).or_default();
                entry.doc_count += 1;
                entry.score += heat;
            }
        }

        let mut selected = self.filter_by_document_frequency(stats);
        selected.sort_by(|(word_a, a), (word_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.doc_count.cmp(&a.doc_count))
                .then_with(|| word_a.cmp(word_b))
        });

        selected
            .into_iter()
            .take(limit)
            .map(|(word, stats)| WordCloudTerm {
                word,
                count: stats.doc_count,
                score: round2(stats.score),
            })
            .collect()
    }

    /// Strict threshold first, then relaxed, then everything, stopping at
    /// the first level that leaves at least `min_terms` terms.
    fn filter_by_document_frequency(
        &self,
        stats: BTreeMap<String, TermStats>,
    ) -> Vec<(String, TermStats)> {
        let all: Vec<(String, TermStats)> = stats.into_iter().collect();

        for min_docs in [self.config.strict_min_docs, self.config.relaxed_min_docs] {
            let survivors = all
                .iter()
                .filter(|(_, stats)| stats.doc_count >= min_docs)
                .count();
            if survivors >= self.config.min_terms {
                debug!(min_docs, survivors, "word cloud document-frequency threshold");
                return all
                    .into_iter()
                    .filter(|(_, stats)| stats.doc_count >= min_docs)
                    .collect();
            }
        }

        debug!(terms = all.len(), "word cloud using unfiltered terms");
        all
    }
}

/// Top `limit` terms of a corpus with default settings.
pub fn extract_top_keywords(
    articles: &[Article],
    keyword: Option<&str>,
    limit: usize,
) -> Vec<WordCloudTerm> {
    WordCloudEngine::default().extract_with_limit(articles, keyword, limit)
}
