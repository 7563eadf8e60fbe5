use tracing::warn;

use crate::article::Article;
use crate::round2;

/// `(praise + looking) / read * 100`, rounded to two decimals.
///
/// Zero when the article has no reads, or when either interaction count
/// exceeds the read count (upstream counters are known to be unreliable).
pub fn engagement_rate(article: &Article) -> f64 {
    if article.read == 0 {
        return 0.0;
    }

    if is_corrupted(article) {
        warn!(
            title = %article.title,
            read = article.read,
            praise = article.praise,
            looking = article.looking,
            "interaction counts exceed reads, engagement treated as zero"
        );
        return 0.0;
    }

    round2(article.interactions() as f64 / article.read as f64 * 100.0)
}

pub fn is_corrupted(article: &Article) -> bool {
    article.read > 0 && (article.praise > article.read || article.looking > article.read)
}

/// Mean engagement over articles with a positive rate. Articles without
/// interactions (or with corrupted counters) do not pull the mean down.
pub fn average_engagement_rate(articles: &[Article]) -> f64 {
    let rates: Vec<f64> = articles.iter().map(engagement_rate).collect();
    average_positive(&rates)
}

pub fn average_positive(rates: &[f64]) -> f64 {
    let valid: Vec<f64> = rates.iter().copied().filter(|rate| *rate > 0.0).collect();
    if valid.is_empty() {
        return 0.0;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

/// Plain averages over a corpus. All zero for an empty corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorpusAverages {
    pub read: f64,
    pub praise: f64,
    pub looking: f64,
}

impl CorpusAverages {
    pub fn compute(articles: &[Article]) -> Self {
        if articles.is_empty() {
            return Self::default();
        }
        let total = articles.len() as f64;
        let sum = |select: fn(&Article) -> u64| -> f64 {
            articles.iter().map(|article| select(article) as f64).sum::<f64>()
        };
        Self {
            read: sum(|article| article.read) / total,
            praise: sum(|article| article.praise) / total,
            looking: sum(|article| article.looking) / total,
        }
    }
}

/// Pooled rate `sum(praise + looking) / sum(read) * 100`, used for the
/// headline figure stored alongside cached insights.
pub fn pooled_engagement_rate(articles: &[Article]) -> f64 {
    let total_read: f64 = articles.iter().map(|article| article.read as f64).sum();
    if total_read <= 0.0 {
        return 0.0;
    }
    let total_interactions: f64 = articles
        .iter()
        .map(|article| article.interactions() as f64)
        .sum();
    round2(total_interactions / total_read * 100.0)
}
