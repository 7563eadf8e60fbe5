use std::cmp::Ordering;

use crate::article::Article;
use crate::engagement::engagement_rate;
use crate::{TopEngagementArticle, TopLikedArticle};

/// An article with its engagement figures computed once, keyed by its
/// position in the corpus (titles are not unique).
#[derive(Debug, Clone)]
pub struct ScoredArticle<'a> {
    pub index: usize,
    pub article: &'a Article,
    pub engagement_rate: f64,
    pub engagement_score: f64,
}

impl<'a> ScoredArticle<'a> {
    pub fn new(index: usize, article: &'a Article) -> Self {
        let engagement_rate = engagement_rate(article);
        Self {
            index,
            article,
            engagement_rate,
            engagement_score: engagement_score(engagement_rate, article.read),
        }
    }
}

/// `rate * log10(read + 1)`: damps high rates on articles with little reach.
pub fn engagement_score(engagement_rate: f64, read: u64) -> f64 {
    engagement_rate * (read as f64 + 1.0).log10()
}

pub fn score_articles(articles: &[Article]) -> Vec<ScoredArticle<'_>> {
    articles
        .iter()
        .enumerate()
        .map(|(index, article)| ScoredArticle::new(index, article))
        .collect()
}

/// Articles with at least one like, most liked first. Ties keep input order.
pub fn top_liked(scored: &[ScoredArticle<'_>], limit: usize) -> Vec<TopLikedArticle> {
    let mut liked: Vec<&ScoredArticle<'_>> = scored
        .iter()
        .filter(|candidate| candidate.article.praise > 0)
        .collect();
    liked.sort_by(|a, b| b.article.praise.cmp(&a.article.praise));

    liked
        .into_iter()
        .take(limit)
        .map(|candidate| TopLikedArticle {
            id: candidate.article.title.clone(),
            index: candidate.index,
            title: candidate.article.title.clone(),
            wx_name: candidate.article.wx_name.clone(),
            like_count: candidate.article.praise,
            read_count: candidate.article.read,
            url: candidate.article.url.clone(),
        })
        .collect()
}

/// Articles with at least `read_floor` reads and a positive rate, ordered
/// by engagement score. The floor keeps one like on ten reads out.
pub fn top_engagement(
    scored: &[ScoredArticle<'_>],
    read_floor: u64,
    limit: usize,
) -> Vec<TopEngagementArticle> {
    let mut engaged: Vec<&ScoredArticle<'_>> = scored
        .iter()
        .filter(|candidate| candidate.article.read >= read_floor && candidate.engagement_rate > 0.0)
        .collect();
    engaged.sort_by(|a, b| {
        b.engagement_score
            .partial_cmp(&a.engagement_score)
            .unwrap_or(Ordering::Equal)
    });

    engaged
        .into_iter()
        .take(limit)
        .map(|candidate| TopEngagementArticle {
            id: candidate.article.title.clone(),
            index: candidate.index,
            title: candidate.article.title.clone(),
            wx_name: candidate.article.wx_name.clone(),
            engagement_rate: candidate.engagement_rate,
            engagement_score: crate::round2(candidate.engagement_score),
            read_count: candidate.article.read,
            url: candidate.article.url.clone(),
        })
        .collect()
}
