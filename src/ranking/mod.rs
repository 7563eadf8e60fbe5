pub mod sort;
pub mod top;

pub use sort::{compare_articles, sort_articles, SortKey};
pub use top::{engagement_score, score_articles, top_engagement, top_liked, ScoredArticle};
