use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::article::{distinct_publishers, Article};
use crate::config::AnalyticsConfig;
use crate::distribution::{publish_time_distribution, read_count_distribution};
use crate::engagement::{average_positive, CorpusAverages};
use crate::ranking::{score_articles, top_engagement, top_liked};
use crate::text::{WordCloudConfig, WordCloudEngine};
use crate::{round2, Report, ReportSummary, SECONDS_PER_DAY};

pub const NO_ARTICLES_INSIGHT: &str = "没有找到相关文章数据";
pub const INSUFFICIENT_DATA_INSIGHT: &str = "没有足够的数据生成洞察建议";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub engagement_read_floor: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            engagement_read_floor: 500,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    config: ReportConfig,
    word_cloud: WordCloudEngine,
}

impl ReportBuilder {
    pub fn new(config: ReportConfig, word_cloud: WordCloudConfig) -> Self {
        Self {
            config,
            word_cloud: WordCloudEngine::new(word_cloud),
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.report.clone(), config.word_cloud.clone())
    }

    /// Pure function of the corpus, the optional query keyword and `now`.
    pub fn build(&self, articles: &[Article], keyword: Option<&str>, now: i64) -> Report {
        if articles.is_empty() {
            return empty_report(now);
        }

        let scored = score_articles(articles);
        let rates: Vec<f64> = scored.iter().map(|candidate| candidate.engagement_rate).collect();
        let averages = CorpusAverages::compute(articles);

        let top_liked_articles = top_liked(&scored, self.config.top_n);
        let top_engagement_articles =
            top_engagement(&scored, self.config.engagement_read_floor, self.config.top_n);
        let word_cloud = self.word_cloud.extract(articles, keyword);
        let insights = generate_insights(articles, now);

        debug!(
            articles = articles.len(),
            top_liked = top_liked_articles.len(),
            top_engagement = top_engagement_articles.len(),
            terms = word_cloud.len(),
            "report assembled"
        );

        Report {
            top_liked_articles,
            top_engagement_articles,
            word_cloud,
            insights,
            summary: ReportSummary {
                total_articles: articles.len(),
                avg_engagement_rate: round2(average_positive(&rates)),
                avg_read_count: averages.read.round() as u64,
                avg_praise_count: averages.praise.round() as u64,
                read_count_distribution: read_count_distribution(articles),
                publish_time_distribution: publish_time_distribution(articles, now),
            },
        }
    }
}

pub fn build_report(articles: &[Article], keyword: Option<&str>, now: i64) -> Report {
    ReportBuilder::default().build(articles, keyword, now)
}

fn empty_report(now: i64) -> Report {
    Report {
        top_liked_articles: Vec::new(),
        top_engagement_articles: Vec::new(),
        word_cloud: Vec::new(),
        insights: vec![NO_ARTICLES_INSIGHT.to_string()],
        summary: ReportSummary {
            total_articles: 0,
            avg_engagement_rate: 0.0,
            avg_read_count: 0,
            avg_praise_count: 0,
            read_count_distribution: read_count_distribution(&[]),
            publish_time_distribution: publish_time_distribution(&[], now),
        },
    }
}

/// Templated observations about a corpus. Each sentence has a fixed
/// trigger; the last two are always present.
pub fn generate_insights(articles: &[Article], now: i64) -> Vec<String> {
    if articles.is_empty() {
        return vec![INSUFFICIENT_DATA_INSIGHT.to_string()];
    }

    let averages = CorpusAverages::compute(articles);
    let mut insights = Vec::new();

    if articles
        .iter()
        .any(|article| article.read as f64 > averages.read * 2.0)
    {
        insights.push("高阅读量文章通常具有吸引眼球的标题，建议学习其标题写法".to_string());
    }

    if articles
        .iter()
        .any(|article| article.praise as f64 > averages.praise * 2.0)
    {
        insights.push("高点赞文章内容质量较高，用户认可度好，值得深入分析".to_string());
    }

    let publishers = distinct_publishers(articles);
    if publishers.len() > 1 {
        let named: Vec<&str> = publishers.iter().take(3).map(String::as_str).collect();
        insights.push(format!(
            "多个公众号({}等)都在关注此话题，说明话题热度较高",
            named.join("、")
        ));
    }

    let one_day_ago = now - SECONDS_PER_DAY;
    let recent = articles
        .iter()
        .filter(|article| {
            article
                .resolved_publish_time()
                .map(|published| published > one_day_ago)
                .unwrap_or(false)
        })
        .count();
    if recent as f64 > articles.len() as f64 * 0.5 {
        insights.push("近期文章较多，说明这是当前的热门话题".to_string());
    }

    insights.push("建议结合自身优势，选择差异化的角度进行创作".to_string());
    insights.push("关注高互动文章的内容结构和表达方式".to_string());

    insights
}
