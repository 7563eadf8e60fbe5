//! Data-quality checks for imported articles. Purely diagnostic: nothing
//! here filters or mutates the corpus.

use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::{format_float, SECONDS_PER_DAY};

const VALID_SCORE: u32 = 70;
const ERROR_SCORE: u32 = 30;
const ISSUE_PENALTY: f64 = 10.0;
const MAX_PENALTY: f64 = 70.0;
const STALE_DAYS: f64 = 365.0;
const MIN_CONTENT_CHARS: usize = 100;
const MAX_CONTENT_CHARS: usize = 100_000;
const SUSPICIOUS_ENGAGEMENT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatus {
    pub title: bool,
    pub content: bool,
    pub read: bool,
    pub praise: bool,
    pub looking: bool,
    pub url: bool,
    pub wx_name: bool,
    pub publish_time: bool,
}

impl FieldStatus {
    fn of(article: &Article) -> Self {
        Self {
            title: !article.title.trim().is_empty(),
            content: !article.content.trim().is_empty(),
            // Counts are coerced to non-negative integers at the boundary.
            read: true,
            praise: true,
            looking: true,
            url: article
                .url
                .as_deref()
                .map(|url| url.starts_with("http"))
                .unwrap_or(false),
            wx_name: !article.wx_name.trim().is_empty(),
            publish_time: article.publish_time > 0,
        }
    }

    fn present(&self) -> usize {
        [
            self.title,
            self.content,
            self.read,
            self.praise,
            self.looking,
            self.url,
            self.wx_name,
            self.publish_time,
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }

    const TOTAL: usize = 8;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuality {
    pub issues: Vec<String>,
    pub quality_score: u32,
    pub fields: FieldStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub summary: String,
    pub validation: ValidationSummary,
    pub details: Vec<ArticleQuality>,
    pub recommendations: Vec<String>,
}

pub fn validate_article(article: &Article, now: i64) -> ArticleQuality {
    let fields = FieldStatus::of(article);
    let mut issues = Vec::new();

    if !fields.title {
        issues.push("标题缺失或为空".to_string());
    }
    if !fields.content {
        issues.push("内容缺失或为空".to_string());
    }
    if !fields.wx_name {
        issues.push("公众号名称缺失".to_string());
    }
    if !fields.url {
        issues.push("文章链接缺失或格式错误".to_string());
    }
    if !fields.publish_time {
        issues.push("发布时间无效".to_string());
    }

    let (read, praise, looking) = (article.read, article.praise, article.looking);
    if read == 0 {
        issues.push("阅读量为0，可能数据不完整".to_string());
    } else {
        if praise > read {
            issues.push(format!("点赞数({})大于阅读数({})，数据异常", praise, read));
        }
        if looking > read {
            issues.push(format!("在看数({})大于阅读数({})，数据异常", looking, read));
        }
        if article.interactions() as f64 > read as f64 * 0.5 {
            issues.push("互动率异常高，可能数据不准确".to_string());
        }
    }

    if fields.publish_time {
        let days = (now - article.publish_time) as f64 / SECONDS_PER_DAY as f64;
        if days > STALE_DAYS {
            issues.push("文章发布时间超过1年，可能数据过时".to_string());
        }
        if days < 0.0 {
            issues.push("文章发布时间在未来，时间戳异常".to_string());
        }
    }

    if fields.content {
        let length = article.content.chars().count();
        if length < MIN_CONTENT_CHARS {
            issues.push("文章内容过短，可能不完整".to_string());
        }
        if length > MAX_CONTENT_CHARS {
            issues.push("文章内容过长，可能包含无关内容".to_string());
        }
    }

    let field_score = fields.present() as f64 / FieldStatus::TOTAL as f64 * 100.0;
    let penalty = (issues.len() as f64 * ISSUE_PENALTY).min(MAX_PENALTY);
    let quality_score = (field_score - penalty).round().max(0.0) as u32;

    ArticleQuality {
        issues,
        quality_score,
        fields,
    }
}

pub fn validate_articles(articles: &[Article], now: i64) -> ValidationSummary {
    let reports: Vec<ArticleQuality> = articles
        .iter()
        .map(|article| validate_article(article, now))
        .collect();
    summarize(articles, &reports)
}

fn summarize(articles: &[Article], reports: &[ArticleQuality]) -> ValidationSummary {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut valid = 0usize;

    for (index, report) in reports.iter().enumerate() {
        if report.quality_score >= VALID_SCORE {
            valid += 1;
        } else if report.quality_score < ERROR_SCORE {
            errors.push(format!(
                "文章 {} 数据质量极低: {}",
                index + 1,
                report.issues.join(", ")
            ));
        } else {
            let first_two: Vec<&str> = report.issues.iter().take(2).map(String::as_str).collect();
            warnings.push(format!(
                "文章 {} 数据质量一般: {}",
                index + 1,
                first_two.join(", ")
            ));
        }
    }

    if !articles.is_empty() {
        let total = articles.len();
        let zero_read = articles.iter().filter(|article| article.read == 0).count();
        let suspicious = articles
            .iter()
            .filter(|article| {
                article.read > 0
                    && article.interactions() as f64 / article.read as f64 > SUSPICIOUS_ENGAGEMENT
            })
            .count();
        let average = average_score(reports);

        if zero_read as f64 / total as f64 > 0.5 {
            warnings.push(format!("超过50%的文章阅读量为0 ({}/{})", zero_read, total));
        }
        if average < 60.0 {
            warnings.push(format!(
                "整体数据质量偏低 (平均质量分数: {})",
                format_float(average, 1)
            ));
        }
        if suspicious > 0 {
            warnings.push(format!("发现{}篇文章互动率异常高 (>30%)", suspicious));
        }
    }

    ValidationSummary {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        total: articles.len(),
        valid,
        invalid: articles.len() - valid,
    }
}

/// Per-article details plus operator-facing recommendations.
pub fn quality_report(articles: &[Article], now: i64) -> QualityReport {
    let details: Vec<ArticleQuality> = articles
        .iter()
        .map(|article| validate_article(article, now))
        .collect();
    let validation = summarize(articles, &details);
    let total = articles.len() as f64;
    let average = average_score(&details);

    let mut recommendations = Vec::new();
    if !articles.is_empty() {
        if average < 70.0 {
            recommendations.push("建议检查API数据源的质量，可能存在数据获取问题".to_string());
        }
        let zero_read = articles.iter().filter(|article| article.read == 0).count();
        if zero_read as f64 > total * 0.3 {
            recommendations.push("大量文章阅读量为0，建议检查时间范围设置或API参数".to_string());
        }
        let missing = details
            .iter()
            .filter(|detail| !detail.fields.url || !detail.fields.content)
            .count();
        if missing as f64 > total * 0.2 {
            recommendations.push("部分文章缺少关键字段，建议检查API响应格式".to_string());
        }
        if details.iter().any(|detail| detail.quality_score < ERROR_SCORE) {
            recommendations.push("发现异常数据，建议实现数据清洗和过滤机制".to_string());
        }
    }

    let valid_share = if articles.is_empty() {
        0.0
    } else {
        validation.valid as f64 / total * 100.0
    };
    let summary = format!(
        "数据质量报告: 共{}篇文章，有效数据{}条 ({}%)，平均质量分数{}",
        articles.len(),
        validation.valid,
        format_float(valid_share, 1),
        format_float(average, 1)
    );

    QualityReport {
        summary,
        validation,
        details,
        recommendations,
    }
}

fn average_score(reports: &[ArticleQuality]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    reports
        .iter()
        .map(|report| report.quality_score as f64)
        .sum::<f64>()
        / reports.len() as f64
}
