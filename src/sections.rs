//! Narrative sections shown next to the insight suggestions: trends, pain
//! points, frequent keywords, title structure and high-engagement traits.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::article::{distinct_publishers, Article};
use crate::engagement::{average_positive, engagement_rate, CorpusAverages};
use crate::text::WordCloudEngine;
use crate::{format_count_cn, format_float, InsightSuggestion, SECONDS_PER_DAY};

const PAIN_INDICATORS: [&str; 20] = [
    "效率", "成本", "转化", "流量", "涨粉", "焦虑", "竞争", "信任", "运营", "引流",
    "落地", "实操", "投入", "体验", "变现", "对比", "策略", "工具", "爆款", "风险",
];

const LIST_WORDS: [&str; 8] = ["方法", "步骤", "清单", "案例", "指南", "秘籍", "避坑", "拆解"];

const PAIN_TEXT_CHARS: usize = 200;
const SECTION_KEYWORDS: usize = 8;
const TRAIT_KEYWORDS: usize = 5;
const TRAIT_ARTICLES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSections {
    pub trends_and_directions: Vec<String>,
    pub user_pain_points: Vec<String>,
    pub high_frequency_keywords: Vec<String>,
    pub content_structure_patterns: Vec<String>,
    pub high_engagement_traits: Vec<String>,
    pub reusable_topic_suggestions: Vec<InsightSuggestion>,
}

pub fn build_topic_sections(
    keyword: &str,
    articles: &[Article],
    suggestions: &[InsightSuggestion],
    now: i64,
) -> TopicSections {
    let engine = WordCloudEngine::default();
    TopicSections {
        trends_and_directions: trend_statements(keyword, articles, now),
        user_pain_points: pain_points(keyword, articles),
        high_frequency_keywords: top_words(&engine, articles, keyword, SECTION_KEYWORDS),
        content_structure_patterns: structure_patterns(articles),
        high_engagement_traits: engagement_traits(&engine, keyword, articles),
        reusable_topic_suggestions: suggestions.to_vec(),
    }
}

fn trend_statements(keyword: &str, articles: &[Article], now: i64) -> Vec<String> {
    if articles.is_empty() {
        return vec![format!("暂无关于「{}」的趋势数据，等待新的分析任务。", keyword)];
    }

    let within_days = |days: i64| {
        articles
            .iter()
            .filter_map(Article::resolved_publish_time)
            .filter(|published| now - published <= days * SECONDS_PER_DAY)
            .count()
    };
    let within_week = within_days(7);
    let within_month = within_days(30);
    let accounts = distinct_publishers(articles).len();
    let averages = CorpusAverages::compute(articles);

    let mut statements = Vec::new();
    if within_week > 0 {
        statements.push(format!(
            "最近7天共 {} 篇文章聚焦「{}」，热度正处于活跃区间。",
            within_week, keyword
        ));
    } else if within_month > 0 {
        statements.push(format!(
            "最近30天累计 {} 篇内容提及「{}」，话题持续发酵。",
            within_month, keyword
        ));
    }

    if accounts > 0 {
        statements.push(format!(
            "共有 {} 个公众号参与输出，说明竞争者正在加速布局 {} 相关内容。",
            accounts, keyword
        ));
    }

    statements.push(format!(
        "平均阅读 {}，平均点赞 {}，适合通过深度内容持续放大声量。",
        format_count_cn(averages.read.round()),
        format_count_cn(averages.praise.round())
    ));

    statements
}

fn pain_points(keyword: &str, articles: &[Article]) -> Vec<String> {
    // First-seen order, so equal counts keep the order they were met in.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for article in articles {
        let prefix: String = article.content.chars().take(PAIN_TEXT_CHARS).collect();
        let text = format!("{}{}", article.title, prefix);
        for indicator in PAIN_INDICATORS {
            if !text.contains(indicator) {
                continue;
            }
            match counts.iter_mut().find(|(word, _)| *word == indicator) {
                Some((_, count)) => *count += 1,
                None => counts.push((indicator, 1)),
            }
        }
    }

    if counts.is_empty() {
        return vec![format!(
            "读者更关注「{}」的真实落地案例与可复用方法论，适合从“问题-解决方案-效果”结构切入。",
            keyword
        )];
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(3)
        .map(|(word, count)| {
            format!(
                "关于「{}」的讨论出现 {} 次，说明用户迫切需要解决相关痛点，可结合实测数据或案例拆解。",
                word, count
            )
        })
        .collect()
}

fn top_words(engine: &WordCloudEngine, articles: &[Article], keyword: &str, limit: usize) -> Vec<String> {
    engine
        .extract_with_limit(articles, Some(keyword), limit)
        .into_iter()
        .map(|term| term.word)
        .collect()
}

fn structure_patterns(articles: &[Article]) -> Vec<String> {
    if articles.is_empty() {
        return vec!["暂无内容结构样本".to_string()];
    }

    let total = articles.len();
    let count = |predicate: fn(&str) -> bool| {
        articles
            .iter()
            .filter(|article| predicate(&article.title))
            .count()
    };
    let with_digits = count(|title| title.chars().any(|ch| ch.is_ascii_digit()));
    let with_colon = count(|title| title.contains(':') || title.contains('：'));
    let questions = count(|title| title.contains('？') || title.contains('?') || title.contains("如何"));
    let list_style = count(|title| LIST_WORDS.iter().any(|word| title.contains(word)));

    let share = |matched: usize| matched as f64 / total as f64;
    let mut statements = Vec::new();

    if share(with_digits) >= 0.3 {
        statements.push(format!(
            "约 {} 的标题包含数字或序号，读者偏好“步骤/清单”类结构。",
            rounded_percent(with_digits, total)
        ));
    }
    if share(list_style) >= 0.25 {
        statements.push(format!(
            "“{}”等词频繁出现，结构上倾向于可执行的清单或对比。",
            LIST_WORDS[..4].join("、")
        ));
    }
    if share(with_colon) >= 0.2 {
        statements.push("不少作者使用「主题：副标题」的双层标题格式，方便突出场景或结果。".to_string());
    }
    if share(questions) >= 0.2 {
        statements.push(format!(
            "问句型标题占比 {}，适合通过“问题-答案”展开叙事。",
            rounded_percent(questions, total)
        ));
    }

    if statements.is_empty() {
        statements.push("内容普遍采用直陈式标题，可结合数据故事或案例拆解提升层次。".to_string());
    }
    statements
}

fn engagement_traits(engine: &WordCloudEngine, keyword: &str, articles: &[Article]) -> Vec<String> {
    if articles.is_empty() {
        return vec!["暂无互动数据".to_string()];
    }

    let rated: Vec<(&Article, f64)> = articles
        .iter()
        .map(|article| (article, engagement_rate(article)))
        .filter(|(_, rate)| *rate > 0.0)
        .collect();
    if rated.is_empty() {
        return vec!["互动数据不足，建议后续采集点赞/在看指标。".to_string()];
    }

    let rates: Vec<f64> = rated.iter().map(|(_, rate)| *rate).collect();
    let average = average_positive(&rates);

    let mut high: Vec<(&Article, f64)> = rated
        .into_iter()
        .filter(|(_, rate)| *rate >= average * 1.1 || *rate >= 3.0)
        .collect();
    high.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    high.truncate(TRAIT_ARTICLES);

    if high.is_empty() {
        return vec!["互动率整体平稳，建议结合对比实验或真实案例提升参与度。".to_string()];
    }

    let leaders: Vec<Article> = high.iter().map(|(article, _)| (*article).clone()).collect();
    let accounts = distinct_publishers(&leaders);
    let named: Vec<&str> = accounts.iter().take(2).map(String::as_str).collect();

    let mut statements = vec![format!(
        "高互动样本平均互动率 {}%，头部账号如 {} 表现突出。",
        format_float(average, 1),
        named.join("、")
    )];

    let keywords = top_words(engine, &leaders, keyword, TRAIT_KEYWORDS);
    if !keywords.is_empty() {
        statements.push(format!(
            "高互动标题常见关键词：{}，可在选题时优先结合这些元素。",
            keywords.join("、")
        ));
    }
    statements
}

fn rounded_percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{}%", (count as f64 / total as f64 * 100.0).round() as i64)
}
