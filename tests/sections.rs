use topic_insight::{build_topic_sections, Article, InsightSuggestion, SECONDS_PER_DAY};

const NOW: i64 = 1_700_000_000;

fn corpus() -> Vec<Article> {
    vec![
        Article {
            title: "3个方法提升转化：实操指南".to_string(),
            wx_name: "号A".to_string(),
            read: 1_000,
            praise: 50,
            publish_time: NOW - 2 * SECONDS_PER_DAY,
            ..Article::default()
        },
        Article {
            title: "如何降低成本？".to_string(),
            wx_name: "号B".to_string(),
            read: 2_000,
            praise: 10,
            publish_time: NOW - 20 * SECONDS_PER_DAY,
            ..Article::default()
        },
        Article {
            title: "运营日记".to_string(),
            wx_name: "号A".to_string(),
            read: 500,
            ..Article::default()
        },
    ]
}

#[test]
fn trend_statements_summarise_activity() {
    let sections = build_topic_sections("AI", &corpus(), &[], NOW);
    assert_eq!(
        sections.trends_and_directions,
        vec![
            "最近7天共 1 篇文章聚焦「AI」，热度正处于活跃区间。".to_string(),
            "共有 2 个公众号参与输出，说明竞争者正在加速布局 AI 相关内容。".to_string(),
            "平均阅读 1,167，平均点赞 20，适合通过深度内容持续放大声量。".to_string(),
        ]
    );
}

#[test]
fn pain_points_keep_first_seen_order_on_ties() {
    let sections = build_topic_sections("AI", &corpus(), &[], NOW);
    assert_eq!(sections.user_pain_points.len(), 3);
    assert!(sections.user_pain_points[0].starts_with("关于「转化」的讨论出现 1 次"));
    assert!(sections.user_pain_points[1].starts_with("关于「实操」"));
    assert!(sections.user_pain_points[2].starts_with("关于「成本」"));
}

#[test]
fn structure_patterns_from_titles() {
    let sections = build_topic_sections("AI", &corpus(), &[], NOW);
    let patterns = &sections.content_structure_patterns;
    assert_eq!(patterns.len(), 4);
    assert!(patterns[0].starts_with("约 33% 的标题包含数字或序号"));
    assert!(patterns[1].starts_with("“方法、步骤、清单、案例”等词频繁出现"));
    assert!(patterns[3].starts_with("问句型标题占比 33%"));
}

#[test]
fn engagement_traits_name_leading_accounts() {
    let sections = build_topic_sections("AI", &corpus(), &[], NOW);
    let traits = &sections.high_engagement_traits;
    assert_eq!(traits.len(), 2);
    assert!(traits[0].starts_with("高互动样本平均互动率"));
    assert!(traits[0].contains("号A"));
    assert!(traits[1].starts_with("高互动标题常见关键词："));
}

#[test]
fn suggestions_are_carried_through() {
    let suggestions = vec![InsightSuggestion::new("标题", "理由", "数据")];
    let sections = build_topic_sections("AI", &corpus(), &suggestions, NOW);
    assert_eq!(sections.reusable_topic_suggestions, suggestions);
    assert!(sections.high_frequency_keywords.len() <= 8);
}

#[test]
fn empty_corpus_uses_placeholders() {
    let sections = build_topic_sections("AI", &[], &[], NOW);
    assert_eq!(
        sections.trends_and_directions,
        vec!["暂无关于「AI」的趋势数据，等待新的分析任务。".to_string()]
    );
    assert_eq!(sections.user_pain_points.len(), 1);
    assert!(sections.high_frequency_keywords.is_empty());
    assert_eq!(sections.content_structure_patterns, vec!["暂无内容结构样本".to_string()]);
    assert_eq!(sections.high_engagement_traits, vec!["暂无互动数据".to_string()]);
}
