use topic_insight::suggestions::{FallbackStats, KeywordDomain};
use topic_insight::{
    build_fallback_suggestions, merge_with_fallback, parse_llm_suggestions, resolve_suggestions,
    select_top_articles, Article, InsightConfig, InsightSuggestion, LlmResponse, SuggestionOrigin,
    FALLBACK_MODEL, SECONDS_PER_DAY,
};

const NOW: i64 = 1_700_000_000;

fn article(wx_name: &str, read: u64, praise: u64) -> Article {
    Article {
        title: format!("{}的文章", wx_name),
        wx_name: wx_name.to_string(),
        read,
        praise,
        ..Article::default()
    }
}

fn reply(content: &str) -> LlmResponse {
    LlmResponse {
        model: "test-model".to_string(),
        content: content.to_string(),
        latency_ms: 12,
    }
}

fn suggestions_json(titles: &[&str]) -> String {
    let items: Vec<serde_json::Value> = titles
        .iter()
        .map(|title| {
            serde_json::json!({
                "title": title,
                "reason": format!("{}的理由", title),
                "data_support": format!("{}的数据", title),
            })
        })
        .collect();
    serde_json::json!({ "suggestions": items }).to_string()
}

#[test]
fn empty_corpus_gets_single_explanation() {
    let suggestions = build_fallback_suggestions("育儿", &[], NOW);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].title, "数据量不足提示");
    assert!(suggestions[0].reason.contains("“育儿”"));
    assert!(suggestions[0].is_complete());
}

#[test]
fn fallback_fills_four_complete_slots() {
    let articles = vec![article("号A", 1_000, 10), article("号B", 200, 5)];
    let suggestions = build_fallback_suggestions("美食", &articles, NOW);
    let titles: Vec<&str> = suggestions.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["高互动场景突破", "爆款结构复用", "跨账号机会窗口", "节奏与窗口管理"]
    );
    assert!(suggestions.iter().all(InsightSuggestion::is_complete));
}

#[test]
fn technology_phrasing_with_high_engagement() {
    let articles = vec![article("号A", 1_000, 100), article("号A", 1_000, 0)];
    let suggestions = build_fallback_suggestions("AI", &articles, NOW);

    assert_eq!(
        suggestions[0].reason,
        "Top2篇文章中有1篇互动率超过均值5.0%以上，说明技术实操类内容最受关注，建议增加\"使用技巧+避坑指南\"的对比内容。"
    );
    assert_eq!(
        suggestions[1].reason,
        "阅读量分布相对均衡，技术内容需要更强的可视化演示和实际效果展示，建议通过明确的成果指标或对比实验提升\"AI\"的内容价值。"
    );
    assert!(suggestions[2].reason.starts_with("当前主要由单一账号输出\"AI\"内容，技术蓝海市场"));
    assert!(suggestions[3].reason.starts_with("近期更新频次偏低，技术发展快速"));
}

#[test]
fn business_phrasing_counts_accounts_and_recent_articles() {
    let mut articles = vec![
        article("号A", 100, 1),
        article("号B", 100, 1),
        article("号C", 1_000, 1),
    ];
    articles[0].publish_time = NOW - 2 * SECONDS_PER_DAY;
    let suggestions = build_fallback_suggestions("品牌营销", &articles, NOW);

    assert!(suggestions[0].reason.starts_with("整体平均互动率为"));
    assert!(suggestions[0].reason.contains("商业类内容需要更强的数据支撑和案例验证"));
    assert!(suggestions[1].reason.starts_with("1篇文章阅读量高于均值 1.5 倍，成功案例"));
    assert!(suggestions[2].reason.starts_with("3个公众号在最近周期同时输出\"品牌营销\"相关内容"));
    assert!(suggestions[3].reason.starts_with("近7天内共有1篇相关文章发布，商业决策者"));
}

#[test]
fn keyword_domain_classification() {
    assert_eq!(KeywordDomain::classify("AI营销"), KeywordDomain::Technology);
    assert_eq!(KeywordDomain::classify("chatgpt编程"), KeywordDomain::Technology);
    assert_eq!(KeywordDomain::classify("跨境电商营销"), KeywordDomain::Business);
    assert_eq!(KeywordDomain::classify("育儿"), KeywordDomain::Lifestyle);
    assert_eq!(KeywordDomain::classify("猫咪日常"), KeywordDomain::Lifestyle);
    assert_eq!(KeywordDomain::classify("健康饮食"), KeywordDomain::Lifestyle);
}

#[test]
fn fallback_stats_include_zero_rates() {
    let articles = vec![article("号A", 1_000, 100), article("号B", 1_000, 0)];
    let stats = FallbackStats::compute(&articles, NOW);
    assert!((stats.avg_engagement_rate - 5.0).abs() < 1e-6);
    assert_eq!(stats.high_engagement, 1);
    assert_eq!(stats.high_read, 0);
    assert_eq!(stats.unique_accounts, 2);
    assert_eq!(stats.recent, 0);
}

#[test]
fn select_top_articles_is_stable() {
    let articles = vec![
        article("a", 10, 5),
        article("b", 10, 9),
        article("c", 10, 5),
        article("d", 10, 1),
    ];
    let names: Vec<String> = select_top_articles(&articles, 3)
        .into_iter()
        .map(|item| item.wx_name)
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn merge_tops_up_without_duplicate_titles() {
    let articles = vec![article("号A", 1_000, 10)];
    let parsed = vec![InsightSuggestion::new("高互动场景突破", "r", "d")];
    let merged = merge_with_fallback(parsed, "AI", &articles, NOW, &InsightConfig::default());

    let titles: Vec<&str> = merged.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["高互动场景突破", "爆款结构复用", "跨账号机会窗口", "节奏与窗口管理"]
    );
    assert_eq!(merged[0].reason, "r");
}

#[test]
fn merge_keeps_enough_llm_suggestions_untouched() {
    let parsed: Vec<InsightSuggestion> = (0..7)
        .map(|i| InsightSuggestion::new(format!("建议{}", i), "r", "d"))
        .collect();
    let merged = merge_with_fallback(parsed, "AI", &[], NOW, &InsightConfig::default());
    assert_eq!(merged.len(), 5);
    assert_eq!(merged[4].title, "建议4");
}

#[test]
fn resolve_uses_llm_when_enough_parsed() {
    let articles = vec![article("号A", 1_000, 10)];
    let response = reply(&suggestions_json(&["一", "二", "三"]));
    let outcome = resolve_suggestions("AI", &articles, Some(&response), NOW, &InsightConfig::default());
    assert_eq!(outcome.origin, SuggestionOrigin::Llm);
    assert_eq!(outcome.model_used, "test-model");
    assert_eq!(outcome.suggestions.len(), 3);
}

#[test]
fn resolve_tops_up_short_llm_reply() {
    let articles = vec![article("号A", 1_000, 10)];
    let response = reply(&format!("结果如下：{}", suggestions_json(&["工具测评"])));
    let outcome = resolve_suggestions("AI", &articles, Some(&response), NOW, &InsightConfig::default());
    assert_eq!(outcome.origin, SuggestionOrigin::LlmToppedUp);
    assert_eq!(outcome.model_used, "test-model");
    assert_eq!(outcome.suggestions.len(), 5);
    assert_eq!(outcome.suggestions[0].title, "工具测评");
}

#[test]
fn resolve_falls_back_without_usable_reply() {
    let articles = vec![article("号A", 1_000, 10)];
    let config = InsightConfig::default();

    let garbled = reply("抱歉，我无法完成");
    let outcome = resolve_suggestions("AI", &articles, Some(&garbled), NOW, &config);
    assert_eq!(outcome.origin, SuggestionOrigin::Fallback);
    assert_eq!(outcome.model_used, FALLBACK_MODEL);
    assert_eq!(outcome.suggestions.len(), 4);

    let outcome = resolve_suggestions("AI", &articles, None, NOW, &config);
    assert_eq!(outcome.origin, SuggestionOrigin::Fallback);
    assert_eq!(outcome.suggestions, build_fallback_suggestions("AI", &articles, NOW));
}

#[test]
fn parse_drops_incomplete_items() {
    let content = r#"{"suggestions":[
        {"title":"完整","reason":"r","data_support":"d"},
        {"title":"缺数据","reason":"r"},
        {"title":"空理由","reason":"  ","data":"d"}
    ]}"#;
    let parsed = parse_llm_suggestions(content);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].title, "完整");
}

#[test]
fn parse_truncates_long_titles() {
    let content = r#"[{"title":"一二三四五六七八九十甲乙丙丁戊己庚","reason":"r","data_support":"d"}]"#;
    let parsed = parse_llm_suggestions(content);
    assert_eq!(parsed[0].title.chars().count(), 15);
}

#[test]
fn parse_rejects_non_json() {
    assert!(parse_llm_suggestions("").is_empty());
    assert!(parse_llm_suggestions("no json here").is_empty());
    assert!(parse_llm_suggestions(r#"{"other": []}"#).is_empty());
}
