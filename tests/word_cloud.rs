use topic_insight::text::normalizer::{canonicalize, tokenize, TextNormalizer};
use topic_insight::text::vocabulary::is_stop_word;
use topic_insight::{extract_top_keywords, Article, WordCloudConfig, WordCloudEngine};

fn titled(title: &str, read: u64) -> Article {
    Article {
        title: title.to_string(),
        read,
        ..Article::default()
    }
}

#[test]
fn score_sums_log_heat_once_per_article() {
    let articles = vec![
        titled("苹果 苹果 香蕉", 90),
        titled("苹果", 0),
    ];
    let terms = extract_top_keywords(&articles, None, 15);

    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].word, "苹果");
    assert_eq!(terms[0].count, 2);
    assert!((terms[0].score - 3.0).abs() < 1e-6);
    assert_eq!(terms[1].word, "香蕉");
    assert_eq!(terms[1].count, 1);
    assert!((terms[1].score - 2.0).abs() < 1e-6);
}

#[test]
fn ties_break_by_count_then_word() {
    let articles = vec![titled("gamma beta", 0), titled("alpha", 0)];
    let words: Vec<String> = extract_top_keywords(&articles, None, 15)
        .into_iter()
        .map(|term| term.word)
        .collect();
    assert_eq!(words, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn strict_threshold_drops_rare_terms() {
    let common: Vec<String> = (0..10).map(|i| format!("term{}", i)).collect();
    let mut articles: Vec<Article> = (0..5).map(|_| titled(&common.join(" "), 0)).collect();
    articles[0].title.push_str(" rareword");

    let terms = extract_top_keywords(&articles, None, 15);
    assert_eq!(terms.len(), 10);
    assert!(terms.iter().all(|term| term.count == 5));
    assert!(terms.iter().all(|term| (term.score - 5.0).abs() < 1e-6));
    assert!(!terms.iter().any(|term| term.word == "rareword"));
}

#[test]
fn relaxed_threshold_applies_when_strict_is_too_sparse() {
    let common: Vec<String> = (0..10).map(|i| format!("word{}", i)).collect();
    let mut articles: Vec<Article> = (0..3).map(|_| titled(&common.join(" "), 0)).collect();
    articles.push(titled("lonely", 0));

    let terms = extract_top_keywords(&articles, None, 15);
    assert_eq!(terms.len(), 10);
    assert!(!terms.iter().any(|term| term.word == "lonely"));
}

#[test]
fn sparse_corpus_keeps_every_term() {
    let articles = vec![titled("机器学习 深度学习", 100), titled("强化学习", 10)];
    let terms = extract_top_keywords(&articles, None, 15);
    assert_eq!(terms.len(), 3);
}

#[test]
fn limit_caps_the_output() {
    let title: Vec<String> = (0..30).map(|i| format!("kw{:02}", i)).collect();
    let articles = vec![titled(&title.join(" "), 0)];
    assert_eq!(extract_top_keywords(&articles, None, 15).len(), 15);

    let engine = WordCloudEngine::new(WordCloudConfig {
        limit: 4,
        ..WordCloudConfig::default()
    });
    assert_eq!(engine.extract(&articles, None).len(), 4);
}

#[test]
fn keyword_and_its_variants_are_suppressed() {
    let articles = vec![
        titled("雷军 小米汽车 发布会", 1000),
        titled("雷总 小米汽车", 500),
        titled("雷军老师 演讲", 100),
    ];
    let words: Vec<String> = extract_top_keywords(&articles, Some("雷军"), 15)
        .into_iter()
        .map(|term| term.word)
        .collect();

    assert!(words.contains(&"小米汽车".to_string()));
    assert!(!words.iter().any(|word| word.starts_with('雷')));
}

#[test]
fn stop_words_and_numbers_are_filtered() {
    let articles = vec![titled("我们 2024 公众号 量子计算", 0)];
    let words: Vec<String> = extract_top_keywords(&articles, None, 15)
        .into_iter()
        .map(|term| term.word)
        .collect();
    assert_eq!(words, vec!["量子计算"]);
}

#[test]
fn aliases_collapse_into_one_term() {
    let articles = vec![titled("阿里 财报", 0), titled("阿里巴巴集团 财报", 0)];
    let terms = extract_top_keywords(&articles, None, 15);
    let alibaba = terms.iter().find(|term| term.word == "阿里巴巴").unwrap();
    assert_eq!(alibaba.count, 2);
}

#[test]
fn publisher_name_and_content_prefix_contribute() {
    let article = Article {
        title: "标题词".to_string(),
        content: format!("正文词{}", " 填充".repeat(200)),
        wx_name: "科技日报".to_string(),
        ..Article::default()
    };
    let terms = TextNormalizer::new(None).article_terms(&article, 200);
    assert!(terms.contains("标题词"));
    assert!(terms.contains("正文词"));
    assert!(terms.contains("科技日报"));
}

#[test]
fn empty_corpus_has_no_terms() {
    assert!(extract_top_keywords(&[], Some("AI"), 15).is_empty());
}

#[test]
fn vocabulary_helpers() {
    assert!(is_stop_word("我们"));
    assert!(!is_stop_word("量子计算"));
    assert_eq!(tokenize("AI，大模型!x"), vec!["AI", "大模型"]);
    assert_eq!(canonicalize("人工智能").as_deref(), Some("ai"));
}
