use serde_json::json;
use topic_insight::{distinct_publishers, parse_articles, prepare_corpus, Article, SECONDS_PER_DAY};

const NOW: i64 = 1_700_000_000;

#[test]
fn vendor_aliases_are_coerced() {
    let article = Article::from(json!({
        "title": "标题",
        "author": "号",
        "read_count": "1,234",
        "likeCount": 5.7,
        "watchCount": null,
        "looking": 3,
        "short_link": "http://example.com/a",
        "publish_time": 1_700_000_000_000_i64,
    }));

    assert_eq!(article.wx_name, "号");
    assert_eq!(article.read, 1);
    assert_eq!(article.praise, 5);
    assert_eq!(article.looking, 3);
    assert_eq!(article.url.as_deref(), Some("http://example.com/a"));
    assert_eq!(article.publish_time, 1_700_000_000);
}

#[test]
fn invalid_counts_become_zero() {
    let article = Article::from(json!({
        "title": 42,
        "read": -5,
        "praise": "abc",
        "looking": "-3",
        "url": "  ",
    }));
    assert_eq!(article.title, "42");
    assert_eq!(article.read, 0);
    assert_eq!(article.praise, 0);
    assert_eq!(article.looking, 0);
    assert_eq!(article.url, None);
    assert_eq!(article.publish_time, 0);
}

#[test]
fn parse_accepts_array_and_envelopes() {
    let array = parse_articles(r#"[{"title":"a","read":10}]"#).unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0].read, 10);

    let data = parse_articles(r#"{"code":0,"data":[{"title":"a"},{"title":"b"}]}"#).unwrap();
    assert_eq!(data.len(), 2);

    let articles = parse_articles(r#"{"articles":[{"title":"c"}]}"#).unwrap();
    assert_eq!(articles[0].title, "c");
}

#[test]
fn parse_rejects_malformed_payloads() {
    assert!(parse_articles("not json").is_err());
    assert!(parse_articles(r#"{"data": {"title": "a"}}"#).is_err());
    assert!(parse_articles("42").is_err());
}

#[test]
fn publish_time_falls_back_to_string() {
    let article = Article {
        publish_time_str: Some("2023-11-14T22:13:20Z".to_string()),
        ..Article::default()
    };
    assert_eq!(article.resolved_publish_time(), Some(NOW));
    assert_eq!(article.age_days(NOW + SECONDS_PER_DAY), Some(1.0));

    let digits = Article {
        publish_time_str: Some("1700000000000".to_string()),
        ..Article::default()
    };
    assert_eq!(digits.resolved_publish_time(), Some(NOW));
}

#[test]
fn prepare_corpus_filters_and_truncates() {
    let articles = vec![
        Article {
            title: "fresh".to_string(),
            publish_time: NOW - SECONDS_PER_DAY,
            ..Article::default()
        },
        Article {
            title: "string".to_string(),
            publish_time_str: Some("2023-11-12T22:13:20Z".to_string()),
            ..Article::default()
        },
        Article {
            title: "old".to_string(),
            publish_time: NOW - 30 * SECONDS_PER_DAY,
            ..Article::default()
        },
        Article {
            title: "undated".to_string(),
            ..Article::default()
        },
    ];

    let recent = prepare_corpus(articles.clone(), 7, 0, NOW);
    let titles: Vec<&str> = recent.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["fresh", "string"]);
    assert_eq!(recent[1].publish_time, NOW - 2 * SECONDS_PER_DAY);
    assert!(recent[0].publish_time_str.is_some());

    assert_eq!(prepare_corpus(articles.clone(), 0, 0, NOW).len(), 4);
    assert_eq!(prepare_corpus(articles, 0, 2, NOW).len(), 2);
}

#[test]
fn publishers_in_first_seen_order() {
    let named = |name: &str| Article {
        wx_name: name.to_string(),
        ..Article::default()
    };
    let articles = vec![named("乙"), named(""), named("甲"), named("乙"), named(" ")];
    assert_eq!(distinct_publishers(&articles), vec!["乙", "甲"]);
}
