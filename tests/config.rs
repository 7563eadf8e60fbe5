use std::path::PathBuf;
use tempfile::TempDir;
use topic_insight::{AnalyticsConfig, Error};

#[test]
fn written_config_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config").join("analytics.toml");

    let mut config = AnalyticsConfig::default();
    config.insights.top_articles = 7;
    config.word_cloud.limit = 20;
    config.store.path = PathBuf::from("/tmp/store.json");
    config.write(&path).unwrap();

    let loaded = AnalyticsConfig::from_file(&path).unwrap();
    assert_eq!(loaded.insights.top_articles, 7);
    assert_eq!(loaded.word_cloud.limit, 20);
    assert_eq!(loaded.store.path, PathBuf::from("/tmp/store.json"));
    assert_eq!(loaded.report.engagement_read_floor, 500);
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analytics.toml");
    std::fs::write(&path, "[insights]\ntop_articles = 4\n\n[report]\ntop_n = 3\n").unwrap();

    let config = AnalyticsConfig::from_file(&path).unwrap();
    assert_eq!(config.insights.top_articles, 4);
    assert_eq!(config.insights.max_suggestions, 5);
    assert_eq!(config.report.top_n, 3);
    assert_eq!(config.word_cloud.strict_min_docs, 5);
    assert_eq!(config.llm.max_retries, 3);
}

#[test]
fn malformed_config_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analytics.toml");
    std::fs::write(&path, "[insights\ntop_articles = ").unwrap();

    let err = AnalyticsConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let (config, used) = AnalyticsConfig::load(Some(path.clone())).unwrap();
    assert_eq!(used, Some(path));
    assert_eq!(config.report.top_n, 5);
    assert_eq!(config.insights.cache_ttl_hours, 24);
}
