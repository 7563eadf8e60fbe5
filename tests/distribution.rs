use topic_insight::distribution::{read_bucket_index, recency_bucket_index};
use topic_insight::{publish_time_distribution, read_count_distribution, Article, SECONDS_PER_DAY};

const NOW: i64 = 1_700_000_000;

fn read_only(read: u64) -> Article {
    Article {
        read,
        ..Article::default()
    }
}

fn published_days_ago(days: f64) -> Article {
    Article {
        publish_time: NOW - (days * SECONDS_PER_DAY as f64) as i64,
        ..Article::default()
    }
}

fn counts(buckets: &[topic_insight::Bucket; 5]) -> Vec<usize> {
    buckets.iter().map(|bucket| bucket.count).collect()
}

#[test]
fn read_bucket_bounds_are_inclusive() {
    assert_eq!(read_bucket_index(0), 0);
    assert_eq!(read_bucket_index(1_000), 0);
    assert_eq!(read_bucket_index(1_001), 1);
    assert_eq!(read_bucket_index(5_000), 1);
    assert_eq!(read_bucket_index(5_001), 2);
    assert_eq!(read_bucket_index(10_000), 2);
    assert_eq!(read_bucket_index(50_000), 3);
    assert_eq!(read_bucket_index(50_001), 4);
    assert_eq!(read_bucket_index(u64::MAX), 4);
}

#[test]
fn read_distribution_keeps_fixed_labels() {
    let articles: Vec<Article> = [0, 999, 1_000, 1_001, 7_500, 20_000, 100_000]
        .into_iter()
        .map(read_only)
        .collect();
    let buckets = read_count_distribution(&articles);

    let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label.as_str()).collect();
    assert_eq!(labels, vec!["0-1k", "1k-5k", "5k-10k", "10k-50k", "50k+"]);
    assert_eq!(buckets[0].range, "0-1000");
    assert_eq!(buckets[4].range, "50001+");
    assert_eq!(counts(&buckets), vec![3, 1, 1, 1, 1]);
}

#[test]
fn recency_buckets_by_age_in_days() {
    assert_eq!(recency_bucket_index(Some(0.5)), 0);
    assert_eq!(recency_bucket_index(Some(1.0)), 0);
    assert_eq!(recency_bucket_index(Some(2.0)), 1);
    assert_eq!(recency_bucket_index(Some(7.0)), 2);
    assert_eq!(recency_bucket_index(Some(29.9)), 3);
    assert_eq!(recency_bucket_index(Some(30.5)), 4);
    assert_eq!(recency_bucket_index(None), 4);
    assert_eq!(recency_bucket_index(Some(f64::NAN)), 4);
}

#[test]
fn publish_distribution_puts_unknown_times_last() {
    let mut articles: Vec<Article> = [0.2, 2.5, 5.0, 10.0, 45.0]
        .into_iter()
        .map(published_days_ago)
        .collect();
    articles.push(Article::default());
    articles.push(Article {
        publish_time_str: Some("not a date".to_string()),
        ..Article::default()
    });

    let buckets = publish_time_distribution(&articles, NOW);
    let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label.as_str()).collect();
    assert_eq!(labels, vec!["1天内", "1-3天", "3-7天", "7-30天", "30天前"]);
    assert_eq!(counts(&buckets), vec![1, 1, 1, 1, 3]);
}

#[test]
fn publish_distribution_reads_string_times() {
    let articles = vec![Article {
        publish_time_str: Some(NOW.to_string()),
        ..Article::default()
    }];
    let buckets = publish_time_distribution(&articles, NOW + 3_600);
    assert_eq!(counts(&buckets), vec![1, 0, 0, 0, 0]);
}

#[test]
fn empty_corpus_has_five_empty_buckets() {
    assert_eq!(counts(&read_count_distribution(&[])), vec![0; 5]);
    assert_eq!(counts(&publish_time_distribution(&[], NOW)), vec![0; 5]);
}
