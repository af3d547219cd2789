//! Offline unit tests for revsnap-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, TimeZone, Utc};
use revsnap_core::{AnalyticsConfig, AppConfig, Environment, StoreError};
use revsnap_db::{DbError, PoolConfig, ReviewRow, WeeklySnapshotRow};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        brands_path: PathBuf::from("./config/brands.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        nlp_service_url: None,
        translator_url: None,
        translator_api_key: None,
        request_timeout_secs: 30,
        resource_cache_path: PathBuf::from("./.revsnap/resource_cache.json"),
        max_concurrent_brands: 1,
        analytics: AnalyticsConfig::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn review_row_converts_to_record_using_external_id() {
    let published = Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap();
    let row = ReviewRow {
        id: 10,
        brand_id: 1,
        external_review_id: "tp-abc".to_string(),
        rating: 4,
        title: "Nice".to_string(),
        text: "fast delivery".to_string(),
        language: "en".to_string(),
        published_date: Some(published),
        has_reply: true,
        reply_date: Some(published),
        verification_source: Some("invited".to_string()),
        is_flagged: false,
        created_at: published,
    };

    let record = row.into_record();
    assert_eq!(record.review_id, "tp-abc");
    assert_eq!(record.rating, 4);
    assert_eq!(record.response_days(), Some(0));
    assert_eq!(record.source_label(), "invited");
}

fn snapshot_row() -> WeeklySnapshotRow {
    let now = Utc::now();
    WeeklySnapshotRow {
        id: 1,
        brand_id: 3,
        week_start: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        week_end: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        iso_week: "2025-W10".to_string(),
        total_reviews_to_date: 12,
        avg_rating: Decimal::new(425, 2),
        response_rate: Decimal::new(5000, 2),
        avg_response_time_days: Decimal::new(150, 2),
        new_reviews_this_week: 3,
        positive_count: 2,
        neutral_count: 0,
        negative_count: 1,
        rating_histogram: serde_json::json!({"1": 1, "2": 0, "3": 0, "4": 1, "5": 1}),
        language_distribution: serde_json::json!({"en": 2, "de": 1}),
        source_distribution: serde_json::json!({"organic": 3}),
        positive_themes: serde_json::json!([
            {"canonical": "fast delivery", "display": "fast delivery", "count": 2}
        ]),
        negative_themes: serde_json::json!([]),
        weekly_review_ids: serde_json::json!(["a", "b", "c"]),
        prev_week_review_count: 5,
        prev_week_avg_rating: Decimal::new(430, 2),
        ai_summary: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn snapshot_row_converts_to_domain_record() {
    let snapshot = snapshot_row().into_snapshot().expect("row should convert");

    assert_eq!(snapshot.brand_id, 3);
    assert_eq!(snapshot.total_reviews_to_date, 12);
    assert!((snapshot.avg_rating - 4.25).abs() < 1e-9);
    assert_eq!(snapshot.rating_histogram, [1, 0, 0, 1, 1]);
    assert_eq!(snapshot.language_distribution.get("de"), Some(&1));
    assert_eq!(snapshot.positive_themes.len(), 1);
    assert_eq!(snapshot.positive_themes[0].count, 2);
    assert!(snapshot.negative_themes.is_empty());
    assert_eq!(snapshot.weekly_review_ids, vec!["a", "b", "c"]);
    assert!(snapshot.ai_summary.is_none());
}

#[test]
fn malformed_theme_json_reports_column() {
    let mut row = snapshot_row();
    row.negative_themes = serde_json::json!({"not": "a list"});

    let err = row.into_snapshot().unwrap_err();
    assert!(matches!(err, DbError::Json { column: "negative_themes", .. }));
}

#[test]
fn db_errors_become_backend_store_errors() {
    let err: StoreError = DbError::NotFound.into();
    assert!(matches!(err, StoreError::Backend(_)));
}
