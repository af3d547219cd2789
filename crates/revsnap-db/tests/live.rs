//! Live integration tests for revsnap-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/revsnap-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory. Run with `cargo test -- --ignored` and `DATABASE_URL`
//! pointing at a Postgres server.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use revsnap_core::{
    window_for, BrandConfig, CanonicalTheme, ReviewRecord, ReviewSource, SnapshotStore,
    WeeklySnapshot,
};
use revsnap_db::{
    brands::deactivate_brand, get_brand_by_slug, get_snapshot, language_counts,
    list_active_brands, list_invalid_ratings, list_reviews_in_window, list_snapshot_coverage,
    list_snapshots, rating_distribution, review_date_range, seed_brands, stats_as_of,
    top_languages_by_brand, upsert_review, upsert_snapshot, PgStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed one brand and return its generated `id`.
async fn insert_test_brand(pool: &sqlx::PgPool, name: &str) -> i64 {
    let brand = BrandConfig {
        name: name.to_string(),
        domain: format!("{}.example", name.to_lowercase().replace(' ', "")),
        business_id: None,
        notes: None,
    };
    seed_brands(pool, std::slice::from_ref(&brand))
        .await
        .expect("seed_brands failed");
    get_brand_by_slug(pool, &brand.slug())
        .await
        .expect("get_brand_by_slug failed")
        .expect("seeded brand should exist")
        .id
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn review(id: &str, rating: i16, published: DateTime<Utc>, language: &str) -> ReviewRecord {
    ReviewRecord {
        review_id: id.to_string(),
        rating,
        title: "Title".to_string(),
        text: "Body text".to_string(),
        language: language.to_string(),
        published_date: Some(published),
        has_reply: false,
        reply_date: None,
        verification_source: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot(brand_id: i64, week_start: NaiveDate, new_reviews: u64) -> WeeklySnapshot {
    let window = window_for(week_start);
    WeeklySnapshot {
        brand_id,
        week_start: window.start,
        week_end: window.end,
        iso_week: window.iso_week(),
        total_reviews_to_date: new_reviews,
        avg_rating: 4.5,
        response_rate: 33.33,
        avg_response_time_days: 1.0,
        new_reviews_this_week: new_reviews,
        positive_count: new_reviews,
        neutral_count: 0,
        negative_count: 0,
        rating_histogram: [0, 0, 0, 0, new_reviews],
        language_distribution: BTreeMap::from([("en".to_string(), new_reviews)]),
        source_distribution: BTreeMap::new(),
        positive_themes: vec![CanonicalTheme {
            canonical: "fast delivery".to_string(),
            display: "fast delivery".to_string(),
            count: 2,
        }],
        negative_themes: Vec::new(),
        weekly_review_ids: vec!["r1".to_string()],
        prev_week_review_count: 0,
        prev_week_avg_rating: 4.5,
        ai_summary: None,
    }
}

// ---------------------------------------------------------------------------
// Brands
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn seed_is_idempotent_and_deactivation_hides_brand(pool: sqlx::PgPool) {
    let id = insert_test_brand(&pool, "Keto Go").await;
    let again = insert_test_brand(&pool, "Keto Go").await;
    assert_eq!(id, again, "re-seeding must update, not duplicate");

    deactivate_brand(&pool, id).await.expect("deactivate failed");
    let active = list_active_brands(&pool).await.expect("list failed");
    assert!(active.iter().all(|b| b.id != id));
    assert!(get_brand_by_slug(&pool, "keto-go").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn window_query_uses_utc_day_bounds_and_skips_flagged(pool: sqlx::PgPool) {
    let brand_id = insert_test_brand(&pool, "Window Brand").await;
    for r in [
        review("before", 5, at(2025, 3, 2, 23), "en"),
        review("monday", 5, at(2025, 3, 3, 0), "en"),
        review("sunday", 2, at(2025, 3, 9, 23), "de"),
        review("flagged", 0, at(2025, 3, 5, 12), "en"),
        review("after", 4, at(2025, 3, 10, 0), "en"),
    ] {
        upsert_review(&pool, brand_id, &r).await.expect("upsert_review failed");
    }

    let rows = list_reviews_in_window(&pool, brand_id, &window_for(date(2025, 3, 5)))
        .await
        .expect("window query failed");
    let ids: Vec<_> = rows.iter().map(|r| r.external_review_id.as_str()).collect();
    assert_eq!(ids, vec!["monday", "sunday"]);

    let range = review_date_range(&pool, brand_id).await.unwrap();
    assert_eq!(range, Some((date(2025, 3, 2), date(2025, 3, 10))));

    let langs = language_counts(&pool, Some(brand_id)).await.unwrap();
    assert_eq!(langs[0], ("en".to_string(), 3));

    let invalid = list_invalid_ratings(&pool, 10).await.unwrap();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].external_review_id, "flagged");

    let distribution = rating_distribution(&pool).await.unwrap();
    assert!(distribution.contains(&(0, 1)));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn stats_aggregate_matches_in_memory_rules(pool: sqlx::PgPool) {
    let brand_id = insert_test_brand(&pool, "Stats Brand").await;

    let mut early_reply = review("a", 5, at(2025, 3, 3, 12), "en");
    early_reply.has_reply = true;
    early_reply.reply_date = Some(at(2025, 3, 2, 12));
    let mut normal_reply = review("b", 3, at(2025, 3, 3, 12), "en");
    normal_reply.has_reply = true;
    normal_reply.reply_date = Some(at(2025, 3, 6, 13));
    let plain = review("c", 4, at(2025, 3, 9, 23), "en");
    let late = review("d", 1, at(2025, 3, 10, 0), "en");

    for r in [early_reply, normal_reply, plain, late] {
        upsert_review(&pool, brand_id, &r).await.unwrap();
    }

    let stats = stats_as_of(&pool, brand_id, date(2025, 3, 9)).await.unwrap();
    assert_eq!(stats.review_count, 3);
    assert!((stats.mean_rating - 4.0).abs() < 1e-9);
    assert!((stats.response_rate - 66.67).abs() < 1e-9);
    assert!((stats.mean_response_days - 3.0).abs() < 1e-9);

    let empty = stats_as_of(&pool, brand_id, date(2025, 1, 1)).await.unwrap();
    assert_eq!(empty.review_count, 0);
    assert!(empty.mean_rating.abs() < f64::EPSILON);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn top_languages_are_ranked_per_brand(pool: sqlx::PgPool) {
    let first = insert_test_brand(&pool, "Lang One").await;
    let second = insert_test_brand(&pool, "Lang Two").await;

    let day = at(2025, 3, 4, 12);
    for (id, lang) in [
        ("a1", "en"),
        ("a2", "en"),
        ("a3", "en"),
        ("a4", "de"),
        ("a5", "de"),
        ("a6", "fr"),
    ] {
        upsert_review(&pool, first, &review(id, 5, day, lang)).await.unwrap();
    }
    upsert_review(&pool, first, &review("a7", 0, day, "en")).await.unwrap();
    upsert_review(&pool, second, &review("b1", 4, day, "da")).await.unwrap();

    let rows = top_languages_by_brand(&pool, 2).await.expect("query failed");

    let one: Vec<_> = rows
        .iter()
        .filter(|r| r.brand_id == first)
        .map(|r| (r.language.as_str(), r.review_count, r.brand_total))
        .collect();
    assert_eq!(one, vec![("en", 3, 6), ("de", 2, 6)]);

    let two: Vec<_> = rows
        .iter()
        .filter(|r| r.brand_id == second)
        .map(|r| (r.language.as_str(), r.review_count, r.brand_total))
        .collect();
    assert_eq!(two, vec![("da", 1, 1)]);
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn snapshot_upsert_replaces_existing_week(pool: sqlx::PgPool) {
    let brand_id = insert_test_brand(&pool, "Snap Brand").await;
    let week = date(2025, 3, 3);

    let first = upsert_snapshot(&pool, &snapshot(brand_id, week, 2)).await.unwrap();
    let second = upsert_snapshot(&pool, &snapshot(brand_id, week, 5)).await.unwrap();
    assert_eq!(first, second, "same (brand, week) must keep one row");

    let stored = get_snapshot(&pool, brand_id, week)
        .await
        .unwrap()
        .expect("snapshot should exist")
        .into_snapshot()
        .unwrap();
    assert_eq!(stored.new_reviews_this_week, 5);
    assert_eq!(stored.positive_themes[0].canonical, "fast delivery");
    assert!((stored.response_rate - 33.33).abs() < 1e-9);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn pg_store_serves_previous_snapshot(pool: sqlx::PgPool) {
    let brand_id = insert_test_brand(&pool, "Store Brand").await;
    let store = PgStore::new(pool.clone());

    store
        .upsert_snapshot(&snapshot(brand_id, date(2025, 2, 24), 1))
        .await
        .unwrap();
    store
        .upsert_snapshot(&snapshot(brand_id, date(2025, 3, 3), 2))
        .await
        .unwrap();

    let prev = store
        .latest_snapshot_before(brand_id, date(2025, 3, 10))
        .await
        .unwrap()
        .expect("predecessor should exist");
    assert_eq!(prev.week_start, date(2025, 3, 3));
    assert!(store
        .latest_snapshot_before(brand_id, date(2025, 2, 24))
        .await
        .unwrap()
        .is_none());

    let listed = list_snapshots(&pool, brand_id, 10).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].week_start, date(2025, 3, 3));

    upsert_review(&pool, brand_id, &review("x", 4, at(2025, 3, 4, 8), ""))
        .await
        .unwrap();
    let counts = store.language_counts(brand_id).await.unwrap();
    assert_eq!(counts.get("unknown"), Some(&1));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn snapshot_coverage_counts_weeks_per_brand(pool: sqlx::PgPool) {
    let covered = insert_test_brand(&pool, "Covered Brand").await;
    let empty = insert_test_brand(&pool, "Empty Brand").await;

    for week in [date(2025, 2, 24), date(2025, 3, 3), date(2025, 3, 3)] {
        upsert_snapshot(&pool, &snapshot(covered, week, 1)).await.unwrap();
    }

    let rows = list_snapshot_coverage(&pool).await.expect("query failed");

    let row = rows.iter().find(|r| r.brand_id == covered).expect("covered brand listed");
    assert_eq!(row.snapshot_count, 2);
    assert_eq!(row.first_week, Some(date(2025, 2, 24)));
    assert_eq!(row.last_week, Some(date(2025, 3, 3)));

    let row = rows.iter().find(|r| r.brand_id == empty).expect("empty brand listed");
    assert_eq!(row.slug, "empty-brand");
    assert_eq!(row.snapshot_count, 0);
    assert!(row.first_week.is_none());
}
