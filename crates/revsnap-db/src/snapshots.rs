//! Database operations for the `weekly_snapshots` table.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use revsnap_core::{CanonicalTheme, WeeklySnapshot};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `weekly_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeeklySnapshotRow {
    pub id: i64,
    pub brand_id: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub iso_week: String,
    pub total_reviews_to_date: i64,
    pub avg_rating: Decimal,
    pub response_rate: Decimal,
    pub avg_response_time_days: Decimal,
    pub new_reviews_this_week: i64,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
    pub rating_histogram: Value,
    pub language_distribution: Value,
    pub source_distribution: Value,
    pub positive_themes: Value,
    pub negative_themes: Value,
    pub weekly_review_ids: Value,
    pub prev_week_review_count: i64,
    pub prev_week_avg_rating: Decimal,
    pub ai_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SNAPSHOT_COLUMNS: &str = "id, brand_id, week_start, week_end, iso_week, \
     total_reviews_to_date, avg_rating, response_rate, avg_response_time_days, \
     new_reviews_this_week, positive_count, neutral_count, negative_count, rating_histogram, \
     language_distribution, source_distribution, positive_themes, negative_themes, \
     weekly_review_ids, prev_week_review_count, prev_week_avg_rating, ai_summary, \
     created_at, updated_at";

impl WeeklySnapshotRow {
    /// Convert the stored row back into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] for negative counts or unrepresentable
    /// decimals, and [`DbError::Json`] for malformed JSONB columns.
    pub fn into_snapshot(self) -> Result<WeeklySnapshot, DbError> {
        Ok(WeeklySnapshot {
            brand_id: self.brand_id,
            week_start: self.week_start,
            week_end: self.week_end,
            iso_week: self.iso_week,
            total_reviews_to_date: count_from_db("total_reviews_to_date", self.total_reviews_to_date)?,
            avg_rating: decimal_to_f64("avg_rating", self.avg_rating)?,
            response_rate: decimal_to_f64("response_rate", self.response_rate)?,
            avg_response_time_days: decimal_to_f64(
                "avg_response_time_days",
                self.avg_response_time_days,
            )?,
            new_reviews_this_week: count_from_db("new_reviews_this_week", self.new_reviews_this_week)?,
            positive_count: count_from_db("positive_count", self.positive_count)?,
            neutral_count: count_from_db("neutral_count", self.neutral_count)?,
            negative_count: count_from_db("negative_count", self.negative_count)?,
            rating_histogram: histogram_from_json(self.rating_histogram)?,
            language_distribution: from_json("language_distribution", self.language_distribution)?,
            source_distribution: from_json("source_distribution", self.source_distribution)?,
            positive_themes: from_json::<Vec<CanonicalTheme>>("positive_themes", self.positive_themes)?,
            negative_themes: from_json::<Vec<CanonicalTheme>>("negative_themes", self.negative_themes)?,
            weekly_review_ids: from_json("weekly_review_ids", self.weekly_review_ids)?,
            prev_week_review_count: count_from_db(
                "prev_week_review_count",
                self.prev_week_review_count,
            )?,
            prev_week_avg_rating: decimal_to_f64("prev_week_avg_rating", self.prev_week_avg_rating)?,
            ai_summary: self.ai_summary,
        })
    }
}

// ---------------------------------------------------------------------------
// Column conversions
// ---------------------------------------------------------------------------

fn count_to_db(column: &'static str, value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|e| DbError::InvalidValue {
        column,
        reason: e.to_string(),
    })
}

fn count_from_db(column: &'static str, value: i64) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::InvalidValue {
        column,
        reason: format!("negative count {value}"),
    })
}

/// Two-decimal `NUMERIC` value for a ratio.
fn decimal_from_f64(column: &'static str, value: f64) -> Result<Decimal, DbError> {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| DbError::InvalidValue {
            column,
            reason: format!("{value} is not a finite decimal"),
        })
}

fn decimal_to_f64(column: &'static str, value: Decimal) -> Result<f64, DbError> {
    value.to_f64().ok_or_else(|| DbError::InvalidValue {
        column,
        reason: format!("{value} does not fit in f64"),
    })
}

fn to_json<T: serde::Serialize>(column: &'static str, value: &T) -> Result<Value, DbError> {
    serde_json::to_value(value).map_err(|source| DbError::Json { column, source })
}

fn from_json<T: serde::de::DeserializeOwned>(
    column: &'static str,
    value: Value,
) -> Result<T, DbError> {
    serde_json::from_value(value).map_err(|source| DbError::Json { column, source })
}

/// Histogram stored as `{"1": n, ..., "5": n}`.
fn histogram_to_json(histogram: &[u64; 5]) -> Value {
    let map: BTreeMap<String, u64> = (1..=5)
        .zip(histogram.iter())
        .map(|(rating, count)| (rating.to_string(), *count))
        .collect();
    serde_json::json!(map)
}

fn histogram_from_json(value: Value) -> Result<[u64; 5], DbError> {
    let map: BTreeMap<String, u64> = from_json("rating_histogram", value)?;
    let mut histogram = [0u64; 5];
    for (rating, slot) in (1..=5).zip(histogram.iter_mut()) {
        *slot = map.get(&rating.to_string()).copied().unwrap_or(0);
    }
    Ok(histogram)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a snapshot or replace every field of the existing one for the same
/// `(brand_id, week_start)`. Returns the row id.
///
/// # Errors
///
/// Returns [`DbError::InvalidValue`]/[`DbError::Json`] if a field cannot be
/// encoded, or [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_snapshot(pool: &PgPool, snapshot: &WeeklySnapshot) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO weekly_snapshots \
             (brand_id, week_start, week_end, iso_week, \
              total_reviews_to_date, avg_rating, response_rate, avg_response_time_days, \
              new_reviews_this_week, positive_count, neutral_count, negative_count, \
              rating_histogram, language_distribution, source_distribution, \
              positive_themes, negative_themes, weekly_review_ids, \
              prev_week_review_count, prev_week_avg_rating, ai_summary) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21) \
         ON CONFLICT (brand_id, week_start) DO UPDATE SET \
             week_end = EXCLUDED.week_end, \
             iso_week = EXCLUDED.iso_week, \
             total_reviews_to_date = EXCLUDED.total_reviews_to_date, \
             avg_rating = EXCLUDED.avg_rating, \
             response_rate = EXCLUDED.response_rate, \
             avg_response_time_days = EXCLUDED.avg_response_time_days, \
             new_reviews_this_week = EXCLUDED.new_reviews_this_week, \
             positive_count = EXCLUDED.positive_count, \
             neutral_count = EXCLUDED.neutral_count, \
             negative_count = EXCLUDED.negative_count, \
             rating_histogram = EXCLUDED.rating_histogram, \
             language_distribution = EXCLUDED.language_distribution, \
             source_distribution = EXCLUDED.source_distribution, \
             positive_themes = EXCLUDED.positive_themes, \
             negative_themes = EXCLUDED.negative_themes, \
             weekly_review_ids = EXCLUDED.weekly_review_ids, \
             prev_week_review_count = EXCLUDED.prev_week_review_count, \
             prev_week_avg_rating = EXCLUDED.prev_week_avg_rating, \
             ai_summary = EXCLUDED.ai_summary, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(snapshot.brand_id)
    .bind(snapshot.week_start)
    .bind(snapshot.week_end)
    .bind(&snapshot.iso_week)
    .bind(count_to_db("total_reviews_to_date", snapshot.total_reviews_to_date)?)
    .bind(decimal_from_f64("avg_rating", snapshot.avg_rating)?)
    .bind(decimal_from_f64("response_rate", snapshot.response_rate)?)
    .bind(decimal_from_f64(
        "avg_response_time_days",
        snapshot.avg_response_time_days,
    )?)
    .bind(count_to_db("new_reviews_this_week", snapshot.new_reviews_this_week)?)
    .bind(count_to_db("positive_count", snapshot.positive_count)?)
    .bind(count_to_db("neutral_count", snapshot.neutral_count)?)
    .bind(count_to_db("negative_count", snapshot.negative_count)?)
    .bind(histogram_to_json(&snapshot.rating_histogram))
    .bind(to_json("language_distribution", &snapshot.language_distribution)?)
    .bind(to_json("source_distribution", &snapshot.source_distribution)?)
    .bind(to_json("positive_themes", &snapshot.positive_themes)?)
    .bind(to_json("negative_themes", &snapshot.negative_themes)?)
    .bind(to_json("weekly_review_ids", &snapshot.weekly_review_ids)?)
    .bind(count_to_db("prev_week_review_count", snapshot.prev_week_review_count)?)
    .bind(decimal_from_f64("prev_week_avg_rating", snapshot.prev_week_avg_rating)?)
    .bind(&snapshot.ai_summary)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// The snapshot for `(brand_id, week_start)`, if stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_snapshot(
    pool: &PgPool,
    brand_id: i64,
    week_start: NaiveDate,
) -> Result<Option<WeeklySnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, WeeklySnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM weekly_snapshots \
         WHERE brand_id = $1 AND week_start = $2"
    ))
    .bind(brand_id)
    .bind(week_start)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The most recent snapshot starting strictly before `week_start`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_snapshot_before(
    pool: &PgPool,
    brand_id: i64,
    week_start: NaiveDate,
) -> Result<Option<WeeklySnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, WeeklySnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM weekly_snapshots \
         WHERE brand_id = $1 AND week_start < $2 \
         ORDER BY week_start DESC \
         LIMIT 1"
    ))
    .bind(brand_id)
    .bind(week_start)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Most recent snapshots of a brand, newest week first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshots(
    pool: &PgPool,
    brand_id: i64,
    limit: i64,
) -> Result<Vec<WeeklySnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, WeeklySnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM weekly_snapshots \
         WHERE brand_id = $1 \
         ORDER BY week_start DESC \
         LIMIT $2"
    ))
    .bind(brand_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Snapshot coverage of one brand, as listed by [`list_snapshot_coverage`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandSnapshotSummaryRow {
    pub brand_id: i64,
    pub name: String,
    pub slug: String,
    pub domain: String,
    pub snapshot_count: i64,
    pub first_week: Option<NaiveDate>,
    pub last_week: Option<NaiveDate>,
}

/// Every active brand with its stored snapshot count and week range, ordered
/// by name. Brands without snapshots have a zero count and no range.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshot_coverage(pool: &PgPool) -> Result<Vec<BrandSnapshotSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandSnapshotSummaryRow>(
        "SELECT b.id AS brand_id, b.name, b.slug, b.domain, \
                COUNT(ws.id) AS snapshot_count, \
                MIN(ws.week_start) AS first_week, \
                MAX(ws.week_start) AS last_week \
         FROM brands b \
         LEFT JOIN weekly_snapshots ws ON ws.brand_id = b.id \
         WHERE b.is_active = true \
         GROUP BY b.id, b.name, b.slug, b.domain \
         ORDER BY b.name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
