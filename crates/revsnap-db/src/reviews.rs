//! Database operations for the `reviews` table.
//!
//! Every query here except [`list_invalid_ratings`] and
//! [`rating_distribution`] skips flagged reviews (`is_flagged = true`, rating
//! outside 1-5) and undated ones. Date cutoffs are converted to UTC midnight
//! bounds in Rust so the session time zone never shifts a window.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use revsnap_core::stats::round2;
use revsnap_core::{CumulativeStats, ReviewRecord, WeekWindow};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub brand_id: i64,
    pub external_review_id: String,
    pub rating: i16,
    pub title: String,
    pub text: String,
    pub language: String,
    pub published_date: Option<DateTime<Utc>>,
    pub has_reply: bool,
    pub reply_date: Option<DateTime<Utc>>,
    pub verification_source: Option<String>,
    pub is_flagged: bool,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    #[must_use]
    pub fn into_record(self) -> ReviewRecord {
        ReviewRecord {
            review_id: self.external_review_id,
            rating: self.rating,
            title: self.title,
            text: self.text,
            language: self.language,
            published_date: self.published_date,
            has_reply: self.has_reply,
            reply_date: self.reply_date,
            verification_source: self.verification_source,
        }
    }
}

/// Raw output of the cumulative stats aggregate.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct StatsRow {
    pub review_count: i64,
    pub mean_rating: Option<f64>,
    pub replied: i64,
    pub mean_response_days: Option<f64>,
}

impl StatsRow {
    /// Round and convert into [`CumulativeStats`]; zero reviews give zeroes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn into_stats(self) -> CumulativeStats {
        let review_count = u64::try_from(self.review_count).unwrap_or(0);
        if review_count == 0 {
            return CumulativeStats::default();
        }
        CumulativeStats {
            review_count,
            mean_rating: round2(self.mean_rating.unwrap_or(0.0)),
            response_rate: round2(self.replied as f64 / self.review_count as f64 * 100.0),
            mean_response_days: round2(self.mean_response_days.unwrap_or(0.0)),
        }
    }
}

/// A review whose rating falls outside 1-5, joined with its brand.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvalidRatingRow {
    pub id: i64,
    pub brand_name: String,
    pub external_review_id: String,
    pub rating: i16,
    pub title: String,
    pub published_date: Option<DateTime<Utc>>,
}

const REVIEW_COLUMNS: &str = "id, brand_id, external_review_id, rating, title, text, language, \
     published_date, has_reply, reply_date, verification_source, is_flagged, created_at";

/// UTC midnight starting `date`.
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound covering all of `date`.
fn day_after(date: NaiveDate) -> DateTime<Utc> {
    day_start(date + Days::new(1))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert or update a review keyed by its external id, returning the row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_review(
    pool: &PgPool,
    brand_id: i64,
    review: &ReviewRecord,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO reviews \
             (brand_id, external_review_id, rating, title, text, language, published_date, \
              has_reply, reply_date, verification_source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (external_review_id) DO UPDATE SET \
             rating = EXCLUDED.rating, \
             title = EXCLUDED.title, \
             text = EXCLUDED.text, \
             language = EXCLUDED.language, \
             published_date = EXCLUDED.published_date, \
             has_reply = EXCLUDED.has_reply, \
             reply_date = EXCLUDED.reply_date, \
             verification_source = EXCLUDED.verification_source \
         RETURNING id",
    )
    .bind(brand_id)
    .bind(&review.review_id)
    .bind(review.rating)
    .bind(&review.title)
    .bind(&review.text)
    .bind(review.language_code())
    .bind(review.published_date)
    .bind(review.has_reply)
    .bind(review.reply_date)
    .bind(&review.verification_source)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Reviews published inside `window`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews_in_window(
    pool: &PgPool,
    brand_id: i64,
    window: &WeekWindow,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews \
         WHERE brand_id = $1 \
           AND is_flagged = false \
           AND published_date >= $2 \
           AND published_date < $3 \
         ORDER BY published_date, id"
    ))
    .bind(brand_id)
    .bind(day_start(window.start))
    .bind(day_after(window.end))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Reviews published on or before `cutoff`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews_up_to(
    pool: &PgPool,
    brand_id: i64,
    cutoff: NaiveDate,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews \
         WHERE brand_id = $1 \
           AND is_flagged = false \
           AND published_date < $2 \
         ORDER BY published_date, id"
    ))
    .bind(brand_id)
    .bind(day_after(cutoff))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Cumulative rating, response rate, and response latency as of `cutoff` in a
/// single aggregate.
///
/// Latency only averages replies dated on or after the review; every reply
/// still counts toward the response rate.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn stats_as_of(
    pool: &PgPool,
    brand_id: i64,
    cutoff: NaiveDate,
) -> Result<CumulativeStats, DbError> {
    let row = sqlx::query_as::<_, StatsRow>(
        "SELECT \
             COUNT(*) AS review_count, \
             AVG(rating)::float8 AS mean_rating, \
             COUNT(*) FILTER (WHERE has_reply) AS replied, \
             (AVG(EXTRACT(DAY FROM (reply_date - published_date))) \
                 FILTER (WHERE has_reply AND reply_date >= published_date))::float8 \
                 AS mean_response_days \
         FROM reviews \
         WHERE brand_id = $1 \
           AND is_flagged = false \
           AND published_date IS NOT NULL \
           AND published_date < $2",
    )
    .bind(brand_id)
    .bind(day_after(cutoff))
    .fetch_one(pool)
    .await?;

    Ok(row.into_stats())
}

/// Dates of the first and last countable review, or `None` when there are none.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn review_date_range(
    pool: &PgPool,
    brand_id: i64,
) -> Result<Option<(NaiveDate, NaiveDate)>, DbError> {
    let (first, last): (Option<DateTime<Utc>>, Option<DateTime<Utc>>) = sqlx::query_as(
        "SELECT MIN(published_date), MAX(published_date) \
         FROM reviews \
         WHERE brand_id = $1 AND is_flagged = false",
    )
    .bind(brand_id)
    .fetch_one(pool)
    .await?;

    Ok(first
        .zip(last)
        .map(|(f, l)| (f.date_naive(), l.date_naive())))
}

/// Review count per language, most common first. Blank languages are folded
/// into `unknown`. `None` counts across every brand.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn language_counts(
    pool: &PgPool,
    brand_id: Option<i64>,
) -> Result<Vec<(String, i64)>, DbError> {
    let rows = match brand_id {
        Some(id) => {
            sqlx::query_as::<_, (String, i64)>(
                "SELECT COALESCE(NULLIF(TRIM(language), ''), 'unknown') AS lang, COUNT(*) \
                 FROM reviews \
                 WHERE brand_id = $1 AND is_flagged = false AND published_date IS NOT NULL \
                 GROUP BY lang \
                 ORDER BY COUNT(*) DESC, lang",
            )
            .bind(id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, (String, i64)>(
                "SELECT COALESCE(NULLIF(TRIM(language), ''), 'unknown') AS lang, COUNT(*) \
                 FROM reviews \
                 WHERE is_flagged = false AND published_date IS NOT NULL \
                 GROUP BY lang \
                 ORDER BY COUNT(*) DESC, lang",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// One language of one brand in [`top_languages_by_brand`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandLanguageRow {
    pub brand_id: i64,
    pub language: String,
    pub review_count: i64,
    /// Reviews of the brand across every language, not just the listed ones.
    pub brand_total: i64,
}

/// The `per_brand` most common languages of every active brand, grouped by
/// brand and ordered by count descending then language. Brands without
/// reviews produce no rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_languages_by_brand(
    pool: &PgPool,
    per_brand: i64,
) -> Result<Vec<BrandLanguageRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandLanguageRow>(
        "WITH counts AS ( \
             SELECT r.brand_id, \
                    COALESCE(NULLIF(TRIM(r.language), ''), 'unknown') AS lang, \
                    COUNT(*) AS review_count \
             FROM reviews r \
             JOIN brands b ON b.id = r.brand_id \
             WHERE b.is_active = true \
               AND r.is_flagged = false \
               AND r.published_date IS NOT NULL \
             GROUP BY r.brand_id, lang \
         ), ranked AS ( \
             SELECT brand_id, lang, review_count, \
                    SUM(review_count) OVER (PARTITION BY brand_id)::BIGINT AS brand_total, \
                    ROW_NUMBER() OVER (PARTITION BY brand_id ORDER BY review_count DESC, lang) \
                        AS lang_rank \
             FROM counts \
         ) \
         SELECT brand_id, lang AS language, review_count, brand_total \
         FROM ranked \
         WHERE lang_rank <= $1 \
         ORDER BY brand_id, lang_rank",
    )
    .bind(per_brand)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Reviews with a rating outside 1-5, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_invalid_ratings(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<InvalidRatingRow>, DbError> {
    let rows = sqlx::query_as::<_, InvalidRatingRow>(
        "SELECT r.id, b.name AS brand_name, r.external_review_id, r.rating, r.title, \
                r.published_date \
         FROM reviews r \
         JOIN brands b ON b.id = r.brand_id \
         WHERE r.is_flagged = true \
         ORDER BY r.published_date DESC NULLS LAST, r.id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count of reviews per raw rating value, flagged ones included.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn rating_distribution(pool: &PgPool) -> Result<Vec<(i16, i64)>, DbError> {
    let rows = sqlx::query_as::<_, (i16, i64)>(
        "SELECT rating, COUNT(*) FROM reviews GROUP BY rating ORDER BY rating",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
