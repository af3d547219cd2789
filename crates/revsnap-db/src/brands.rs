//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub slug: String,
    pub domain: String,
    pub business_id: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const BRAND_COLUMNS: &str =
    "id, public_id, name, slug, domain, business_id, notes, is_active, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all active brands, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE is_active = true ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single active brand by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand_by_slug(pool: &PgPool, slug: &str) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE slug = $1 AND is_active = true"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Marks a brand inactive so it is skipped by `snapshots generate`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand has `brand_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_brand(pool: &PgPool, brand_id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE brands \
         SET is_active = false, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(brand_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
