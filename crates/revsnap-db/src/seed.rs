use revsnap_core::brands::BrandConfig;
use sqlx::PgPool;

use crate::DbError;

/// Upsert brands from config into the database.
///
/// Returns the number of brands processed (inserted or updated). All upserts
/// run inside a single transaction; if any fails the batch is rolled back.
/// Seeding re-activates a brand that was previously deactivated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_brands(pool: &PgPool, brands: &[BrandConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for brand in brands {
        let slug = brand.slug();
        let domain = brand.domain.trim().to_lowercase();

        sqlx::query(
            "INSERT INTO brands (name, slug, domain, business_id, notes, is_active) \
             VALUES ($1, $2, $3, $4, $5, true) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 domain = EXCLUDED.domain, \
                 business_id = EXCLUDED.business_id, \
                 notes = EXCLUDED.notes, \
                 is_active = true, \
                 updated_at = NOW()",
        )
        .bind(&brand.name)
        .bind(&slug)
        .bind(&domain)
        .bind(&brand.business_id)
        .bind(&brand.notes)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
