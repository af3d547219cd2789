//! Postgres-backed implementation of the engine's storage ports.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use revsnap_core::{
    CumulativeStats, ReviewRecord, ReviewSource, SnapshotStore, StoreError, WeekWindow,
    WeeklySnapshot,
};
use sqlx::PgPool;

use crate::{reviews, snapshots, DbError};

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::backend(err)
    }
}

/// [`ReviewSource`] and [`SnapshotStore`] over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ReviewSource for PgStore {
    async fn reviews_in_window(
        &self,
        brand_id: i64,
        window: &WeekWindow,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let rows = reviews::list_reviews_in_window(&self.pool, brand_id, window).await?;
        Ok(rows
            .into_iter()
            .map(reviews::ReviewRow::into_record)
            .collect())
    }

    async fn reviews_up_to(
        &self,
        brand_id: i64,
        cutoff: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let rows = reviews::list_reviews_up_to(&self.pool, brand_id, cutoff).await?;
        Ok(rows
            .into_iter()
            .map(reviews::ReviewRow::into_record)
            .collect())
    }

    async fn stats_as_of(
        &self,
        brand_id: i64,
        cutoff: NaiveDate,
    ) -> Result<CumulativeStats, StoreError> {
        Ok(reviews::stats_as_of(&self.pool, brand_id, cutoff).await?)
    }

    async fn review_date_range(
        &self,
        brand_id: i64,
    ) -> Result<Option<(NaiveDate, NaiveDate)>, StoreError> {
        Ok(reviews::review_date_range(&self.pool, brand_id).await?)
    }

    async fn language_counts(&self, brand_id: i64) -> Result<BTreeMap<String, u64>, StoreError> {
        let rows = reviews::language_counts(&self.pool, Some(brand_id)).await?;
        Ok(rows
            .into_iter()
            .map(|(lang, count)| (lang, u64::try_from(count).unwrap_or(0)))
            .collect())
    }
}

impl SnapshotStore for PgStore {
    async fn upsert_snapshot(&self, snapshot: &WeeklySnapshot) -> Result<(), StoreError> {
        snapshots::upsert_snapshot(&self.pool, snapshot).await?;
        Ok(())
    }

    async fn latest_snapshot_before(
        &self,
        brand_id: i64,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklySnapshot>, StoreError> {
        let row = snapshots::get_latest_snapshot_before(&self.pool, brand_id, week_start).await?;
        Ok(row.map(snapshots::WeeklySnapshotRow::into_snapshot).transpose()?)
    }
}
