//! Storage contracts consumed by the snapshot engine.
//!
//! The engine only talks to these traits; `revsnap-db` provides the Postgres
//! implementation and [`crate::memory::MemoryStore`] an in-memory one.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;

use crate::review::ReviewRecord;
use crate::snapshot::WeeklySnapshot;
use crate::stats::CumulativeStats;
use crate::window::WeekWindow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }
}

/// Read access to a brand's reviews.
///
/// Every method only sees countable reviews: flagged ratings (outside
/// `1..=5`) and reviews without a publication date are never returned or
/// aggregated.
pub trait ReviewSource: Send + Sync {
    /// Reviews published inside `window`, ordered by publication time.
    fn reviews_in_window(
        &self,
        brand_id: i64,
        window: &WeekWindow,
    ) -> impl Future<Output = Result<Vec<ReviewRecord>, StoreError>> + Send;

    /// Reviews published on or before `cutoff` (end of day inclusive).
    fn reviews_up_to(
        &self,
        brand_id: i64,
        cutoff: NaiveDate,
    ) -> impl Future<Output = Result<Vec<ReviewRecord>, StoreError>> + Send;

    /// Cumulative metrics as of `cutoff`, end of day inclusive.
    fn stats_as_of(
        &self,
        brand_id: i64,
        cutoff: NaiveDate,
    ) -> impl Future<Output = Result<CumulativeStats, StoreError>> + Send;

    /// Publication dates of the first and last review, `None` when the brand
    /// has no countable reviews.
    fn review_date_range(
        &self,
        brand_id: i64,
    ) -> impl Future<Output = Result<Option<(NaiveDate, NaiveDate)>, StoreError>> + Send;

    /// Review count per language code over the brand's whole history.
    fn language_counts(
        &self,
        brand_id: i64,
    ) -> impl Future<Output = Result<BTreeMap<String, u64>, StoreError>> + Send;
}

/// Persistence for assembled snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Insert or fully replace the snapshot keyed by `(brand_id, week_start)`.
    fn upsert_snapshot(
        &self,
        snapshot: &WeeklySnapshot,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The most recent snapshot whose week starts strictly before `week_start`.
    fn latest_snapshot_before(
        &self,
        brand_id: i64,
        week_start: NaiveDate,
    ) -> impl Future<Output = Result<Option<WeeklySnapshot>, StoreError>> + Send;
}
