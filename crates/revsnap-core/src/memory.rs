//! In-memory [`ReviewSource`] and [`SnapshotStore`] backing the engine tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Days, NaiveDate};

use crate::ports::{ReviewSource, SnapshotStore, StoreError};
use crate::review::ReviewRecord;
use crate::snapshot::WeeklySnapshot;
use crate::stats::{CumulativeStats, StatsAccumulator};
use crate::window::WeekWindow;

#[derive(Debug, Default)]
struct Inner {
    reviews: HashMap<i64, Vec<ReviewRecord>>,
    snapshots: BTreeMap<(i64, NaiveDate), WeeklySnapshot>,
}

/// Mutex-backed store holding reviews and snapshots per brand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    upserts: AtomicU64,
}

#[derive(Debug, thiserror::Error)]
#[error("simulated read failure")]
struct SimulatedFailure;

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append reviews for `brand_id`. Flagged and undated records are kept
    /// but never surface through [`ReviewSource`].
    pub fn add_reviews<I>(&self, brand_id: i64, reviews: I)
    where
        I: IntoIterator<Item = ReviewRecord>,
    {
        self.lock()
            .reviews
            .entry(brand_id)
            .or_default()
            .extend(reviews);
    }

    /// Seed a stored snapshot without counting it as an upsert.
    pub fn put_snapshot(&self, snapshot: WeeklySnapshot) {
        self.lock()
            .snapshots
            .insert((snapshot.brand_id, snapshot.week_start), snapshot);
    }

    /// All stored snapshots of `brand_id` ordered by week.
    #[must_use]
    pub fn snapshots(&self, brand_id: i64) -> Vec<WeeklySnapshot> {
        self.lock()
            .snapshots
            .range((brand_id, NaiveDate::MIN)..=(brand_id, NaiveDate::MAX))
            .map(|(_, s)| s.clone())
            .collect()
    }

    /// Number of `upsert_snapshot` calls served so far.
    #[must_use]
    pub fn upsert_count(&self) -> u64 {
        self.upserts.load(Ordering::Relaxed)
    }

    /// Make every read fail with a backend error until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::backend(SimulatedFailure));
        }
        Ok(())
    }

    fn countable(&self, brand_id: i64) -> Result<Vec<ReviewRecord>, StoreError> {
        self.check_reads()?;
        let mut reviews: Vec<ReviewRecord> = self
            .lock()
            .reviews
            .get(&brand_id)
            .map(|all| all.iter().filter(|r| r.is_countable()).cloned().collect())
            .unwrap_or_default();
        reviews.sort_by_key(|r| r.published_date);
        Ok(reviews)
    }
}

impl ReviewSource for MemoryStore {
    async fn reviews_in_window(
        &self,
        brand_id: i64,
        window: &WeekWindow,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let mut reviews = self.countable(brand_id)?;
        reviews.retain(|r| r.published_on().is_some_and(|d| window.contains(d)));
        Ok(reviews)
    }

    async fn reviews_up_to(
        &self,
        brand_id: i64,
        cutoff: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let mut reviews = self.countable(brand_id)?;
        reviews.retain(|r| r.published_on().is_some_and(|d| d <= cutoff));
        Ok(reviews)
    }

    async fn stats_as_of(
        &self,
        brand_id: i64,
        cutoff: NaiveDate,
    ) -> Result<CumulativeStats, StoreError> {
        let reviews = self.countable(brand_id)?;
        Ok(StatsAccumulator::collect(&reviews, cutoff))
    }

    async fn review_date_range(
        &self,
        brand_id: i64,
    ) -> Result<Option<(NaiveDate, NaiveDate)>, StoreError> {
        let reviews = self.countable(brand_id)?;
        let mut dates = reviews.iter().filter_map(ReviewRecord::published_on);
        let Some(first) = dates.next() else {
            return Ok(None);
        };
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Ok(Some((min, max)))
    }

    async fn language_counts(&self, brand_id: i64) -> Result<BTreeMap<String, u64>, StoreError> {
        let reviews = self.countable(brand_id)?;
        let mut counts = BTreeMap::new();
        for review in &reviews {
            *counts.entry(review.language_code().to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

impl SnapshotStore for MemoryStore {
    async fn upsert_snapshot(&self, snapshot: &WeeklySnapshot) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .snapshots
            .insert((snapshot.brand_id, snapshot.week_start), snapshot.clone());
        Ok(())
    }

    async fn latest_snapshot_before(
        &self,
        brand_id: i64,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklySnapshot>, StoreError> {
        self.check_reads()?;
        let Some(upper) = week_start.checked_sub_days(Days::new(1)) else {
            return Ok(None);
        };
        Ok(self
            .lock()
            .snapshots
            .range((brand_id, NaiveDate::MIN)..=(brand_id, upper))
            .next_back()
            .map(|(_, s)| s.clone()))
    }
}
