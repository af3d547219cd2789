//! Drives snapshot assembly across a brand's weeks.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use revsnap_core::{
    window_for, windows_covering, AnalyticsConfig, ReviewSource, SnapshotStore, WeeklySnapshot,
};

use crate::assembler::SnapshotAssembler;
use crate::coverage::significant_from_counts;
use crate::error::AnalyticsError;
use crate::miner::ThemeMiner;
use crate::resources::{ExtractionProvider, ResourceManager, ResourceReport};
use crate::translate::Translator;

/// Outcome of one brand run.
#[derive(Debug, Clone)]
pub struct BackfillSummary {
    pub brand_id: i64,
    pub weeks_written: usize,
    /// The stop flag ended the run before the last week.
    pub stopped: bool,
    pub last: Option<WeeklySnapshot>,
    pub report: ResourceReport,
}

pub struct BackfillDriver<'a, S, P, T> {
    store: &'a S,
    resources: &'a ResourceManager<P>,
    translator: &'a T,
    config: &'a AnalyticsConfig,
    stop: &'a AtomicBool,
    dry_run: bool,
}

impl<'a, S, P, T> BackfillDriver<'a, S, P, T>
where
    S: ReviewSource + SnapshotStore,
    P: ExtractionProvider,
    T: Translator,
{
    pub fn new(
        store: &'a S,
        resources: &'a ResourceManager<P>,
        translator: &'a T,
        config: &'a AnalyticsConfig,
        stop: &'a AtomicBool,
    ) -> Self {
        Self {
            store,
            resources,
            translator,
            config,
            stop,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Provision pipelines for every language above the coverage threshold
    /// in the brand's full history. Runs once per brand, before any week.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the language counts cannot be read.
    pub async fn prepare(&self, brand_id: i64) -> Result<ResourceReport, AnalyticsError> {
        let counts = self.store.language_counts(brand_id).await?;
        let languages = significant_from_counts(&counts, self.config.min_language_coverage_pct);
        tracing::info!(
            brand_id,
            languages = ?languages,
            "provisioning extraction pipelines"
        );
        Ok(self.resources.ensure(&languages).await)
    }

    fn assembler<'r>(&'r self, report: &'r ResourceReport) -> SnapshotAssembler<'r, S, P, T> {
        let miner = ThemeMiner::new(self.resources.provider(), self.translator, self.config);
        SnapshotAssembler::new(self.store, miner, self.config, report).dry_run(self.dry_run)
    }

    /// Assemble every week from the first review's week through the week
    /// containing `today`, threading each snapshot into the next.
    ///
    /// The stop flag is checked between weeks; weeks already written stay
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NoReviews`] when the brand has no countable
    /// reviews, and [`AnalyticsError::Store`] on read or write failures.
    pub async fn run_historical(
        &self,
        brand_id: i64,
        today: NaiveDate,
    ) -> Result<BackfillSummary, AnalyticsError> {
        let Some((first, last)) = self.store.review_date_range(brand_id).await? else {
            return Err(AnalyticsError::NoReviews { brand_id });
        };

        let report = self.prepare(brand_id).await?;
        let assembler = self.assembler(&report);
        let windows = windows_covering(first, last.max(today));
        tracing::info!(brand_id, weeks = windows.len(), %first, "starting historical backfill");

        let mut previous: Option<WeeklySnapshot> = None;
        let mut weeks_written = 0;
        let mut stopped = false;

        for window in windows {
            if self.stop.load(Ordering::Relaxed) {
                tracing::warn!(
                    brand_id,
                    week = %window.iso_week(),
                    "stop requested; ending backfill"
                );
                stopped = true;
                break;
            }
            let snapshot = assembler
                .assemble(brand_id, &window, previous.as_ref())
                .await?;
            weeks_written += 1;
            previous = Some(snapshot);
        }

        Ok(BackfillSummary {
            brand_id,
            weeks_written,
            stopped,
            last: previous,
            report,
        })
    }

    /// Assemble only the week containing `today`, using the latest stored
    /// snapshot before it as the predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] on read or write failures.
    pub async fn run_current_week(
        &self,
        brand_id: i64,
        today: NaiveDate,
    ) -> Result<BackfillSummary, AnalyticsError> {
        let window = window_for(today);
        let previous = self
            .store
            .latest_snapshot_before(brand_id, window.start)
            .await?;

        let report = self.prepare(brand_id).await?;
        let snapshot = self
            .assembler(&report)
            .assemble(brand_id, &window, previous.as_ref())
            .await?;

        Ok(BackfillSummary {
            brand_id,
            weeks_written: 1,
            stopped: false,
            last: Some(snapshot),
            report,
        })
    }
}
