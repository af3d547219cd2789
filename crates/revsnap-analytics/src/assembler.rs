//! Builds one brand's snapshot for one week.

use std::collections::BTreeMap;

use revsnap_core::stats::round2;
use revsnap_core::{
    AnalyticsConfig, CumulativeStats, ReviewRecord, ReviewSource, SentimentBreakdown,
    SentimentThresholds, SnapshotStore, WeekWindow, WeeklySnapshot,
};

use crate::error::AnalyticsError;
use crate::miner::ThemeMiner;
use crate::resources::{ExtractionProvider, ResourceReport};
use crate::translate::Translator;

/// Ratings mined for positive themes.
pub const POSITIVE_RATINGS: [i16; 2] = [4, 5];
/// Ratings mined for negative themes.
pub const NEGATIVE_RATINGS: [i16; 2] = [1, 2];

/// Every field of the snapshot except the themes.
///
/// `week_reviews` are the reviews published inside `window`; `stats` are the
/// cumulative figures as of `window.end`.
#[must_use]
pub fn build_snapshot(
    brand_id: i64,
    window: &WeekWindow,
    week_reviews: &[ReviewRecord],
    stats: CumulativeStats,
    thresholds: &SentimentThresholds,
    previous: Option<&WeeklySnapshot>,
) -> WeeklySnapshot {
    let countable: Vec<&ReviewRecord> = week_reviews
        .iter()
        .filter(|r| r.has_valid_rating())
        .collect();
    let sentiment =
        SentimentBreakdown::from_ratings(countable.iter().map(|r| r.rating), thresholds);

    let mut language_distribution = BTreeMap::new();
    let mut source_distribution = BTreeMap::new();
    for review in &countable {
        *language_distribution
            .entry(review.language_code().to_string())
            .or_insert(0) += 1;
        *source_distribution
            .entry(review.source_label().to_string())
            .or_insert(0) += 1;
    }

    let avg_rating = round2(stats.mean_rating);

    WeeklySnapshot {
        brand_id,
        week_start: window.start,
        week_end: window.end,
        iso_week: window.iso_week(),
        total_reviews_to_date: stats.review_count,
        avg_rating,
        response_rate: round2(stats.response_rate),
        avg_response_time_days: round2(stats.mean_response_days),
        new_reviews_this_week: u64::try_from(countable.len()).unwrap_or(u64::MAX),
        positive_count: sentiment.positive,
        neutral_count: sentiment.neutral,
        negative_count: sentiment.negative,
        rating_histogram: sentiment.histogram,
        language_distribution,
        source_distribution,
        positive_themes: Vec::new(),
        negative_themes: Vec::new(),
        weekly_review_ids: countable.iter().map(|r| r.review_id.clone()).collect(),
        prev_week_review_count: previous.map_or(0, |p| p.new_reviews_this_week),
        prev_week_avg_rating: previous.map_or(avg_rating, |p| p.avg_rating),
        ai_summary: None,
    }
}

/// Reads a week's reviews, mines its themes, and persists the result.
pub struct SnapshotAssembler<'a, S, P, T> {
    store: &'a S,
    miner: ThemeMiner<'a, P, T>,
    config: &'a AnalyticsConfig,
    report: &'a ResourceReport,
    dry_run: bool,
}

impl<'a, S, P, T> SnapshotAssembler<'a, S, P, T>
where
    S: ReviewSource + SnapshotStore,
    P: ExtractionProvider,
    T: Translator,
{
    pub fn new(
        store: &'a S,
        miner: ThemeMiner<'a, P, T>,
        config: &'a AnalyticsConfig,
        report: &'a ResourceReport,
    ) -> Self {
        Self {
            store,
            miner,
            config,
            report,
            dry_run: false,
        }
    }

    /// Skip the upsert; [`Self::assemble`] still returns the full record.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Assemble and upsert the snapshot of `brand_id` for `window`.
    ///
    /// `previous` is the snapshot of the preceding week, if any; it supplies
    /// the week-over-week carry fields.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if reviews cannot be read or the
    /// snapshot cannot be written. Extraction and translation problems only
    /// shrink the theme lists.
    pub async fn assemble(
        &self,
        brand_id: i64,
        window: &WeekWindow,
        previous: Option<&WeeklySnapshot>,
    ) -> Result<WeeklySnapshot, AnalyticsError> {
        let week_reviews = self.store.reviews_in_window(brand_id, window).await?;
        let stats = self.store.stats_as_of(brand_id, window.end).await?;

        let mut snapshot = build_snapshot(
            brand_id,
            window,
            &week_reviews,
            stats,
            &self.config.thresholds(),
            previous,
        );

        let max_themes = self.config.max_themes;
        snapshot.positive_themes = self
            .miner
            .mine(self.report, &week_reviews, &POSITIVE_RATINGS, max_themes)
            .await;
        snapshot.negative_themes = self
            .miner
            .mine(self.report, &week_reviews, &NEGATIVE_RATINGS, max_themes)
            .await;

        if !self.dry_run {
            self.store.upsert_snapshot(&snapshot).await?;
        }

        tracing::debug!(
            brand_id,
            week = %snapshot.iso_week,
            new_reviews = snapshot.new_reviews_this_week,
            total = snapshot.total_reviews_to_date,
            dry_run = self.dry_run,
            "snapshot assembled"
        );

        Ok(snapshot)
    }
}
