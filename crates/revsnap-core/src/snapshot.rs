//! The weekly snapshot record and its week-over-week comparison.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentBreakdown;
use crate::stats::round2;
use crate::window::WeekWindow;

/// A mined theme after cross-language merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTheme {
    /// Lower-cased English key equal phrases are merged under.
    pub canonical: String,
    /// Human-readable form, tagged with the source language when not English.
    pub display: String,
    pub count: u64,
}

/// Analytics for one brand and one Monday-anchored week.
///
/// Identified by `(brand_id, week_start)`. Cumulative fields cover every
/// review up to `week_end`; the sentiment counts, distributions, themes, and
/// review ids only cover the week itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySnapshot {
    pub brand_id: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub iso_week: String,

    pub total_reviews_to_date: u64,
    pub avg_rating: f64,
    pub response_rate: f64,
    pub avg_response_time_days: f64,

    pub new_reviews_this_week: u64,
    pub positive_count: u64,
    pub neutral_count: u64,
    pub negative_count: u64,
    /// Counts of ratings 1 through 5 this week.
    pub rating_histogram: [u64; 5],
    pub language_distribution: BTreeMap<String, u64>,
    pub source_distribution: BTreeMap<String, u64>,
    pub positive_themes: Vec<CanonicalTheme>,
    pub negative_themes: Vec<CanonicalTheme>,
    pub weekly_review_ids: Vec<String>,

    pub prev_week_review_count: u64,
    pub prev_week_avg_rating: f64,

    /// Never populated by the engine.
    pub ai_summary: Option<String>,
}

impl WeeklySnapshot {
    #[must_use]
    pub fn window(&self) -> WeekWindow {
        WeekWindow {
            start: self.week_start,
            end: self.week_end,
        }
    }

    #[must_use]
    pub fn sentiment(&self) -> SentimentBreakdown {
        SentimentBreakdown {
            positive: self.positive_count,
            neutral: self.neutral_count,
            negative: self.negative_count,
            histogram: self.rating_histogram,
        }
    }

    /// Positive, neutral, and negative shares of this week's reviews in
    /// percent; all zero for an empty week.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sentiment_percentages(&self) -> (f64, f64, f64) {
        let total = self.positive_count + self.neutral_count + self.negative_count;
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let pct = |n: u64| n as f64 / total as f64 * 100.0;
        (
            pct(self.positive_count),
            pct(self.neutral_count),
            pct(self.negative_count),
        )
    }

    /// The `n` most frequent languages this week, ties broken by code.
    #[must_use]
    pub fn top_languages(&self, n: usize) -> Vec<(&str, u64)> {
        let mut langs: Vec<(&str, u64)> = self
            .language_distribution
            .iter()
            .map(|(lang, count)| (lang.as_str(), *count))
            .collect();
        langs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        langs.truncate(n);
        langs
    }
}

/// Week-over-week movement computed from the carried-forward fields of one
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WowDelta {
    pub review_change: i64,
    /// Percent change in weekly volume; zero when the previous week had none.
    pub review_change_pct: f64,
    pub rating_change: f64,
}

impl WowDelta {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_snapshot(snapshot: &WeeklySnapshot) -> Self {
        let current = i64::try_from(snapshot.new_reviews_this_week).unwrap_or(i64::MAX);
        let previous = i64::try_from(snapshot.prev_week_review_count).unwrap_or(i64::MAX);
        let review_change = current.saturating_sub(previous);
        let review_change_pct = if previous > 0 {
            review_change as f64 / previous as f64 * 100.0
        } else {
            0.0
        };
        Self {
            review_change,
            review_change_pct,
            rating_change: round2(snapshot.avg_rating - snapshot.prev_week_avg_rating),
        }
    }
}
