//! Cumulative as-of-cutoff review metrics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::review::ReviewRecord;

/// Cumulative metrics over every countable review published on or before a
/// cutoff date. Zero reviews give all-zero fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeStats {
    pub review_count: u64,
    pub mean_rating: f64,
    /// Percentage (0-100) of reviews with a reply.
    pub response_rate: f64,
    /// Mean whole days between publication and reply.
    pub mean_response_days: f64,
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Single-pass fold producing [`CumulativeStats`].
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    count: u64,
    rating_sum: i64,
    replied: u64,
    latency_sum: i64,
    latency_count: u64,
}

impl StatsAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `review` if it is countable and published on or before `cutoff`.
    pub fn push(&mut self, review: &ReviewRecord, cutoff: NaiveDate) {
        if !review.has_valid_rating() {
            return;
        }
        match review.published_on() {
            Some(day) if day <= cutoff => {}
            _ => return,
        }
        self.count += 1;
        self.rating_sum += i64::from(review.rating);
        if review.has_reply {
            self.replied += 1;
        }
        if let Some(days) = review.response_days() {
            self.latency_sum += days;
            self.latency_count += 1;
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn finish(&self) -> CumulativeStats {
        if self.count == 0 {
            return CumulativeStats::default();
        }
        let count = self.count as f64;
        let mean_response_days = if self.latency_count == 0 {
            0.0
        } else {
            round2(self.latency_sum as f64 / self.latency_count as f64)
        };
        CumulativeStats {
            review_count: self.count,
            mean_rating: round2(self.rating_sum as f64 / count),
            response_rate: round2(self.replied as f64 / count * 100.0),
            mean_response_days,
        }
    }

    /// Fold `reviews` as of `cutoff` in one pass.
    pub fn collect<'a, I>(reviews: I, cutoff: NaiveDate) -> CumulativeStats
    where
        I: IntoIterator<Item = &'a ReviewRecord>,
    {
        let mut acc = Self::new();
        for review in reviews {
            acc.push(review, cutoff);
        }
        acc.finish()
    }
}
