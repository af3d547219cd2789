//! Rating-based sentiment buckets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Rating cut-offs for the three sentiment buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentThresholds {
    pub positive_min: i16,
    pub neutral_rating: i16,
    pub negative_max: i16,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive_min: 4,
            neutral_rating: 3,
            negative_max: 2,
        }
    }
}

/// Classify a star rating. Ratings outside `1..=5` are not classified.
///
/// Anything between `negative_max` and `positive_min` (exclusive) is neutral,
/// so raising `positive_min` to 5 moves 4-star reviews into the neutral bucket.
#[must_use]
pub fn classify(rating: i16, thresholds: &SentimentThresholds) -> Option<Sentiment> {
    if !(1..=5).contains(&rating) {
        return None;
    }
    let sentiment = if rating >= thresholds.positive_min {
        Sentiment::Positive
    } else if rating <= thresholds.negative_max {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    Some(sentiment)
}

/// Sentiment triad plus the per-star histogram for a set of ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    /// Count of ratings 1 through 5, index 0 holding 1-star reviews.
    pub histogram: [u64; 5],
}

impl SentimentBreakdown {
    /// Tally `ratings`, skipping anything outside `1..=5`.
    pub fn from_ratings<I>(ratings: I, thresholds: &SentimentThresholds) -> Self
    where
        I: IntoIterator<Item = i16>,
    {
        let mut breakdown = Self::default();
        for rating in ratings {
            let Some(sentiment) = classify(rating, thresholds) else {
                continue;
            };
            if let Ok(idx) = usize::try_from(rating - 1) {
                breakdown.histogram[idx] += 1;
            }
            match sentiment {
                Sentiment::Positive => breakdown.positive += 1,
                Sentiment::Neutral => breakdown.neutral += 1,
                Sentiment::Negative => breakdown.negative += 1,
            }
        }
        breakdown
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    /// Count of reviews with the given star rating.
    #[must_use]
    pub fn count_for(&self, rating: i16) -> u64 {
        usize::try_from(rating - 1)
            .ok()
            .and_then(|idx| self.histogram.get(idx).copied())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_boundaries() {
        let t = SentimentThresholds::default();
        assert_eq!(classify(5, &t), Some(Sentiment::Positive));
        assert_eq!(classify(4, &t), Some(Sentiment::Positive));
        assert_eq!(classify(3, &t), Some(Sentiment::Neutral));
        assert_eq!(classify(2, &t), Some(Sentiment::Negative));
        assert_eq!(classify(1, &t), Some(Sentiment::Negative));
    }

    #[test]
    fn out_of_range_ratings_are_not_classified() {
        let t = SentimentThresholds::default();
        assert_eq!(classify(0, &t), None);
        assert_eq!(classify(6, &t), None);
        assert_eq!(classify(-1, &t), None);
    }

    #[test]
    fn raising_positive_min_moves_four_to_neutral() {
        let t = SentimentThresholds {
            positive_min: 5,
            ..SentimentThresholds::default()
        };
        assert_eq!(classify(4, &t), Some(Sentiment::Neutral));
        assert_eq!(classify(5, &t), Some(Sentiment::Positive));
        assert_eq!(classify(3, &t), Some(Sentiment::Neutral));
    }

    #[test]
    fn breakdown_counts_triad_and_histogram() {
        let t = SentimentThresholds::default();
        let b = SentimentBreakdown::from_ratings([5, 5, 1, 3, 0, 4, 2, 7], &t);
        assert_eq!(b.positive, 3);
        assert_eq!(b.neutral, 1);
        assert_eq!(b.negative, 2);
        assert_eq!(b.histogram, [1, 1, 1, 1, 2]);
        assert_eq!(b.total(), 6);
        assert_eq!(b.count_for(5), 2);
        assert_eq!(b.count_for(0), 0);
    }

    #[test]
    fn empty_breakdown_is_zero() {
        let b = SentimentBreakdown::from_ratings(Vec::new(), &SentimentThresholds::default());
        assert_eq!(b, SentimentBreakdown::default());
    }
}
