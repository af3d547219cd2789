//! The review record consumed by the snapshot engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Language code used when the review site did not report one.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// One customer review as stored by the ingest side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Review identifier assigned by the review site.
    pub review_id: String,
    /// Star rating `1..=5`; `0` marks a flagged review.
    pub rating: i16,
    pub title: String,
    pub text: String,
    pub language: String,
    pub published_date: Option<DateTime<Utc>>,
    pub has_reply: bool,
    pub reply_date: Option<DateTime<Utc>>,
    pub verification_source: Option<String>,
}

impl ReviewRecord {
    /// `true` when the rating is a real 1-5 star value.
    #[must_use]
    pub fn has_valid_rating(&self) -> bool {
        (1..=5).contains(&self.rating)
    }

    /// `true` when the review participates in rating and window aggregates.
    #[must_use]
    pub fn is_countable(&self) -> bool {
        self.has_valid_rating() && self.published_date.is_some()
    }

    /// UTC calendar date the review was published on.
    #[must_use]
    pub fn published_on(&self) -> Option<NaiveDate> {
        self.published_date.map(|d| d.date_naive())
    }

    /// Language code, with blanks folded into [`UNKNOWN_LANGUAGE`].
    #[must_use]
    pub fn language_code(&self) -> &str {
        let lang = self.language.trim();
        if lang.is_empty() {
            UNKNOWN_LANGUAGE
        } else {
            lang
        }
    }

    /// Verification source label used for the source distribution.
    #[must_use]
    pub fn source_label(&self) -> &str {
        self.verification_source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_LANGUAGE)
    }

    /// Whole days between publication and reply, when the reply is not
    /// dated before the review.
    #[must_use]
    pub fn response_days(&self) -> Option<i64> {
        if !self.has_reply {
            return None;
        }
        let published = self.published_date?;
        let replied = self.reply_date?;
        let days = (replied - published).num_days();
        (replied >= published).then_some(days)
    }

    /// Title and body joined the way the phrase extractor expects them.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.text).trim().to_string()
    }
}
