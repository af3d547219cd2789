//! Language share of a brand's reviews and which languages merit a mining
//! pipeline.

use std::collections::{BTreeMap, BTreeSet};

use revsnap_core::ReviewRecord;

use crate::resources::profile;

/// Review count per language code. Flagged ratings are left out; blank
/// languages count as `unknown`.
#[must_use]
pub fn coverage(reviews: &[ReviewRecord]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for review in reviews.iter().filter(|r| r.has_valid_rating()) {
        *counts.entry(review.language_code().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Languages at or above `min_pct` percent of `reviews` that have an
/// extraction pipeline.
#[must_use]
pub fn significant(reviews: &[ReviewRecord], min_pct: f64) -> BTreeSet<String> {
    significant_from_counts(&coverage(reviews), min_pct)
}

#[must_use]
pub fn significant_from_counts(counts: &BTreeMap<String, u64>, min_pct: f64) -> BTreeSet<String> {
    coverage_report(counts, min_pct)
        .into_iter()
        .filter(|share| share.significant)
        .map(|share| share.language)
        .collect()
}

/// One row of the language analysis table.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub language: String,
    pub count: u64,
    pub pct: f64,
    pub resource_id: Option<&'static str>,
    /// Meets the coverage threshold and has a pipeline.
    pub significant: bool,
}

/// Every language with its share, sorted by count descending then code.
#[must_use]
pub fn coverage_report(counts: &BTreeMap<String, u64>, min_pct: f64) -> Vec<LanguageShare> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut shares: Vec<LanguageShare> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(language, &count)| {
            let pct = count as f64 / total as f64 * 100.0;
            let resource_id = profile(language).map(|p| p.resource_id);
            LanguageShare {
                language: language.clone(),
                count,
                pct,
                resource_id,
                significant: pct >= min_pct && resource_id.is_some(),
            }
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.language.cmp(&b.language)));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::review;

    fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(l, c)| ((*l).to_string(), *c)).collect()
    }

    #[test]
    fn coverage_counts_unknown_and_skips_flagged() {
        let reviews = vec![
            review("r1", 5, "en", "2025-03-03", "a"),
            review("r2", 4, "", "2025-03-03", "b"),
            review("r3", 0, "de", "2025-03-04", "x"),
        ];

        let c = coverage(&reviews);
        assert_eq!(c, counts(&[("en", 1), ("unknown", 1)]));
    }

    #[test]
    fn one_percent_language_is_below_two_percent_threshold() {
        let c = counts(&[("en", 99), ("de", 1)]);
        let langs = significant_from_counts(&c, 2.0);
        assert!(langs.contains("en"));
        assert!(!langs.contains("de"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let c = counts(&[("en", 49), ("fr", 1)]);
        assert!(significant_from_counts(&c, 2.0).contains("fr"));
    }

    #[test]
    fn unknown_and_unsupported_languages_never_qualify() {
        let c = counts(&[("unknown", 50), ("xx", 50)]);
        assert!(significant_from_counts(&c, 2.0).is_empty());
    }

    #[test]
    fn empty_input_gives_empty_set() {
        assert!(significant(&[], 2.0).is_empty());
        assert!(coverage_report(&BTreeMap::new(), 2.0).is_empty());
    }

    #[test]
    fn report_orders_by_count_and_names_pipeline() {
        let c = counts(&[("da", 3), ("en", 6), ("unknown", 1)]);
        let report = coverage_report(&c, 20.0);

        let langs: Vec<&str> = report.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(langs, vec!["en", "da", "unknown"]);
        assert_eq!(report[0].resource_id, Some("en_core_web_sm"));
        assert!((report[0].pct - 60.0).abs() < 1e-9);
        assert!(report[1].significant);
        assert_eq!(report[2].resource_id, None);
        assert!(!report[2].significant);
    }
}
