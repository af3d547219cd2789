//! Recurring noun-phrase themes in a set of reviews.

use std::collections::BTreeMap;

use revsnap_core::{AnalyticsConfig, CanonicalTheme, ReviewRecord};

use crate::dedup::deduplicate;
use crate::resources::{ExtractionProvider, LanguageProfile, ResourceReport, GENERIC_PHRASES};
use crate::translate::Translator;

/// Below this many reviews a positive-only pool accepts single mentions.
const SMALL_POOL: usize = 5;

/// A phrase that survived filtering, counted within one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCandidate {
    pub phrase: String,
    pub language: String,
    pub count: u64,
}

/// Lower-case and collapse runs of whitespace.
#[must_use]
pub fn normalize_phrase(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` when a normalized phrase is specific enough to be a theme.
#[must_use]
pub fn accept_candidate(phrase: &str, profile: &LanguageProfile, config: &AnalyticsConfig) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() < config.min_phrase_words || words.len() > config.max_phrase_words {
        return false;
    }
    if phrase.chars().count() < 8 {
        return false;
    }
    if phrase.chars().any(char::is_numeric) {
        return false;
    }
    if words.first().is_some_and(|w| profile.is_stop_word(w)) {
        return false;
    }
    if GENERIC_PHRASES.contains(&phrase) {
        return false;
    }
    let generic = words.iter().filter(|w| profile.is_generic_word(w)).count();
    generic * 2 <= words.len()
}

/// Minimum mentions a phrase needs to be kept.
///
/// Normally `min_phrase_frequency`. A filter made only of positive ratings
/// over a pool smaller than five reviews accepts a single mention, so thin
/// positive weeks still surface something. Negative and mixed filters never
/// relax.
#[must_use]
pub fn frequency_threshold(rating_filter: &[i16], pool_size: usize, config: &AnalyticsConfig) -> u64 {
    let positive_only = !rating_filter.is_empty()
        && rating_filter
            .iter()
            .all(|r| *r >= config.positive_rating_min);
    if positive_only && pool_size < SMALL_POOL {
        1
    } else {
        u64::try_from(config.min_phrase_frequency).unwrap_or(u64::MAX)
    }
}

fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct ThemeMiner<'a, P, T> {
    provider: &'a P,
    translator: &'a T,
    config: &'a AnalyticsConfig,
}

impl<'a, P, T> ThemeMiner<'a, P, T>
where
    P: ExtractionProvider,
    T: Translator,
{
    pub fn new(provider: &'a P, translator: &'a T, config: &'a AnalyticsConfig) -> Self {
        Self {
            provider,
            translator,
            config,
        }
    }

    /// Themes for reviews whose rating is in `rating_filter`, merged across
    /// languages and capped at `max_themes`.
    pub async fn mine(
        &self,
        report: &ResourceReport,
        reviews: &[ReviewRecord],
        rating_filter: &[i16],
        max_themes: usize,
    ) -> Vec<CanonicalTheme> {
        let candidates = self.candidates(report, reviews, rating_filter).await;
        deduplicate(
            candidates,
            self.translator,
            self.config.translation_enabled,
            max_themes,
        )
        .await
    }

    /// Per-language phrase counts at or above the frequency threshold.
    ///
    /// Languages without a ready pipeline in `report` contribute nothing.
    pub async fn candidates(
        &self,
        report: &ResourceReport,
        reviews: &[ReviewRecord],
        rating_filter: &[i16],
    ) -> Vec<ThemeCandidate> {
        let pool: Vec<&ReviewRecord> = reviews
            .iter()
            .filter(|r| r.has_valid_rating() && rating_filter.contains(&r.rating))
            .collect();
        let threshold = frequency_threshold(rating_filter, pool.len(), self.config);

        let mut by_language: BTreeMap<&str, Vec<&ReviewRecord>> = BTreeMap::new();
        for &review in &pool {
            by_language
                .entry(review.language_code())
                .or_default()
                .push(review);
        }

        let mut out = Vec::new();
        for (language, group) in by_language {
            let Some(resource) = report.resource(language) else {
                continue;
            };

            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for review in group {
                let combined = review.combined_text();
                let text = truncate_chars(&combined, self.config.text_length_cap);
                if text.is_empty() {
                    continue;
                }

                let phrases = match self.provider.extract_phrases(&resource.handle, text).await {
                    Ok(phrases) => phrases,
                    Err(e) => {
                        tracing::debug!(
                            review = %review.review_id,
                            lang = language,
                            error = %e,
                            "phrase extraction failed; skipping review"
                        );
                        continue;
                    }
                };

                for raw in phrases {
                    let phrase = normalize_phrase(&raw);
                    if accept_candidate(&phrase, resource.profile, self.config) {
                        *counts.entry(phrase).or_insert(0) += 1;
                    }
                }
            }

            let mut kept: Vec<ThemeCandidate> = counts
                .into_iter()
                .filter(|(_, count)| *count >= threshold)
                .map(|(phrase, count)| ThemeCandidate {
                    phrase,
                    language: language.to_string(),
                    count,
                })
                .collect();
            kept.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
            out.extend(kept);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::resources::{profile, ResourceCache, ResourceManager};
    use crate::testing::{review, FakeProvider};
    use crate::translate::DisabledTranslator;

    fn en() -> &'static LanguageProfile {
        profile("en").unwrap()
    }

    async fn ready(
        provider: FakeProvider,
        langs: &[&str],
    ) -> (ResourceManager<FakeProvider>, ResourceReport) {
        let cache = ResourceCache::in_memory(
            langs.iter().filter_map(|l| profile(l)).map(|p| p.resource_id),
        );
        let manager = ResourceManager::new(provider, cache);
        let set: BTreeSet<String> = langs.iter().map(|l| (*l).to_string()).collect();
        let report = manager.ensure(&set).await;
        (manager, report)
    }

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_phrase("  Fast \n Delivery "), "fast delivery");
    }

    #[test]
    fn single_word_is_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("deliveryservice", en(), &config));
    }

    #[test]
    fn too_many_words_are_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("very very very fast friendly delivery", en(), &config));
        assert!(accept_candidate("very fast friendly delivery", en(), &config));
    }

    #[test]
    fn short_phrase_is_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("big box", en(), &config));
    }

    #[test]
    fn digits_are_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("delivery in 2 days", en(), &config));
    }

    #[test]
    fn stop_word_start_is_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("their support team", en(), &config));
    }

    #[test]
    fn blocklisted_phrase_is_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("my account", en(), &config));
        assert!(!accept_candidate("this company", en(), &config));
    }

    #[test]
    fn mostly_generic_words_are_rejected() {
        let config = AnalyticsConfig::default();
        assert!(!accept_candidate("the app experience", en(), &config));
        // Exactly half generic is still specific enough.
        assert!(accept_candidate("the refund", en(), &config));
    }

    #[test]
    fn threshold_relaxes_only_for_small_positive_pools() {
        let config = AnalyticsConfig::default();
        assert_eq!(frequency_threshold(&[4, 5], 2, &config), 1);
        assert_eq!(frequency_threshold(&[4, 5], 5, &config), 2);
        assert_eq!(frequency_threshold(&[1, 2], 1, &config), 2);
        assert_eq!(frequency_threshold(&[3, 4, 5], 1, &config), 2);
        assert_eq!(frequency_threshold(&[], 0, &config), 2);
    }

    #[test]
    fn threshold_follows_positive_min() {
        let config = AnalyticsConfig {
            positive_rating_min: 5,
            ..AnalyticsConfig::default()
        };
        assert_eq!(frequency_threshold(&[4, 5], 1, &config), 2);
        assert_eq!(frequency_threshold(&[5], 1, &config), 1);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("schöne lieferung", 4), "schö");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn three_review_scenario() {
        let provider = FakeProvider::default()
            .with_chunks("fast delivery great service", ["fast delivery", "great service"])
            .with_chunks("fast delivery again", ["Fast delivery"])
            .with_chunks("terrible support team", ["terrible support"]);
        let (manager, report) = ready(provider, &["en"]).await;
        let config = AnalyticsConfig::default();
        let translator = DisabledTranslator;
        let miner = ThemeMiner::new(manager.provider(), &translator, &config);

        let reviews = vec![
            review("r1", 5, "en", "2025-03-03", "fast delivery great service"),
            review("r2", 5, "en", "2025-03-04", "fast delivery again"),
            review("r3", 1, "en", "2025-03-05", "terrible support team"),
        ];

        let positive = miner.mine(&report, &reviews, &[4, 5], 10).await;
        assert_eq!(positive[0].canonical, "fast delivery");
        assert_eq!(positive[0].display, "fast delivery");
        assert_eq!(positive[0].count, 2);
        // Two positive reviews relax the threshold, so single mentions stay.
        assert!(positive.iter().any(|t| t.canonical == "great service" && t.count == 1));

        // One negative review does not relax it: "terrible support" is dropped.
        let negative = miner.mine(&report, &reviews, &[1, 2], 10).await;
        assert!(negative.is_empty());
    }

    #[tokio::test]
    async fn language_without_pipeline_contributes_nothing() {
        let provider = FakeProvider::default()
            .with_chunks("schnelle lieferung", ["schnelle lieferung"])
            .with_chunks("fast delivery", ["fast delivery"]);
        let (manager, report) = ready(provider, &["en"]).await;
        let config = AnalyticsConfig::default();
        let translator = DisabledTranslator;
        let miner = ThemeMiner::new(manager.provider(), &translator, &config);

        let reviews = vec![
            review("r1", 5, "en", "2025-03-03", "fast delivery"),
            review("r2", 5, "de", "2025-03-03", "schnelle lieferung"),
            review("r3", 5, "de", "2025-03-03", "schnelle lieferung"),
        ];

        let candidates = miner.candidates(&report, &reviews, &[4, 5]).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].language, "en");
        let texts = manager.provider().extracted_texts();
        assert!(!texts.iter().any(|t| t == "schnelle lieferung"));
    }

    #[tokio::test]
    async fn extraction_error_skips_only_that_review() {
        let provider = FakeProvider::default()
            .with_chunks("good coffee beans", ["good coffee beans"])
            .with_failing_text("broken review");
        let (manager, report) = ready(provider, &["en"]).await;
        let config = AnalyticsConfig::default();
        let translator = DisabledTranslator;
        let miner = ThemeMiner::new(manager.provider(), &translator, &config);

        let reviews = vec![
            review("r1", 1, "en", "2025-03-03", "good coffee beans"),
            review("r2", 2, "en", "2025-03-03", "broken review"),
            review("r3", 1, "en", "2025-03-03", "good coffee beans"),
        ];

        let candidates = miner.candidates(&report, &reviews, &[1, 2]).await;
        assert_eq!(
            candidates,
            vec![ThemeCandidate {
                phrase: "good coffee beans".to_string(),
                language: "en".to_string(),
                count: 2,
            }]
        );
    }

    #[tokio::test]
    async fn frequent_blocklisted_phrase_never_surfaces() {
        let provider = FakeProvider::default().with_chunks("my account", ["my account"]);
        let (manager, report) = ready(provider, &["en"]).await;
        let config = AnalyticsConfig::default();
        let translator = DisabledTranslator;
        let miner = ThemeMiner::new(manager.provider(), &translator, &config);

        let reviews: Vec<_> = (0..6)
            .map(|i| review(&format!("r{i}"), 1, "en", "2025-03-03", "my account"))
            .collect();
        assert!(miner.mine(&report, &reviews, &[1, 2], 10).await.is_empty());
    }
}
