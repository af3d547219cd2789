//! Merges per-language theme candidates into canonical English themes.

use std::collections::{BTreeMap, HashMap};

use revsnap_core::CanonicalTheme;

use crate::miner::{normalize_phrase, ThemeCandidate};
use crate::translate::Translator;

const ENGLISH: &str = "en";

/// Canonical key and display text for one non-English candidate.
async fn canonicalize<T: Translator>(
    candidate: &ThemeCandidate,
    translator: &T,
    translation_enabled: bool,
) -> (String, String) {
    let fallback = || {
        (
            candidate.phrase.clone(),
            format!("{} ({})", candidate.phrase, candidate.language),
        )
    };

    if !translation_enabled {
        return fallback();
    }

    match translator
        .translate(&candidate.phrase, &candidate.language)
        .await
    {
        Ok(translated) => {
            let key = normalize_phrase(&translated);
            if key.is_empty() || key == normalize_phrase(&candidate.phrase) {
                fallback()
            } else {
                let display = translated.split_whitespace().collect::<Vec<_>>().join(" ");
                (key, format!("{display} ({})", candidate.language))
            }
        }
        Err(e) => {
            tracing::debug!(
                lang = %candidate.language,
                phrase = %candidate.phrase,
                error = %e,
                "translation failed; keeping original phrase"
            );
            fallback()
        }
    }
}

/// Merge candidates that mean the same thing across languages.
///
/// English candidates are keyed by their phrase. Other languages are keyed by
/// their English translation when one is available and differs from the
/// original. Counts of equal keys add up and the first contributor's display
/// text wins, with English contributing first and the remaining languages in
/// alphabetical order. The result is sorted by count descending, then key,
/// and truncated to `max_themes`. Translation failures never surface.
pub async fn deduplicate<T: Translator>(
    candidates: Vec<ThemeCandidate>,
    translator: &T,
    translation_enabled: bool,
    max_themes: usize,
) -> Vec<CanonicalTheme> {
    let mut by_language: BTreeMap<String, Vec<ThemeCandidate>> = BTreeMap::new();
    for candidate in candidates {
        by_language
            .entry(candidate.language.clone())
            .or_default()
            .push(candidate);
    }

    let english = by_language.remove(ENGLISH).unwrap_or_default();
    let ordered = english
        .into_iter()
        .chain(by_language.into_values().flatten());

    let mut themes: Vec<CanonicalTheme> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in ordered {
        let (key, display) = if candidate.language == ENGLISH {
            (candidate.phrase.clone(), candidate.phrase.clone())
        } else {
            canonicalize(&candidate, translator, translation_enabled).await
        };

        match index.get(&key) {
            Some(&i) => themes[i].count += candidate.count,
            None => {
                index.insert(key.clone(), themes.len());
                themes.push(CanonicalTheme {
                    canonical: key,
                    display,
                    count: candidate.count,
                });
            }
        }
    }

    themes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.canonical.cmp(&b.canonical)));
    themes.truncate(max_themes);
    themes
}
