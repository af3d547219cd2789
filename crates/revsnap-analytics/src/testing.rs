//! In-process fakes shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, TimeZone, Utc};
use revsnap_core::ReviewRecord;

use crate::error::{ProviderError, TranslateError};
use crate::resources::{ExtractionProvider, ResourceHandle};
use crate::translate::Translator;

/// A review published at noon UTC on `date` (`YYYY-MM-DD`).
pub fn review(id: &str, rating: i16, language: &str, date: &str, text: &str) -> ReviewRecord {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let published = Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
    ReviewRecord {
        review_id: id.to_string(),
        rating,
        title: String::new(),
        text: text.to_string(),
        language: language.to_string(),
        published_date: Some(published),
        has_reply: false,
        reply_date: None,
        verification_source: None,
    }
}

#[derive(Debug, Default)]
struct Calls {
    installs: Vec<String>,
    loads: Vec<String>,
    texts: Vec<String>,
}

/// Extraction provider driven by lookup tables.
///
/// Pipelines in `available` are already installed; pipelines in
/// `installable` install successfully; everything else fails to install.
/// Loads succeed unless the pipeline is in `broken_load`. Texts without a
/// registered chunk list yield no phrases.
#[derive(Debug, Default)]
pub struct FakeProvider {
    available: HashSet<String>,
    installable: HashSet<String>,
    broken_load: HashSet<String>,
    chunks: HashMap<String, Vec<String>>,
    failing_texts: HashSet<String>,
    calls: Mutex<Calls>,
}

impl FakeProvider {
    pub fn with_available<const N: usize>(mut self, ids: [&str; N]) -> Self {
        self.available.extend(ids.iter().map(|s| (*s).to_string()));
        self
    }

    pub fn with_installable<const N: usize>(mut self, ids: [&str; N]) -> Self {
        self.installable.extend(ids.iter().map(|s| (*s).to_string()));
        self
    }

    pub fn with_broken_load<const N: usize>(mut self, ids: [&str; N]) -> Self {
        self.broken_load.extend(ids.iter().map(|s| (*s).to_string()));
        self
    }

    pub fn with_chunks<const N: usize>(mut self, text: &str, chunks: [&str; N]) -> Self {
        self.chunks.insert(
            text.to_string(),
            chunks.iter().map(|s| (*s).to_string()).collect(),
        );
        self
    }

    pub fn with_failing_text(mut self, text: &str) -> Self {
        self.failing_texts.insert(text.to_string());
        self
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn install_calls(&self) -> Vec<String> {
        self.calls().installs.clone()
    }

    pub fn load_calls(&self) -> Vec<String> {
        self.calls().loads.clone()
    }

    pub fn extracted_texts(&self) -> Vec<String> {
        self.calls().texts.clone()
    }
}

impl ExtractionProvider for FakeProvider {
    async fn is_available(&self, resource_id: &str) -> Result<bool, ProviderError> {
        Ok(self.available.contains(resource_id))
    }

    async fn install(&self, resource_id: &str) -> Result<(), ProviderError> {
        self.calls().installs.push(resource_id.to_string());
        if self.installable.contains(resource_id) {
            Ok(())
        } else {
            Err(ProviderError::Status {
                status: 500,
                context: format!("install {resource_id}"),
            })
        }
    }

    async fn load(&self, resource_id: &str) -> Result<ResourceHandle, ProviderError> {
        self.calls().loads.push(resource_id.to_string());
        if self.broken_load.contains(resource_id) {
            return Err(ProviderError::NotInstalled(resource_id.to_string()));
        }
        Ok(ResourceHandle {
            resource_id: resource_id.to_string(),
        })
    }

    async fn extract_phrases(
        &self,
        _handle: &ResourceHandle,
        text: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.calls().texts.push(text.to_string());
        if self.failing_texts.contains(text) {
            return Err(ProviderError::Status {
                status: 500,
                context: "noun-chunks".to_string(),
            });
        }
        Ok(self.chunks.get(text).cloned().unwrap_or_default())
    }
}

/// Translator backed by a fixed dictionary; unknown phrases fail.
#[derive(Debug, Default)]
pub struct CountingTranslator {
    dictionary: HashMap<String, String>,
    calls: AtomicUsize,
}

impl CountingTranslator {
    pub fn new<const N: usize>(pairs: [(&str, &str); N]) -> Self {
        Self {
            dictionary: pairs
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, _source: &str) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dictionary
            .get(text)
            .cloned()
            .ok_or_else(|| TranslateError::Request(format!("no entry for '{text}'")))
    }
}

/// Translator that always fails, as a dead network would.
#[derive(Debug, Default)]
pub struct FailingTranslator {
    calls: AtomicUsize,
}

impl FailingTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _source: &str) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TranslateError::Request("connection refused".to_string()))
    }
}
