//! Persisted set of extraction pipelines known to be available.
//!
//! Stored as a JSON array of pipeline identifiers. Entries are only ever
//! added; nothing removes a pipeline once it has been confirmed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::AnalyticsError;

#[derive(Debug, Default)]
pub struct ResourceCache {
    path: Option<PathBuf>,
    entries: BTreeSet<String>,
}

impl ResourceCache {
    /// Load the cache from `path`. A missing or unreadable file starts an
    /// empty cache that will be written to `path` on the first insert.
    #[must_use]
    pub fn load_or_new(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "resource cache is malformed; starting empty"
                    );
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "resource cache unreadable; starting empty"
                );
                BTreeSet::new()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            entries,
        }
    }

    /// A cache that is never written to disk.
    #[must_use]
    pub fn in_memory<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: None,
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, resource_id: &str) -> bool {
        self.entries.contains(resource_id)
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeSet<String> {
        &self.entries
    }

    /// Record `resource_id` as available and persist the cache.
    ///
    /// The entry is kept in memory even when writing the file fails.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::CacheIo`] or [`AnalyticsError::CacheEncode`]
    /// if the cache file cannot be written.
    pub fn insert(&mut self, resource_id: &str) -> Result<bool, AnalyticsError> {
        if !self.entries.insert(resource_id.to_string()) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<(), AnalyticsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let display = path.display().to_string();

        let ids: Vec<&String> = self.entries.iter().collect();
        let body = serde_json::to_string_pretty(&ids).map_err(|source| {
            AnalyticsError::CacheEncode {
                path: display.clone(),
                source,
            }
        })?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| AnalyticsError::CacheIo {
                path: display.clone(),
                source,
            })?;
        }

        // Atomic replace via a sibling temp file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|source| AnalyticsError::CacheIo {
            path: display.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| AnalyticsError::CacheIo {
            path: display,
            source,
        })?;
        Ok(())
    }
}
