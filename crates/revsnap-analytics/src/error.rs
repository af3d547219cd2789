use revsnap_core::StoreError;
use thiserror::Error;

/// Failures of the phrase extraction service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extraction service returned status {status} for {context}")]
    Status { status: u16, context: String },

    #[error("pipeline {0} is not installed")]
    NotInstalled(String),

    #[error("no extraction service configured")]
    Unconfigured,

    #[error("invalid extraction service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failures of the translation collaborator. Always recovered from by the
/// deduplicator.
#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    #[error("translation disabled")]
    Disabled,

    #[error("translation request failed: {0}")]
    Request(String),

    #[error("translator returned status {0}")]
    Status(u16),

    #[error("translator returned an empty text")]
    Empty,
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("brand {brand_id} has no windowable reviews")]
    NoReviews { brand_id: i64 },

    #[error("failed to access resource cache {path}: {source}")]
    CacheIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode resource cache {path}: {source}")]
    CacheEncode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
