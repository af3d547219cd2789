//! Domain types, configuration, and collaborator contracts shared by every
//! revsnap crate.

pub mod app_config;
pub mod brands;
pub mod config;
pub mod memory;
pub mod ports;
pub mod review;
pub mod sentiment;
pub mod snapshot;
pub mod stats;
pub mod window;

use thiserror::Error;

pub use app_config::{AnalyticsConfig, AppConfig, Environment};
pub use brands::{load_brands, BrandConfig, BrandsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use memory::MemoryStore;
pub use ports::{ReviewSource, SnapshotStore, StoreError};
pub use review::{ReviewRecord, UNKNOWN_LANGUAGE};
pub use sentiment::{classify, Sentiment, SentimentBreakdown, SentimentThresholds};
pub use snapshot::{CanonicalTheme, WeeklySnapshot, WowDelta};
pub use stats::{CumulativeStats, StatsAccumulator};
pub use window::{window_for, windows_covering, WeekWindow, WeekWindows};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[source] serde_yaml::Error),

    #[error("brands validation failed: {0}")]
    Validation(String),
}
