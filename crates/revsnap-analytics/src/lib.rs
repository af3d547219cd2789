//! Weekly snapshot engine for revsnap.
//!
//! Turns a brand's stored reviews into one [`revsnap_core::WeeklySnapshot`]
//! per Monday-anchored week: cumulative stats, the week's sentiment split and
//! distributions, and positive and negative themes mined per language and
//! merged across languages through translation. Extraction pipelines are
//! provisioned once per brand run for languages above the coverage threshold.

pub mod assembler;
pub mod backfill;
pub mod coverage;
pub mod dedup;
pub mod error;
pub mod miner;
pub mod resources;
pub mod translate;

#[cfg(test)]
mod testing;

pub use assembler::{build_snapshot, SnapshotAssembler, NEGATIVE_RATINGS, POSITIVE_RATINGS};
pub use backfill::{BackfillDriver, BackfillSummary};
pub use coverage::{coverage, coverage_report, significant, significant_from_counts, LanguageShare};
pub use dedup::deduplicate;
pub use error::{AnalyticsError, ProviderError, TranslateError};
pub use miner::{ThemeCandidate, ThemeMiner};
pub use resources::{
    ExtractionProvider, HttpExtractionProvider, LoadedResource, ProvisionOutcome, ResourceCache,
    ResourceHandle, ResourceManager, ResourceReport, ResourceState, UnconfiguredProvider,
};
pub use translate::{DisabledTranslator, HttpTranslator, MemoTranslator, Translator};
