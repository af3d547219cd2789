use std::path::PathBuf;

use crate::sentiment::SentimentThresholds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tunables for the snapshot engine: sentiment thresholds, language coverage,
/// and the theme mining heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub positive_rating_min: i16,
    pub negative_rating_max: i16,
    pub neutral_rating: i16,
    pub min_language_coverage_pct: f64,
    pub max_themes: usize,
    pub min_phrase_frequency: usize,
    pub min_phrase_words: usize,
    pub max_phrase_words: usize,
    /// Characters of `title + text` handed to the phrase extractor per review.
    pub text_length_cap: usize,
    pub translation_enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            positive_rating_min: 4,
            negative_rating_max: 2,
            neutral_rating: 3,
            min_language_coverage_pct: 2.0,
            max_themes: 10,
            min_phrase_frequency: 2,
            min_phrase_words: 2,
            max_phrase_words: 5,
            text_length_cap: 1000,
            translation_enabled: true,
        }
    }
}

impl AnalyticsConfig {
    #[must_use]
    pub fn thresholds(&self) -> SentimentThresholds {
        SentimentThresholds {
            positive_min: self.positive_rating_min,
            neutral_rating: self.neutral_rating,
            negative_max: self.negative_rating_max,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub nlp_service_url: Option<String>,
    pub translator_url: Option<String>,
    pub translator_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub resource_cache_path: PathBuf,
    pub max_concurrent_brands: usize,
    pub analytics: AnalyticsConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("nlp_service_url", &self.nlp_service_url)
            .field("translator_url", &self.translator_url)
            .field(
                "translator_api_key",
                &self.translator_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("resource_cache_path", &self.resource_cache_path)
            .field("max_concurrent_brands", &self.max_concurrent_brands)
            .field("analytics", &self.analytics)
            .finish()
    }
}
