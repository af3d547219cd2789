use crate::app_config::{AnalyticsConfig, AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Use it in tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parse `raw` as `T`, mapping failures to [`ConfigError::InvalidEnvVar`].
fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset for optional service URLs.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("REVSNAP_ENV", "development"))?;
    let log_level = or_default("REVSNAP_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default("REVSNAP_BRANDS_PATH", "./config/brands.yaml"));

    let db_max_connections = parse_value(
        "REVSNAP_DB_MAX_CONNECTIONS",
        &or_default("REVSNAP_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections = parse_value(
        "REVSNAP_DB_MIN_CONNECTIONS",
        &or_default("REVSNAP_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs = parse_value(
        "REVSNAP_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("REVSNAP_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let nlp_service_url = optional("REVSNAP_NLP_SERVICE_URL");
    let translator_url = optional("REVSNAP_TRANSLATOR_URL");
    let translator_api_key = optional("REVSNAP_TRANSLATOR_API_KEY");
    let request_timeout_secs = parse_value(
        "REVSNAP_REQUEST_TIMEOUT_SECS",
        &or_default("REVSNAP_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let resource_cache_path = PathBuf::from(or_default(
        "REVSNAP_RESOURCE_CACHE_PATH",
        "./.revsnap/resource_cache.json",
    ));
    let max_concurrent_brands: usize = parse_value(
        "REVSNAP_MAX_CONCURRENT_BRANDS",
        &or_default("REVSNAP_MAX_CONCURRENT_BRANDS", "1"),
    )?;
    if max_concurrent_brands == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVSNAP_MAX_CONCURRENT_BRANDS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let analytics = build_analytics_config(&or_default)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        brands_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        nlp_service_url,
        translator_url,
        translator_api_key,
        request_timeout_secs,
        resource_cache_path,
        max_concurrent_brands,
        analytics,
    })
}

/// Read the engine tunables, falling back to [`AnalyticsConfig::default`] values.
fn build_analytics_config<F>(or_default: &F) -> Result<AnalyticsConfig, ConfigError>
where
    F: Fn(&str, &str) -> String,
{
    let defaults = AnalyticsConfig::default();
    let read = |var: &str, default: String| or_default(var, &default);

    let positive_rating_min: i16 = parse_value(
        "REVSNAP_POSITIVE_RATING_MIN",
        &read(
            "REVSNAP_POSITIVE_RATING_MIN",
            defaults.positive_rating_min.to_string(),
        ),
    )?;
    let negative_rating_max: i16 = parse_value(
        "REVSNAP_NEGATIVE_RATING_MAX",
        &read(
            "REVSNAP_NEGATIVE_RATING_MAX",
            defaults.negative_rating_max.to_string(),
        ),
    )?;
    let neutral_rating: i16 = parse_value(
        "REVSNAP_NEUTRAL_RATING",
        &read("REVSNAP_NEUTRAL_RATING", defaults.neutral_rating.to_string()),
    )?;

    if !(1 <= negative_rating_max
        && negative_rating_max < neutral_rating
        && neutral_rating < positive_rating_min
        && positive_rating_min <= 5)
    {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVSNAP_POSITIVE_RATING_MIN".to_string(),
            reason: format!(
                "rating thresholds must satisfy 1 <= negative ({negative_rating_max}) \
                 < neutral ({neutral_rating}) < positive ({positive_rating_min}) <= 5"
            ),
        });
    }

    let min_language_coverage_pct: f64 = parse_value(
        "REVSNAP_MIN_LANGUAGE_COVERAGE_PCT",
        &read(
            "REVSNAP_MIN_LANGUAGE_COVERAGE_PCT",
            defaults.min_language_coverage_pct.to_string(),
        ),
    )?;
    if !(0.0..=100.0).contains(&min_language_coverage_pct) {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVSNAP_MIN_LANGUAGE_COVERAGE_PCT".to_string(),
            reason: "must be between 0 and 100".to_string(),
        });
    }

    let max_themes = parse_value(
        "REVSNAP_MAX_THEMES",
        &read("REVSNAP_MAX_THEMES", defaults.max_themes.to_string()),
    )?;
    let min_phrase_frequency = parse_value(
        "REVSNAP_MIN_PHRASE_FREQUENCY",
        &read(
            "REVSNAP_MIN_PHRASE_FREQUENCY",
            defaults.min_phrase_frequency.to_string(),
        ),
    )?;
    let min_phrase_words: usize = parse_value(
        "REVSNAP_MIN_PHRASE_WORDS",
        &read(
            "REVSNAP_MIN_PHRASE_WORDS",
            defaults.min_phrase_words.to_string(),
        ),
    )?;
    let max_phrase_words: usize = parse_value(
        "REVSNAP_MAX_PHRASE_WORDS",
        &read(
            "REVSNAP_MAX_PHRASE_WORDS",
            defaults.max_phrase_words.to_string(),
        ),
    )?;
    if min_phrase_words == 0 || min_phrase_words > max_phrase_words {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVSNAP_MIN_PHRASE_WORDS".to_string(),
            reason: format!(
                "phrase word bounds must satisfy 1 <= min ({min_phrase_words}) <= max ({max_phrase_words})"
            ),
        });
    }
    let text_length_cap = parse_value(
        "REVSNAP_TEXT_LENGTH_CAP",
        &read("REVSNAP_TEXT_LENGTH_CAP", defaults.text_length_cap.to_string()),
    )?;
    let translation_enabled = parse_bool(
        "REVSNAP_TRANSLATION_ENABLED",
        &read(
            "REVSNAP_TRANSLATION_ENABLED",
            defaults.translation_enabled.to_string(),
        ),
    )?;

    Ok(AnalyticsConfig {
        positive_rating_min,
        negative_rating_max,
        neutral_rating,
        min_language_coverage_pct,
        max_themes,
        min_phrase_frequency,
        min_phrase_words,
        max_phrase_words,
        text_length_cap,
        translation_enabled,
    })
}

/// Parse a boolean flag, accepting `true/false`, `1/0`, and `yes/no` in any case.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVSNAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
