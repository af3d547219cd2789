use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked brand as declared in `config/brands.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    /// Domain the brand is listed under on the review site, e.g. `ketogo.app`.
    pub domain: String,
    /// Business identifier on the review site, when known.
    #[serde(default)]
    pub business_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BrandConfig {
    /// Generate a URL-safe slug from the brand name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandConfig>,
}

/// Load and validate the brands configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brands(&content)
}

fn parse_brands(content: &str) -> Result<BrandsFile, ConfigError> {
    let brands_file: BrandsFile =
        serde_yaml::from_str(content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_domains = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        let domain = brand.domain.trim().to_lowercase();
        if domain.is_empty() || domain.contains('/') || domain.contains(' ') {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has invalid domain '{}'",
                brand.name, brand.domain
            )));
        }
        if !seen_domains.insert(domain) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand domain: '{}'",
                brand.domain
            )));
        }

        let slug = brand.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "brand '{}' produces an empty slug",
                brand.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand slug: '{}' (from brand '{}')",
                slug, brand.name
            )));
        }
    }

    Ok(())
}
