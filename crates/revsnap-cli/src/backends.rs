//! Runtime selection of the extraction and translation services.

use revsnap_analytics::{
    DisabledTranslator, ExtractionProvider, HttpExtractionProvider, HttpTranslator, ProviderError,
    ResourceHandle, TranslateError, Translator, UnconfiguredProvider,
};
use revsnap_core::AppConfig;

/// The extraction service chosen from `REVSNAP_NLP_SERVICE_URL`.
pub(crate) enum ProviderBackend {
    Http(HttpExtractionProvider),
    Unconfigured(UnconfiguredProvider),
}

impl ProviderBackend {
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.nlp_service_url.as_deref() {
            Some(url) => {
                let client = HttpExtractionProvider::new(url, config.request_timeout_secs)
                    .map_err(|e| anyhow::anyhow!("failed to build extraction client: {e}"))?;
                Ok(Self::Http(client))
            }
            None => {
                tracing::warn!(
                    "REVSNAP_NLP_SERVICE_URL is not set; theme lists will be empty"
                );
                Ok(Self::Unconfigured(UnconfiguredProvider))
            }
        }
    }
}

impl ExtractionProvider for ProviderBackend {
    async fn is_available(&self, resource_id: &str) -> Result<bool, ProviderError> {
        match self {
            Self::Http(p) => p.is_available(resource_id).await,
            Self::Unconfigured(p) => p.is_available(resource_id).await,
        }
    }

    async fn install(&self, resource_id: &str) -> Result<(), ProviderError> {
        match self {
            Self::Http(p) => p.install(resource_id).await,
            Self::Unconfigured(p) => p.install(resource_id).await,
        }
    }

    async fn load(&self, resource_id: &str) -> Result<ResourceHandle, ProviderError> {
        match self {
            Self::Http(p) => p.load(resource_id).await,
            Self::Unconfigured(p) => p.load(resource_id).await,
        }
    }

    async fn extract_phrases(
        &self,
        handle: &ResourceHandle,
        text: &str,
    ) -> Result<Vec<String>, ProviderError> {
        match self {
            Self::Http(p) => p.extract_phrases(handle, text).await,
            Self::Unconfigured(p) => p.extract_phrases(handle, text).await,
        }
    }
}

/// The translator chosen from `REVSNAP_TRANSLATOR_URL` and
/// `REVSNAP_TRANSLATION_ENABLED`.
pub(crate) enum TranslatorBackend {
    Http(HttpTranslator),
    Disabled(DisabledTranslator),
}

impl TranslatorBackend {
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if !config.analytics.translation_enabled {
            return Ok(Self::Disabled(DisabledTranslator));
        }
        match config.translator_url.as_deref() {
            Some(url) => {
                let client = HttpTranslator::new(
                    url,
                    config.translator_api_key.clone(),
                    config.request_timeout_secs,
                )
                .map_err(|e| anyhow::anyhow!("failed to build translator client: {e}"))?;
                Ok(Self::Http(client))
            }
            None => {
                tracing::info!("no translator configured; non-English themes stay untranslated");
                Ok(Self::Disabled(DisabledTranslator))
            }
        }
    }
}

impl Translator for TranslatorBackend {
    async fn translate(&self, text: &str, source_language: &str) -> Result<String, TranslateError> {
        match self {
            Self::Http(t) => t.translate(text, source_language).await,
            Self::Disabled(t) => t.translate(text, source_language).await,
        }
    }
}
