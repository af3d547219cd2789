//! Phrase extraction service contract and its HTTP client.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A loaded extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub resource_id: String,
}

/// Service that installs per-language pipelines and extracts noun phrases.
pub trait ExtractionProvider: Send + Sync {
    /// `true` when the pipeline can be loaded without installing it first.
    fn is_available(
        &self,
        resource_id: &str,
    ) -> impl Future<Output = Result<bool, ProviderError>> + Send;

    fn install(&self, resource_id: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn load(
        &self,
        resource_id: &str,
    ) -> impl Future<Output = Result<ResourceHandle, ProviderError>> + Send;

    /// Noun-phrase spans found in `text`, in document order.
    fn extract_phrases(
        &self,
        handle: &ResourceHandle,
        text: &str,
    ) -> impl Future<Output = Result<Vec<String>, ProviderError>> + Send;
}

/// Stand-in used when no extraction service is configured: nothing is ever
/// available, so theme mining yields empty lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredProvider;

impl ExtractionProvider for UnconfiguredProvider {
    async fn is_available(&self, _resource_id: &str) -> Result<bool, ProviderError> {
        Ok(false)
    }

    async fn install(&self, _resource_id: &str) -> Result<(), ProviderError> {
        Err(ProviderError::Unconfigured)
    }

    async fn load(&self, _resource_id: &str) -> Result<ResourceHandle, ProviderError> {
        Err(ProviderError::Unconfigured)
    }

    async fn extract_phrases(
        &self,
        _handle: &ResourceHandle,
        _text: &str,
    ) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::Unconfigured)
    }
}

#[derive(Deserialize)]
struct PipelineStatus {
    installed: bool,
}

#[derive(Serialize)]
struct ChunkRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ChunkResponse {
    chunks: Vec<String>,
}

/// Client for the NLP sidecar service.
///
/// Endpoints:
/// - `GET  /pipelines/{id}` returns `{"installed": bool}` (404 when unknown)
/// - `POST /pipelines/{id}/install`
/// - `POST /pipelines/{id}/noun-chunks` with `{"text": ...}` returns
///   `{"chunks": [...]}`
#[derive(Debug, Clone)]
pub struct HttpExtractionProvider {
    client: Client,
    base_url: Url,
}

impl HttpExtractionProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ProviderError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("revsnap/0.1 (theme-mining)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, resource_id: &str, action: Option<&str>) -> Result<Url, ProviderError> {
        let path = match action {
            Some(action) => format!("pipelines/{resource_id}/{action}"),
            None => format!("pipelines/{resource_id}"),
        };
        self.base_url
            .join(&path)
            .map_err(|e| ProviderError::InvalidUrl {
                url: path,
                reason: e.to_string(),
            })
    }

    async fn status(&self, resource_id: &str) -> Result<Option<PipelineStatus>, ProviderError> {
        let url = self.endpoint(resource_id, None)?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                context: format!("pipeline status {resource_id}"),
            });
        }
        Ok(Some(response.json().await?))
    }
}

impl ExtractionProvider for HttpExtractionProvider {
    async fn is_available(&self, resource_id: &str) -> Result<bool, ProviderError> {
        Ok(self
            .status(resource_id)
            .await?
            .is_some_and(|s| s.installed))
    }

    async fn install(&self, resource_id: &str) -> Result<(), ProviderError> {
        let url = self.endpoint(resource_id, Some("install"))?;
        let response = self.client.post(url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                context: format!("install {resource_id}"),
            });
        }
        Ok(())
    }

    async fn load(&self, resource_id: &str) -> Result<ResourceHandle, ProviderError> {
        match self.status(resource_id).await? {
            Some(status) if status.installed => Ok(ResourceHandle {
                resource_id: resource_id.to_string(),
            }),
            _ => Err(ProviderError::NotInstalled(resource_id.to_string())),
        }
    }

    async fn extract_phrases(
        &self,
        handle: &ResourceHandle,
        text: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let url = self.endpoint(&handle.resource_id, Some("noun-chunks"))?;
        let response = self
            .client
            .post(url)
            .json(&ChunkRequest { text })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                context: format!("noun-chunks {}", handle.resource_id),
            });
        }
        let body: ChunkResponse = response.json().await?;
        Ok(body.chunks)
    }
}
