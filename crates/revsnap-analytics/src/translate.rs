//! English rendering of mined phrases.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};

use crate::error::{ProviderError, TranslateError};

/// Translates a short phrase into English.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
    ) -> impl Future<Output = Result<String, TranslateError>> + Send;
}

/// Always declines; phrases keep their original wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslator;

impl Translator for DisabledTranslator {
    async fn translate(&self, _text: &str, _source: &str) -> Result<String, TranslateError> {
        Err(TranslateError::Disabled)
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'static str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// Client for a LibreTranslate-compatible `POST /translate` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpTranslator {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the client cannot be built, or
    /// [`ProviderError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("revsnap/0.1 (translate)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|u| u.join("translate"))
            .map_err(|e| ProviderError::InvalidUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source_language: &str) -> Result<String, TranslateError> {
        let body = TranslateRequest {
            q: text,
            source: source_language,
            target: "en",
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status().as_u16()));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Request(e.to_string()))?;

        let translated = parsed.translated_text.trim();
        if translated.is_empty() {
            return Err(TranslateError::Empty);
        }
        Ok(translated.to_string())
    }
}

/// Run-scoped memo: each `(language, phrase)` reaches the inner translator
/// at most once, failures included.
///
/// The map lock is only held to find the entry for a phrase. Distinct
/// phrases translate concurrently; callers asking for the same phrase wait
/// on its single in-flight request.
pub struct MemoTranslator<T> {
    inner: T,
    memo: Mutex<HashMap<(String, String), MemoEntry>>,
}

type MemoEntry = Arc<OnceCell<Result<String, TranslateError>>>;

impl<T: Translator> MemoTranslator<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn entry(&self, source_language: &str, text: &str) -> MemoEntry {
        let key = (source_language.to_string(), text.to_string());
        let mut memo = self.memo.lock().await;
        Arc::clone(memo.entry(key).or_default())
    }
}

impl<T: Translator> Translator for MemoTranslator<T> {
    async fn translate(&self, text: &str, source_language: &str) -> Result<String, TranslateError> {
        let entry = self.entry(source_language, text).await;
        entry
            .get_or_init(|| self.inner.translate(text, source_language))
            .await
            .clone()
    }
}
