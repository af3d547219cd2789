//! Per-language extraction pipeline lifecycle.
//!
//! Each pipeline moves through [`ResourceState`]: a persisted cache hit or a
//! provider that already reports it installed makes it `CachedAvailable`, an
//! on-demand install makes it `Available`, and an install or load failure
//! makes it `Unavailable` for the rest of the run. Available pipelines are
//! loaded once and reused.

pub mod cache;
pub mod languages;
pub mod provider;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tokio::sync::Mutex;

pub use cache::ResourceCache;
pub use languages::{profile, LanguageProfile, GENERIC_PHRASES, LANGUAGES};
pub use provider::{
    ExtractionProvider, HttpExtractionProvider, ResourceHandle, UnconfiguredProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Unknown,
    CachedAvailable,
    Provisioning,
    Available,
    Unavailable,
}

/// A loaded pipeline together with its language's filter lists.
#[derive(Debug, Clone)]
pub struct LoadedResource {
    pub handle: ResourceHandle,
    pub profile: &'static LanguageProfile,
}

#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    Ready(LoadedResource),
    /// No pipeline exists for the language, or it already failed this run.
    Skipped(String),
    /// Install or load failed just now.
    Failed(String),
}

impl ProvisionOutcome {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Result of [`ResourceManager::ensure`], keyed by language code.
#[derive(Debug, Clone, Default)]
pub struct ResourceReport {
    outcomes: BTreeMap<String, ProvisionOutcome>,
}

impl ResourceReport {
    #[must_use]
    pub fn outcome(&self, language: &str) -> Option<&ProvisionOutcome> {
        self.outcomes.get(language)
    }

    #[must_use]
    pub fn resource(&self, language: &str) -> Option<&LoadedResource> {
        match self.outcomes.get(language) {
            Some(ProvisionOutcome::Ready(loaded)) => Some(loaded),
            _ => None,
        }
    }

    #[must_use]
    pub fn handle(&self, language: &str) -> Option<&ResourceHandle> {
        self.resource(language).map(|r| &r.handle)
    }

    /// Languages with a loaded pipeline.
    pub fn ready_languages(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_ready())
            .map(|(lang, _)| lang.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProvisionOutcome)> {
        self.outcomes.iter().map(|(lang, o)| (lang.as_str(), o))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[derive(Debug)]
struct ManagerState {
    cache: ResourceCache,
    states: HashMap<String, ResourceState>,
    loaded: HashMap<String, LoadedResource>,
}

/// Owns the resource cache and the in-process pipeline handles.
///
/// Shared by every brand of a run; the internal lock serializes provisioning
/// so a pipeline is installed and loaded at most once.
pub struct ResourceManager<P> {
    provider: P,
    state: Mutex<ManagerState>,
}

impl<P: ExtractionProvider> ResourceManager<P> {
    #[must_use]
    pub fn new(provider: P, cache: ResourceCache) -> Self {
        Self {
            provider,
            state: Mutex::new(ManagerState {
                cache,
                states: HashMap::new(),
                loaded: HashMap::new(),
            }),
        }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current lifecycle state of a pipeline.
    pub async fn state_of(&self, resource_id: &str) -> ResourceState {
        let state = self.state.lock().await;
        match state.states.get(resource_id) {
            Some(s) => *s,
            None if state.cache.contains(resource_id) => ResourceState::CachedAvailable,
            None => ResourceState::Unknown,
        }
    }

    /// The loaded capability bundle for `language`, if provisioning succeeded.
    pub async fn loaded(&self, language: &str) -> Option<LoadedResource> {
        let profile = profile(language)?;
        self.state
            .lock()
            .await
            .loaded
            .get(profile.resource_id)
            .cloned()
    }

    /// Make a pipeline ready for every language in `languages`.
    ///
    /// Never fails: problems are reported per language in the returned
    /// [`ResourceReport`] and logged. Repeated calls reuse earlier results
    /// and never install or load a pipeline twice.
    pub async fn ensure(&self, languages: &BTreeSet<String>) -> ResourceReport {
        let mut state = self.state.lock().await;
        let mut report = ResourceReport::default();

        for language in languages {
            let outcome = self.ensure_one(&mut state, language).await;
            report.outcomes.insert(language.clone(), outcome);
        }

        report
    }

    async fn ensure_one(&self, state: &mut ManagerState, language: &str) -> ProvisionOutcome {
        let Some(profile) = profile(language) else {
            return ProvisionOutcome::Skipped(format!("no extraction pipeline for '{language}'"));
        };
        let id = profile.resource_id;

        if let Some(loaded) = state.loaded.get(id) {
            return ProvisionOutcome::Ready(loaded.clone());
        }
        if state.states.get(id) == Some(&ResourceState::Unavailable) {
            return ProvisionOutcome::Skipped(format!("{id} unavailable for this run"));
        }

        if state.cache.contains(id) {
            state.states.insert(id.to_string(), ResourceState::CachedAvailable);
        } else if let Err(reason) = self.provision(state, language, id).await {
            state.states.insert(id.to_string(), ResourceState::Unavailable);
            return ProvisionOutcome::Failed(reason);
        }

        match self.provider.load(id).await {
            Ok(handle) => {
                let loaded = LoadedResource { handle, profile };
                state.loaded.insert(id.to_string(), loaded.clone());
                tracing::debug!(lang = language, resource = id, "extraction pipeline loaded");
                ProvisionOutcome::Ready(loaded)
            }
            Err(e) => {
                tracing::warn!(
                    lang = language,
                    resource = id,
                    error = %e,
                    "extraction pipeline failed to load; skipping language for this run"
                );
                state.states.insert(id.to_string(), ResourceState::Unavailable);
                ProvisionOutcome::Failed(format!("load {id}: {e}"))
            }
        }
    }

    /// Detect or install a pipeline that is not in the cache.
    async fn provision(
        &self,
        state: &mut ManagerState,
        language: &str,
        id: &str,
    ) -> Result<(), String> {
        let already = match self.provider.is_available(id).await {
            Ok(available) => available,
            Err(e) => {
                tracing::debug!(resource = id, error = %e, "availability check failed");
                false
            }
        };

        if already {
            state.states.insert(id.to_string(), ResourceState::CachedAvailable);
        } else {
            state.states.insert(id.to_string(), ResourceState::Provisioning);
            tracing::info!(lang = language, resource = id, "installing extraction pipeline");
            if let Err(e) = self.provider.install(id).await {
                tracing::warn!(
                    lang = language,
                    resource = id,
                    error = %e,
                    "extraction pipeline install failed; skipping language for this run"
                );
                return Err(format!("install {id}: {e}"));
            }
            state.states.insert(id.to_string(), ResourceState::Available);
        }

        if let Err(e) = state.cache.insert(id) {
            tracing::warn!(resource = id, error = %e, "failed to persist resource cache");
        }
        Ok(())
    }
}
