//! Provider registry: credential lookup and memoized client construction.
//!
//! Credential presence is an explicit check, not an exception path: callers
//! probe with `has_credential` before deciding between a live client and the
//! deterministic stub. `client` still fails with `MissingCredential` when
//! called without the pre-check, carrying the credential name.

use crate::{ClaudeModel, OpenAiCompatModel};
use promptforge_abstraction::{Model, ModelError};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// An external LLM backend reachable over the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// OpenAI-compatible host serving open models (provider A).
    Novita,
    /// OpenAI proper (provider B).
    OpenAi,
    /// Anthropic's native API (provider C).
    Anthropic,
}

impl Provider {
    /// Name of the environment variable holding this provider's API key.
    #[must_use]
    pub const fn credential_name(self) -> &'static str {
        match self {
            Self::Novita => "NOVITA_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Base URL for the provider's chat completion endpoint.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Novita => "https://api.novita.ai/openai",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Novita => "novita",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        };
        write!(f, "{name}")
    }
}

/// API keys for the three providers. Absence of any key is a recoverable
/// condition, not a startup failure.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    novita: Option<String>,
    openai: Option<String>,
    anthropic: Option<String>,
}

impl Credentials {
    /// Loads credentials from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            novita: env::var(Provider::Novita.credential_name()).ok(),
            openai: env::var(Provider::OpenAi.credential_name()).ok(),
            anthropic: env::var(Provider::Anthropic.credential_name()).ok(),
        }
    }

    /// Credentials with no keys configured. Every stage runs in mock mode.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the key for the given provider.
    #[must_use]
    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        match provider {
            Provider::Novita => self.novita = Some(key.into()),
            Provider::OpenAi => self.openai = Some(key.into()),
            Provider::Anthropic => self.anthropic = Some(key.into()),
        }
        self
    }

    /// Returns the key for the given provider, if configured.
    #[must_use]
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Novita => self.novita.as_deref(),
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
        }
    }

    /// Whether a key is configured for the given provider.
    #[must_use]
    pub fn has(&self, provider: Provider) -> bool {
        self.get(provider).is_some()
    }
}

/// Lazily constructs and memoizes model clients, at most one per
/// (provider, model) pair for the life of the process.
pub struct ProviderRegistry {
    credentials: Credentials,
    cache: Mutex<HashMap<(Provider, String), Arc<dyn Model>>>,
}

impl ProviderRegistry {
    /// Creates a registry over the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials, cache: Mutex::new(HashMap::new()) }
    }

    /// Creates a registry from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Credentials::from_env())
    }

    /// Whether the given provider has a credential configured.
    #[must_use]
    pub fn has_credential(&self, provider: Provider) -> bool {
        self.credentials.has(provider)
    }

    /// Returns the memoized client for (provider, model), constructing it on
    /// first use. Construction performs no network I/O.
    ///
    /// # Errors
    /// Returns `ModelError::MissingCredential` when the provider's API key is
    /// not configured.
    pub fn client(
        &self,
        provider: Provider,
        model_id: &str,
    ) -> Result<Arc<dyn Model>, ModelError> {
        let key = (provider, model_id.to_string());
        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(model) = cache.get(&key) {
            return Ok(Arc::clone(model));
        }

        let api_key = self.credentials.get(provider).ok_or_else(|| {
            ModelError::MissingCredential {
                credential: provider.credential_name().to_string(),
            }
        })?;

        debug!(provider = %provider, model_id = %model_id, "Constructing model client");
        let model: Arc<dyn Model> = match provider {
            Provider::Novita | Provider::OpenAi => Arc::new(OpenAiCompatModel::new(
                model_id.to_string(),
                provider.base_url().to_string(),
                api_key.to_string(),
            )),
            Provider::Anthropic => {
                Arc::new(ClaudeModel::new(model_id.to_string(), api_key.to_string()))
            }
        };
        cache.insert(key, Arc::clone(&model));
        Ok(model)
    }

    /// Seeds the cache with a pre-built backend for (provider, model).
    ///
    /// Seeded backends take precedence over lazy construction and are served
    /// without a credential check, which lets callers route a model through a
    /// custom `Model` implementation.
    pub fn register(&self, provider: Provider, model_id: &str, model: Arc<dyn Model>) {
        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.insert((provider, model_id.to_string()), model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_names() {
        assert_eq!(Provider::Novita.credential_name(), "NOVITA_API_KEY");
        assert_eq!(Provider::OpenAi.credential_name(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.credential_name(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_empty_credentials_have_nothing() {
        let creds = Credentials::empty();
        assert!(!creds.has(Provider::Novita));
        assert!(!creds.has(Provider::OpenAi));
        assert!(!creds.has(Provider::Anthropic));
    }

    #[test]
    fn test_with_key_sets_only_that_provider() {
        let creds = Credentials::empty().with_key(Provider::OpenAi, "sk-test");
        assert_eq!(creds.get(Provider::OpenAi), Some("sk-test"));
        assert!(!creds.has(Provider::Novita));
    }

    #[test]
    fn test_missing_credential_carries_name() {
        let registry = ProviderRegistry::new(Credentials::empty());
        let err = registry.client(Provider::OpenAi, "gpt-4").unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingCredential { credential: "OPENAI_API_KEY".to_string() }
        );
    }

    #[test]
    fn test_client_is_memoized() {
        let registry =
            ProviderRegistry::new(Credentials::empty().with_key(Provider::OpenAi, "sk-test"));
        let first = registry.client(Provider::OpenAi, "gpt-4").unwrap();
        let second = registry.client(Provider::OpenAi, "gpt-4").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_models_get_distinct_clients() {
        let registry =
            ProviderRegistry::new(Credentials::empty().with_key(Provider::Novita, "nv-test"));
        let large = registry.client(Provider::Novita, "meta-llama/llama-3.3-70b-instruct").unwrap();
        let small = registry.client(Provider::Novita, "meta-llama/llama-3.1-8b-instruct").unwrap();
        assert!(!Arc::ptr_eq(&large, &small));
    }

    #[test]
    fn test_registered_backend_preempts_construction() {
        use crate::{StubModel, StubTurn};
        use promptforge_abstraction::ModelUsage;

        let registry = ProviderRegistry::new(Credentials::empty());
        let stub: Arc<dyn Model> =
            Arc::new(StubModel::single("gpt-4", StubTurn::new("canned", ModelUsage::new(1, 1))));
        registry.register(Provider::OpenAi, "gpt-4", Arc::clone(&stub));

        // Served from the cache, no credential required.
        let model = registry.client(Provider::OpenAi, "gpt-4").unwrap();
        assert!(Arc::ptr_eq(&model, &stub));
    }

    #[test]
    fn test_anthropic_client_constructs_without_network() {
        let registry =
            ProviderRegistry::new(Credentials::empty().with_key(Provider::Anthropic, "ak-test"));
        let model = registry.client(Provider::Anthropic, "claude-sonnet-4-20250514").unwrap();
        assert_eq!(model.model_id(), "claude-sonnet-4-20250514");
    }
}
