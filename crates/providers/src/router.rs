//! Provider router: builds the configured LLM gateway.
//!
//! Every known provider speaks the OpenAI chat-completions protocol, so the
//! router only differs per provider in base URL and key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use ace_core::error::ProviderError;
use ace_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Fails if the default provider is neither configured with an `api_url`
/// nor one of the well-known names.
pub fn build_from_config(
    config: &ace_config::AppConfig,
) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let Some(base_url) = provider_config
            .api_url
            .clone()
            .or_else(|| default_base_url(name).map(String::from))
        else {
            tracing::warn!(provider = %name, "Skipping provider without api_url");
            continue;
        };

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::with_timeout(name, base_url, api_key, timeout)),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let base_url = default_base_url(&config.default_provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "'{}' has no known base URL; set [providers.{}].api_url",
                config.default_provider, config.default_provider
            ))
        })?;
        let api_key = config.api_key.clone().unwrap_or_default();

        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::with_timeout(
                &config.default_provider,
                base_url,
                api_key,
                timeout,
            )),
        );
    }

    Ok(router)
}

/// Built-in providers and their base URLs.
pub const KNOWN_PROVIDERS: &[(&str, &str)] = &[
    ("lmstudio", "http://127.0.0.1:1234/v1"),
    ("ollama", "http://localhost:11434/v1"),
    ("vllm", "http://localhost:8000/v1"),
    ("llamacpp", "http://localhost:8080/v1"),
    ("openai", "https://api.openai.com/v1"),
    ("openrouter", "https://openrouter.ai/api/v1"),
    ("deepseek", "https://api.deepseek.com/v1"),
    ("groq", "https://api.groq.com/openai/v1"),
    ("together", "https://api.together.xyz/v1"),
];

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<&'static str> {
    KNOWN_PROVIDERS
        .iter()
        .find(|(name, _)| *name == provider_name)
        .map(|(_, url)| *url)
}
