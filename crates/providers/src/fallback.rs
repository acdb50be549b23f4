//! Provider fallback: an ordered retry chain with per-provider timeouts.
//!
//! When a provider fails (timeout, rate limit, error, empty answer), the next
//! provider in the chain is tried. Only when every provider has failed does
//! the caller see an error.

use async_trait::async_trait;
use lexline_core::error::ProviderError;
use lexline_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A provider that wraps an ordered list of providers and falls back on failure.
pub struct FallbackProvider {
    name: String,
    chain: Vec<FallbackEntry>,
}

struct FallbackEntry {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl FallbackProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a provider to the fallback chain with a custom timeout.
    pub fn add(mut self, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { provider, timeout });
        self
    }

    /// Add a provider with the default timeout (60s).
    pub fn add_default(self, provider: Arc<dyn Provider>) -> Self {
        self.add(provider, Duration::from_secs(60))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Provider names in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|e| e.provider.name()).collect()
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut last_error = ProviderError::NotConfigured("No providers in fallback chain".into());

        for (i, entry) in self.chain.iter().enumerate() {
            let provider_name = entry.provider.name().to_string();

            info!(
                provider = %provider_name,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying provider"
            );

            match tokio::time::timeout(entry.timeout, entry.provider.complete(request.clone()))
                .await
            {
                Ok(Ok(response)) if response.message.content.trim().is_empty() => {
                    warn!(provider = %provider_name, "Fallback: empty completion, trying next");
                    last_error =
                        ProviderError::Refused(format!("Provider '{provider_name}' returned no text"));
                }
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    warn!(
                        provider = %provider_name,
                        error = %e,
                        "Fallback: provider failed, trying next"
                    );
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        provider = %provider_name,
                        timeout_secs = entry.timeout.as_secs(),
                        "Fallback: provider timed out, trying next"
                    );
                    last_error = ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {}s",
                        provider_name,
                        entry.timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}
