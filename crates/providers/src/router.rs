//! Provider construction from configuration.
//!
//! The configured default provider comes first, followed by each entry of
//! `fallback_providers` in order. Every provider in the chain gets the same
//! timeout; a provider's `default_model` overrides the model in each request.

use std::sync::Arc;
use std::time::Duration;

use lexline_config::{AppConfig, ConfigError};
use lexline_core::provider::Provider;
use tracing::debug;

use crate::anthropic::AnthropicProvider;
use crate::fallback::FallbackProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the ordered provider chain described by `config`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let timeout = Duration::from_secs(config.provider_timeout_secs);
    let mut chain = FallbackProvider::new(config.default_provider.clone());

    let mut seen: Vec<&str> = Vec::new();
    let names = std::iter::once(config.default_provider.as_str())
        .chain(config.fallback_providers.iter().map(String::as_str));

    for name in names {
        if seen.contains(&name) {
            continue;
        }
        seen.push(name);

        let provider = build_one(config, name)?;
        debug!(provider = %name, timeout_secs = timeout.as_secs(), "Provider added to chain");
        chain = chain.add(provider, timeout);
    }

    Ok(Arc::new(chain))
}

fn build_one(config: &AppConfig, name: &str) -> Result<Arc<dyn Provider>, ConfigError> {
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    let api_url = provider_config.and_then(|p| p.api_url.clone());
    let model = provider_config.and_then(|p| p.default_model.clone());

    if name == "anthropic" {
        let mut p = AnthropicProvider::new(api_key);
        if let Some(url) = api_url {
            p = p.with_base_url(url);
        }
        if let Some(model) = model {
            p = p.with_model(model);
        }
        return Ok(Arc::new(p));
    }

    let base_url = api_url.or_else(|| default_base_url(name)).ok_or_else(|| {
        ConfigError::ValidationError(format!(
            "Unknown provider '{name}': set providers.{name}.api_url"
        ))
    })?;

    let mut p = OpenAiCompatProvider::new(name, base_url, api_key);
    if let Some(model) = model {
        p = p.with_model(model);
    }
    Ok(Arc::new(p))
}

/// Base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        _ => return None,
    };
    Some(url.to_string())
}
