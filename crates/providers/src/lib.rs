//! LLM provider implementations for Lexline.
//!
//! All providers implement the `lexline_core::Provider` trait.
//! [`build_from_config`] assembles the configured providers into an ordered
//! fallback chain.

pub mod anthropic;
pub mod fallback;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use fallback::FallbackProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
