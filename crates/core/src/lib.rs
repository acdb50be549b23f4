//! # Lexline Core
//!
//! Domain types, traits, and error definitions for the Lexline legal
//! information service. This crate has **zero framework dependencies**: it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two collaborators the exchange pipeline talks to (the model provider
//! and the session store) are traits here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod category;
pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use category::Category;
pub use context::{ContextEntry, ContextLedger};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use session::{Session, SessionStore, TranscriptMessage};
