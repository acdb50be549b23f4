//! The Lexline advisor: category routing and the exchange pipeline.
//!
//! An exchange flows through:
//!
//! 1. **Classify** the message into a legal category (unless one was given)
//! 2. **Compose** the instruction plus a bounded window of prior context
//! 3. **Call** the model provider once
//! 4. **Assemble** the answer with citations and a response id, or substitute
//!    a deterministic fallback answer when the model fails
//! 5. **Extend** the caller's ledger with the new user and assistant turns

pub mod assembler;
pub mod classifier;
pub mod exchange;
pub mod fallback;
pub mod knowledge;
pub mod prompt;
pub mod service;

pub use assembler::{ExchangeResult, assemble, assemble_fallback};
pub use classifier::classify;
pub use exchange::{Exchange, ExchangeOutcome, MAX_MESSAGE_CHARS, ResponseSource, clear, validate_message};
pub use fallback::fallback;
pub use knowledge::{CategoryProfile, PROFILES, profile};
pub use prompt::{CONTEXT_WINDOW, PromptSettings, build_instruction, build_message_sequence, build_request};
pub use service::{ChatService, ConnectionStatus};
