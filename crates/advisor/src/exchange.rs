//! One question-and-answer exchange.
//!
//! The exchange validates the message, resolves a category, calls the model
//! exactly once and always produces an answer: when the model fails, a
//! deterministic fallback takes its place. The caller's ledger is never
//! modified; an extended copy is returned instead.

use std::sync::Arc;

use chrono::Utc;
use lexline_core::category::Category;
use lexline_core::context::ContextLedger;
use lexline_core::error::{Error, ModelFailure, ValidationError};
use lexline_core::provider::Provider;
use tracing::{debug, info, warn};

use crate::assembler::{ExchangeResult, assemble, assemble_fallback};
use crate::classifier::classify;
use crate::fallback::fallback;
use crate::prompt::{PromptSettings, build_request};

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Where the answer text came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSource {
    Model { provider: String, model: String },
    Fallback { reason: ModelFailure },
}

/// Everything an exchange produces.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub result: ExchangeResult,
    /// The prior ledger plus this exchange's user and assistant entries.
    pub updated_context: ContextLedger,
    pub source: ResponseSource,
}

/// Reject empty or oversized messages.
pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong {
            len,
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok(())
}

/// An empty ledger, for starting over.
pub fn clear() -> ContextLedger {
    ContextLedger::new()
}

/// The exchange pipeline bound to a model provider.
pub struct Exchange {
    provider: Arc<dyn Provider>,
    settings: PromptSettings,
}

impl Exchange {
    pub fn new(provider: Arc<dyn Provider>, settings: PromptSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn settings(&self) -> &PromptSettings {
        &self.settings
    }

    /// Answer `message` in the light of `prior`.
    ///
    /// A non-blank `explicit_category` wins over classification; unknown tags
    /// resolve to `general`. Only validation errors are returned.
    pub async fn run_exchange(
        &self,
        session_id: &str,
        message: &str,
        explicit_category: Option<&str>,
        prior: &ContextLedger,
    ) -> Result<ExchangeOutcome, Error> {
        validate_message(message)?;

        let category = match explicit_category.map(str::trim) {
            Some(tag) if !tag.is_empty() => Category::resolve(tag),
            _ => classify(message),
        };

        debug!(
            session_id,
            category = %category,
            prior_entries = prior.len(),
            "Starting exchange"
        );

        let request = build_request(category, prior, message, &self.settings);

        let (result, source) = match self.provider.complete(request).await {
            Ok(response) if !response.message.content.trim().is_empty() => {
                info!(
                    session_id,
                    category = %category,
                    provider = %self.provider.name(),
                    model = %response.model,
                    "Model answered"
                );
                let source = ResponseSource::Model {
                    provider: self.provider.name().to_string(),
                    model: response.model,
                };
                (assemble(category, response.message.content), source)
            }
            Ok(_) => self.fall_back(session_id, category, message, ModelFailure::Refused, "empty completion"),
            Err(e) => {
                let reason = e.failure();
                self.fall_back(session_id, category, message, reason, &e.to_string())
            }
        };

        let updated_context =
            prior.extended(message, result.response_text.clone(), Utc::now().timestamp_millis());

        Ok(ExchangeOutcome {
            result,
            updated_context,
            source,
        })
    }

    fn fall_back(
        &self,
        session_id: &str,
        category: Category,
        message: &str,
        reason: ModelFailure,
        detail: &str,
    ) -> (ExchangeResult, ResponseSource) {
        warn!(
            session_id,
            category = %category,
            failure = %reason,
            error = %detail,
            "Model unavailable, using fallback answer"
        );
        let result = assemble_fallback(category, fallback(category, message));
        (result, ResponseSource::Fallback { reason })
    }
}
