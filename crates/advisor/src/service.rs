//! Session-aware chat operations.
//!
//! `ChatService` owns the bookkeeping around an exchange: sessions are created
//! on first use, both sides of every exchange are recorded in the transcript,
//! and the extended ledger is persisted afterwards.

use std::sync::Arc;

use lexline_core::category::Category;
use lexline_core::context::ContextLedger;
use lexline_core::error::{Error, SessionError, ValidationError};
use lexline_core::message::Message;
use lexline_core::provider::ProviderRequest;
use lexline_core::session::{Session, SessionStore, TranscriptMessage};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::exchange::{self, Exchange, ExchangeOutcome, validate_message};

/// Reachability of the model provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

pub struct ChatService {
    exchange: Exchange,
    store: Arc<dyn SessionStore>,
}

impl ChatService {
    pub fn new(exchange: Exchange, store: Arc<dyn SessionStore>) -> Self {
        Self { exchange, store }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Run one exchange for `session_id` and record it.
    ///
    /// When `context` is `None` the stored ledger is used as prior context.
    /// Nothing is written unless the message passes validation. Both
    /// transcript messages and the new ledger are written together once the
    /// exchange has finished, creating the session if it is new or was
    /// evicted in the meantime.
    pub async fn submit_message(
        &self,
        session_id: &str,
        message: &str,
        category: Option<&str>,
        context: Option<ContextLedger>,
    ) -> Result<ExchangeOutcome, Error> {
        if session_id.trim().is_empty() {
            return Err(ValidationError::EmptySessionId.into());
        }
        validate_message(message)?;

        let stored = self.store.get(session_id).await?;
        if stored.is_none() {
            info!(session_id, "Opening new session");
        }

        let prior = match context {
            Some(ledger) => ledger,
            None => stored.map(|s| s.context).unwrap_or_default(),
        };

        let user_message = TranscriptMessage::user(message);

        let outcome = self
            .exchange
            .run_exchange(session_id, message, category, &prior)
            .await?;

        let assistant_message = TranscriptMessage::assistant(
            outcome.result.response_text.clone(),
            outcome.result.citations.clone(),
            outcome.result.response_id.clone(),
        );

        self.store
            .record_exchange(
                session_id,
                category.and_then(Category::parse),
                vec![user_message, assistant_message],
                outcome.updated_context.clone(),
            )
            .await?;

        debug!(
            session_id,
            response_id = %outcome.result.response_id,
            ledger_entries = outcome.updated_context.len(),
            "Exchange recorded"
        );

        Ok(outcome)
    }

    /// The stored ledger for `session_id`.
    pub async fn get_context(&self, session_id: &str) -> Result<ContextLedger, Error> {
        Ok(self.require(session_id).await?.context)
    }

    /// Session metadata and the full transcript.
    pub async fn get_conversation(
        &self,
        session_id: &str,
    ) -> Result<(Session, Vec<TranscriptMessage>), Error> {
        let session = self.require(session_id).await?;
        let messages = self.store.messages(session_id).await?;
        Ok((session, messages))
    }

    /// Reset the stored ledger. The transcript is kept.
    pub async fn clear_context(&self, session_id: &str) -> Result<(), Error> {
        self.require(session_id).await?;
        self.store.update_context(session_id, exchange::clear()).await?;
        info!(session_id, "Conversation context cleared");
        Ok(())
    }

    /// Check the provider chain with a minimal completion.
    pub async fn health_check(&self) -> ConnectionStatus {
        let request = ProviderRequest::new(
            self.exchange.settings().model.clone(),
            vec![Message::user("Hello")],
        )
        .with_max_tokens(5);

        match self.exchange.provider().complete(request).await {
            Ok(_) => ConnectionStatus::Connected,
            Err(e) => {
                warn!(error = %e, "Provider health check failed");
                ConnectionStatus::Disconnected
            }
        }
    }

    async fn require(&self, session_id: &str) -> Result<Session, Error> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()).into())
    }
}
