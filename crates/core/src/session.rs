//! Session store trait and the per-session conversation state it persists.
//!
//! A session holds the latest context ledger, the category the session was
//! opened with, and a transcript of every chat message (with citations and
//! response ids on assistant replies). The exchange pipeline never touches
//! the store; only the caller-facing service does, and it writes each
//! exchange through [`SessionStore::record_exchange`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::Category;
use crate::context::ContextLedger;
use crate::error::SessionError;
use crate::message::Role;

/// Stored state of one chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,

    /// Latest context ledger persisted by the caller.
    pub context: ContextLedger,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh session with an empty ledger.
    pub fn new(session_id: impl Into<String>, category: Option<Category>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            context: ContextLedger::new(),
            category,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One message in a session's transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub id: String,
    pub role: Role,
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl TranscriptMessage {
    /// A user question as it was submitted.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            citations: None,
            response_id: None,
            timestamp: Utc::now(),
        }
    }

    /// An assistant reply together with its citations and response id.
    pub fn assistant(
        content: impl Into<String>,
        citations: impl Into<String>,
        response_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            citations: Some(citations.into()),
            response_id: Some(response_id.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Persistence for chat sessions, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name (e.g., "in_memory", "sqlite").
    fn name(&self) -> &str;

    /// Fetch a session. `Ok(None)` if it does not exist.
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError>;

    /// Create a session with an empty ledger, replacing any existing one.
    async fn create(
        &self,
        session_id: &str,
        category: Option<Category>,
    ) -> Result<Session, SessionError>;

    /// Replace the stored ledger. Fails with `NotFound` for unknown sessions.
    async fn update_context(
        &self,
        session_id: &str,
        context: ContextLedger,
    ) -> Result<Session, SessionError>;

    /// Append to the transcript. Fails with `NotFound` for unknown sessions.
    async fn append_message(
        &self,
        session_id: &str,
        message: TranscriptMessage,
    ) -> Result<(), SessionError>;

    /// Append `messages` and replace the ledger in one step.
    ///
    /// Creates the session with `opening_category` if it does not exist, so
    /// a session dropped while its exchange was running is restored rather
    /// than failing.
    async fn record_exchange(
        &self,
        session_id: &str,
        opening_category: Option<Category>,
        messages: Vec<TranscriptMessage>,
        context: ContextLedger,
    ) -> Result<Session, SessionError>;

    /// Transcript in insertion order. Empty for unknown sessions.
    async fn messages(&self, session_id: &str) -> Result<Vec<TranscriptMessage>, SessionError>;

    /// Number of stored sessions.
    async fn count(&self) -> Result<usize, SessionError>;
}
