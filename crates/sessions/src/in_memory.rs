//! In-memory session store, the default backend for a single gateway process.
//!
//! Bounded: once `max_sessions` is reached, creating a new session evicts the
//! one that was updated least recently (together with its transcript).

use async_trait::async_trait;
use chrono::Utc;
use lexline_core::category::Category;
use lexline_core::context::ContextLedger;
use lexline_core::error::SessionError;
use lexline_core::session::{Session, SessionStore, TranscriptMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct StoredSession {
    session: Session,
    messages: Vec<TranscriptMessage>,
}

pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    max_sessions: usize,
}

impl InMemorySessionStore {
    /// Default capacity, matching the gateway's configuration default.
    pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SESSIONS)
    }

    /// A store holding at most `max_sessions` sessions (minimum 1).
    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn evict_stalest(sessions: &mut HashMap<String, StoredSession>) {
    let stalest = sessions
        .iter()
        .min_by_key(|(_, stored)| stored.session.updated_at)
        .map(|(id, _)| id.clone());

    if let Some(id) = stalest {
        sessions.remove(&id);
        debug!(session_id = %id, "Evicted least recently updated session");
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).map(|s| s.session.clone()))
    }

    async fn create(
        &self,
        session_id: &str,
        category: Option<Category>,
    ) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(session_id) && sessions.len() >= self.max_sessions {
            evict_stalest(&mut sessions);
        }

        let session = Session::new(session_id, category);
        sessions.insert(
            session_id.to_string(),
            StoredSession {
                session: session.clone(),
                messages: Vec::new(),
            },
        );
        Ok(session)
    }

    async fn update_context(
        &self,
        session_id: &str,
        context: ContextLedger,
    ) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        stored.session.context = context;
        stored.session.updated_at = Utc::now();
        Ok(stored.session.clone())
    }

    async fn append_message(
        &self,
        session_id: &str,
        message: TranscriptMessage,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        stored.messages.push(message);
        stored.session.updated_at = Utc::now();
        Ok(())
    }

    async fn record_exchange(
        &self,
        session_id: &str,
        opening_category: Option<Category>,
        messages: Vec<TranscriptMessage>,
        context: ContextLedger,
    ) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(session_id) {
            if sessions.len() >= self.max_sessions {
                evict_stalest(&mut sessions);
            }
            debug!(session_id, "Opening session while recording exchange");
            sessions.insert(
                session_id.to_string(),
                StoredSession {
                    session: Session::new(session_id, opening_category),
                    messages: Vec::new(),
                },
            );
        }

        let stored = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        stored.messages.extend(messages);
        stored.session.context = context;
        stored.session.updated_at = Utc::now();
        Ok(stored.session.clone())
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<TranscriptMessage>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default())
    }

    async fn count(&self) -> Result<usize, SessionError> {
        Ok(self.sessions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexline_core::context::ContextEntry;
    use lexline_core::message::Role;

    #[tokio::test]
    async fn create_and_get() {
        let store = InMemorySessionStore::new();
        store.create("session_1", Some(Category::Housing)).await.unwrap();

        let session = store.get("session_1").await.unwrap().unwrap();
        assert_eq!(session.session_id, "session_1");
        assert_eq!(session.category, Some(Category::Housing));
        assert!(session.context.is_empty());
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_context_replaces_ledger() {
        let store = InMemorySessionStore::new();
        store.create("s", None).await.unwrap();

        let ledger = ContextLedger::new().extended("q", "a", 1_000);
        let updated = store.update_context("s", ledger).await.unwrap();
        assert_eq!(updated.context.len(), 2);

        let fetched = store.get("s").await.unwrap().unwrap();
        assert_eq!(fetched.context.entries()[0].role, Role::User);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn update_unknown_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let result = store.update_context("nope", ContextLedger::new()).await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));

        let result = store.append_message("nope", TranscriptMessage::user("hi")).await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn transcript_keeps_insertion_order() {
        let store = InMemorySessionStore::new();
        store.create("s", None).await.unwrap();
        store.append_message("s", TranscriptMessage::user("first")).await.unwrap();
        store
            .append_message("s", TranscriptMessage::assistant("second", "cites", "LR-1-abcdef"))
            .await
            .unwrap();

        let messages = store.messages("s").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].response_id.as_deref(), Some("LR-1-abcdef"));
        assert!(store.messages("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_replaces_existing_session() {
        let store = InMemorySessionStore::new();
        store.create("s", None).await.unwrap();
        store
            .update_context("s", ContextLedger::from(vec![ContextEntry::new(Role::User, "x", 1)]))
            .await
            .unwrap();
        store.append_message("s", TranscriptMessage::user("x")).await.unwrap();

        store.create("s", Some(Category::Debt)).await.unwrap();
        let session = store.get("s").await.unwrap().unwrap();
        assert!(session.context.is_empty());
        assert!(store.messages("s").await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_updated() {
        let store = InMemorySessionStore::with_capacity(2);
        store.create("old", None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.create("newer", None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // Touching "old" makes "newer" the stalest.
        store.append_message("old", TranscriptMessage::user("still here")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        store.create("third", None).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.get("old").await.unwrap().is_some());
        assert!(store.get("newer").await.unwrap().is_none());
        assert!(store.get("third").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn record_exchange_updates_existing_session() {
        let store = InMemorySessionStore::new();
        store.create("s", Some(Category::Housing)).await.unwrap();

        let ledger = ContextLedger::new().extended("q", "a", 7);
        let session = store
            .record_exchange(
                "s",
                Some(Category::Debt),
                vec![
                    TranscriptMessage::user("q"),
                    TranscriptMessage::assistant("a", "cites", "LR-1-abcdef"),
                ],
                ledger.clone(),
            )
            .await
            .unwrap();

        // The opening category only applies to newly created sessions.
        assert_eq!(session.category, Some(Category::Housing));
        assert_eq!(session.context, ledger);
        assert_eq!(store.messages("s").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn record_exchange_restores_evicted_session() {
        let store = InMemorySessionStore::with_capacity(1);
        store.create("a", None).await.unwrap();
        store.create("b", None).await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());

        let session = store
            .record_exchange(
                "a",
                Some(Category::Consumer),
                vec![TranscriptMessage::user("q")],
                ContextLedger::new().extended("q", "a", 1),
            )
            .await
            .unwrap();

        assert_eq!(session.category, Some(Category::Consumer));
        assert_eq!(session.context.len(), 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zero_capacity_still_holds_one_session() {
        let store = InMemorySessionStore::with_capacity(0);
        store.create("a", None).await.unwrap();
        store.create("b", None).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get("b").await.unwrap().is_some());
    }
}
