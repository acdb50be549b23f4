//! The context ledger: the ordered, caller-owned history of a conversation.
//!
//! The ledger is threaded through every exchange. The exchange pipeline only
//! ever reads a bounded window of it and hands back a new, extended ledger;
//! entries are never edited in place.

use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};

/// One turn of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// The role/content pair replayed to the model.
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// Chronologically ordered conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextLedger(Vec<ContextEntry>);

impl ContextLedger {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last `size` entries, oldest first.
    pub fn window(&self, size: usize) -> &[ContextEntry] {
        let start = self.0.len().saturating_sub(size);
        &self.0[start..]
    }

    /// A copy of this ledger followed by one user turn and one assistant turn,
    /// both stamped with `now_ms`.
    pub fn extended(
        &self,
        user_message: impl Into<String>,
        assistant_message: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + 2);
        entries.extend_from_slice(&self.0);
        entries.push(ContextEntry::new(Role::User, user_message, now_ms));
        entries.push(ContextEntry::new(Role::Assistant, assistant_message, now_ms));
        Self(entries)
    }
}

impl From<Vec<ContextEntry>> for ContextLedger {
    fn from(entries: Vec<ContextEntry>) -> Self {
        Self(entries)
    }
}

impl FromIterator<ContextEntry> for ContextLedger {
    fn from_iter<I: IntoIterator<Item = ContextEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_of(n: usize) -> ContextLedger {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                ContextEntry::new(role, format!("turn {i}"), i as i64)
            })
            .collect()
    }

    #[test]
    fn window_keeps_most_recent_in_order() {
        let ledger = ledger_of(15);
        let window = ledger.window(10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "turn 5");
        assert_eq!(window[9].content, "turn 14");
    }

    #[test]
    fn window_of_short_ledger_is_whole_ledger() {
        let ledger = ledger_of(3);
        assert_eq!(ledger.window(10).len(), 3);
        assert!(ContextLedger::new().window(10).is_empty());
    }

    #[test]
    fn extended_appends_user_then_assistant() {
        let ledger = ledger_of(2);
        let next = ledger.extended("question", "answer", 42);

        assert_eq!(ledger.len(), 2);
        assert_eq!(next.len(), 4);
        assert_eq!(next.entries()[2], ContextEntry::new(Role::User, "question", 42));
        assert_eq!(next.entries()[3], ContextEntry::new(Role::Assistant, "answer", 42));
    }

    #[test]
    fn ledger_serializes_as_plain_array() {
        let ledger = ContextLedger::from(vec![ContextEntry::new(Role::User, "hi", 1_700_000_000_000)]);
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(
            json,
            r#"[{"role":"user","content":"hi","timestamp":1700000000000}]"#
        );
    }
}
