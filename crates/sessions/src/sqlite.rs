//! SQLite session store.
//!
//! Two tables:
//! - `sessions` holds the ledger (as JSON), the opening category and timestamps
//! - `messages` holds the transcript, ordered by an autoincrement key

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lexline_core::category::Category;
use lexline_core::context::ContextLedger;
use lexline_core::error::SessionError;
use lexline_core::message::Role;
use lexline_core::session::{Session, SessionStore, TranscriptMessage};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (or create) the database at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, SessionError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| SessionError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // Every connection to `:memory:` is its own database.
        let ephemeral = path.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new().max_connections(if ephemeral { 1 } else { 4 });
        if ephemeral {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite session store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), SessionError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                session_id  TEXT PRIMARY KEY NOT NULL,
                context     TEXT NOT NULL DEFAULT '[]',
                category    TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::MigrationFailed(format!("sessions table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                iid          INTEGER PRIMARY KEY AUTOINCREMENT,
                id           TEXT UNIQUE NOT NULL,
                session_id   TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
                role         TEXT NOT NULL,
                content      TEXT NOT NULL,
                citations    TEXT,
                response_id  TEXT,
                timestamp    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::MigrationFailed(format!("messages table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, iid)")
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::MigrationFailed(format!("messages index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn parse_time(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, SessionError> {
        let column = |name: &str, e: sqlx::Error| SessionError::Storage(format!("{name} column: {e}"));

        let session_id: String = row.try_get("session_id").map_err(|e| column("session_id", e))?;
        let context_json: String = row.try_get("context").map_err(|e| column("context", e))?;
        let category: Option<String> = row.try_get("category").map_err(|e| column("category", e))?;
        let created_at: String = row.try_get("created_at").map_err(|e| column("created_at", e))?;
        let updated_at: String = row.try_get("updated_at").map_err(|e| column("updated_at", e))?;

        let context: ContextLedger = serde_json::from_str(&context_json)
            .map_err(|e| SessionError::Storage(format!("Corrupt context for {session_id}: {e}")))?;

        Ok(Session {
            session_id,
            context,
            category: category.as_deref().and_then(Category::parse),
            created_at: Self::parse_time(&created_at),
            updated_at: Self::parse_time(&updated_at),
        })
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<TranscriptMessage, SessionError> {
        let column = |name: &str, e: sqlx::Error| SessionError::Storage(format!("{name} column: {e}"));

        let role: String = row.try_get("role").map_err(|e| column("role", e))?;
        let timestamp: String = row.try_get("timestamp").map_err(|e| column("timestamp", e))?;

        Ok(TranscriptMessage {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            role: Role::from_str(&role).map_err(|e| SessionError::Storage(e.to_string()))?,
            content: row.try_get("content").map_err(|e| column("content", e))?,
            citations: row.try_get("citations").map_err(|e| column("citations", e))?,
            response_id: row.try_get("response_id").map_err(|e| column("response_id", e))?,
            timestamp: Self::parse_time(&timestamp),
        })
    }

    async fn touch(&self, session_id: &str) -> Result<u64, SessionError> {
        let result = sqlx::query("UPDATE sessions SET updated_at = ?1 WHERE session_id = ?2")
            .bind(Utc::now().to_rfc3339())
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::Storage(format!("UPDATE failed: {e}")))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE session_id = ?1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SessionError::Storage(format!("SELECT failed: {e}")))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn create(
        &self,
        session_id: &str,
        category: Option<Category>,
    ) -> Result<Session, SessionError> {
        let session = Session::new(session_id, category);
        let now = session.created_at.to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SessionError::Storage(format!("BEGIN failed: {e}")))?;

        sqlx::query("DELETE FROM messages WHERE session_id = ?1")
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| SessionError::Storage(format!("DELETE failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, context, category, created_at, updated_at)
            VALUES (?1, '[]', ?2, ?3, ?3)
            ON CONFLICT(session_id) DO UPDATE SET
                context = '[]',
                category = excluded.category,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(category.map(|c| c.as_str()))
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| SessionError::Storage(format!("INSERT failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| SessionError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(session_id, "Created session");
        Ok(session)
    }

    async fn update_context(
        &self,
        session_id: &str,
        context: ContextLedger,
    ) -> Result<Session, SessionError> {
        let context_json = serde_json::to_string(&context)
            .map_err(|e| SessionError::Storage(format!("Context serialization: {e}")))?;

        let result = sqlx::query(
            "UPDATE sessions SET context = ?1, updated_at = ?2 WHERE session_id = ?3",
        )
        .bind(&context_json)
        .bind(Utc::now().to_rfc3339())
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::Storage(format!("UPDATE failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        self.get(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn append_message(
        &self,
        session_id: &str,
        message: TranscriptMessage,
    ) -> Result<(), SessionError> {
        if self.touch(session_id).await? == 0 {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, session_id, role, content, citations, response_id, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&message.id)
        .bind(session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&message.citations)
        .bind(&message.response_id)
        .bind(message.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::Storage(format!("INSERT failed: {e}")))?;

        Ok(())
    }

    async fn record_exchange(
        &self,
        session_id: &str,
        opening_category: Option<Category>,
        messages: Vec<TranscriptMessage>,
        context: ContextLedger,
    ) -> Result<Session, SessionError> {
        let context_json = serde_json::to_string(&context)
            .map_err(|e| SessionError::Storage(format!("Context serialization: {e}")))?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SessionError::Storage(format!("BEGIN failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, context, category, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(session_id) DO UPDATE SET
                context = excluded.context,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(&context_json)
        .bind(opening_category.map(|c| c.as_str()))
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| SessionError::Storage(format!("UPSERT failed: {e}")))?;

        for message in &messages {
            sqlx::query(
                r#"
                INSERT INTO messages (id, session_id, role, content, citations, response_id, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&message.id)
            .bind(session_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(&message.citations)
            .bind(&message.response_id)
            .bind(message.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| SessionError::Storage(format!("INSERT failed: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| SessionError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(session_id, messages = messages.len(), "Recorded exchange");
        self.get(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<TranscriptMessage>, SessionError> {
        let rows = sqlx::query("SELECT * FROM messages WHERE session_id = ?1 ORDER BY iid ASC")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SessionError::Storage(format!("SELECT failed: {e}")))?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn count(&self) -> Result<usize, SessionError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SessionError::Storage(format!("COUNT failed: {e}")))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| SessionError::Storage(format!("count column: {e}")))?;
        Ok(count as usize)
    }
}
