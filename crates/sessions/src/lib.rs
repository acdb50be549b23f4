//! Session store implementations for Lexline.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemorySessionStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSessionStore;

use lexline_config::SessionsConfig;
use lexline_core::error::SessionError;
use lexline_core::session::SessionStore;
use std::sync::Arc;

/// Open the backend selected by `config.backend`.
pub async fn open(config: &SessionsConfig) -> Result<Arc<dyn SessionStore>, SessionError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemorySessionStore::with_capacity(config.max_sessions))),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SessionError::Storage(format!("Cannot create {}: {e}", parent.display())))?;
            }
            let url = format!("sqlite://{}", path.display());
            Ok(Arc::new(SqliteSessionStore::new(&url).await?))
        }
        other => Err(SessionError::Storage(format!(
            "Unsupported session backend '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_memory_backend_by_default() {
        let store = open(&SessionsConfig::default()).await.unwrap();
        assert_eq!(store.name(), "in_memory");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn opens_sqlite_backend_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionsConfig {
            backend: "sqlite".into(),
            path: Some(dir.path().join("nested/sessions.db").display().to_string()),
            ..SessionsConfig::default()
        };
        let store = open(&config).await.unwrap();
        assert_eq!(store.name(), "sqlite");
        assert!(dir.path().join("nested/sessions.db").exists());
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = SessionsConfig {
            backend: "redis".into(),
            ..SessionsConfig::default()
        };
        assert!(open(&config).await.is_err());
    }
}
