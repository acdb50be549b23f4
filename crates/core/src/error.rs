//! Error types for the Lexline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Lexline operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Input validation ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Session store errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the requested session does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Session(SessionError::NotFound(_)))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A user message that cannot be accepted for an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("session id must not be empty")]
    EmptySessionId,

    #[error("message is {len} characters, the maximum is {max}")]
    MessageTooLong { len: usize, max: usize },
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model refused to answer: {0}")]
    Refused(String),
}

/// Coarse classification of a failed model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFailure {
    /// The provider could not be reached or rejected the request.
    Unavailable,
    /// The provider did not answer in time.
    Timeout,
    /// The provider answered, but with nothing usable.
    Refused,
}

impl std::fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModelFailure::Unavailable => "unavailable",
            ModelFailure::Timeout => "timeout",
            ModelFailure::Refused => "refused",
        };
        f.write_str(s)
    }
}

impl ProviderError {
    /// Classify this error for logging and fallback decisions.
    pub fn failure(&self) -> ModelFailure {
        match self {
            ProviderError::Timeout(_) => ModelFailure::Timeout,
            ProviderError::Refused(_) => ModelFailure::Refused,
            _ => ModelFailure::Unavailable,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn validation_error_reports_limit() {
        let err = Error::from(ValidationError::MessageTooLong { len: 1200, max: 1000 });
        assert!(err.to_string().contains("1200"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn provider_failures_are_classified() {
        assert_eq!(
            ProviderError::Timeout("slow".into()).failure(),
            ModelFailure::Timeout
        );
        assert_eq!(
            ProviderError::Refused("empty".into()).failure(),
            ModelFailure::Refused
        );
        assert_eq!(
            ProviderError::Network("conn refused".into()).failure(),
            ModelFailure::Unavailable
        );
        assert_eq!(
            ProviderError::RateLimited { retry_after_secs: 5 }.failure(),
            ModelFailure::Unavailable
        );
    }

    #[test]
    fn not_found_is_detected() {
        let err = Error::from(SessionError::NotFound("abc".into()));
        assert!(err.is_not_found());
        assert!(!Error::Internal("boom".into()).is_not_found());
    }
}
