//! JSON endpoints under `/api`.
//!
//! All handlers share one [`ChatService`]. Errors are mapped onto a small
//! set of response shapes: validation problems are 400, unknown sessions
//! are 404, and everything else is 500.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use lexline_advisor::{ChatService, ConnectionStatus, PROFILES};
use lexline_core::context::ContextLedger;
use lexline_core::error::Error;
use lexline_core::session::{Session, TranscriptMessage};
use serde::{Deserialize, Serialize};
use tracing::error;

pub struct ApiState {
    pub chat: ChatService,
    /// Shown by the health endpoint, e.g. `openai/gpt-4o`.
    pub service_label: String,
}

pub type SharedState = Arc<ApiState>;

/// Routes without middleware. See [`crate::build_router`] for the layered app.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/categories", get(categories))
        .route("/api/chat", post(chat))
        .route(
            "/api/conversation/{session_id}",
            get(get_conversation).delete(clear_conversation),
        )
        .route("/api/conversation/{session_id}/context", get(get_context))
        .with_state(state)
}

// --- Request / Response Types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub context: Option<ContextLedger>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub citations: String,
    #[serde(rename = "responseId")]
    pub response_id: String,
    pub category: String,
    pub context: ContextLedger,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ConnectionStatus,
    pub timestamp: i64,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Session,
    pub messages: Vec<TranscriptMessage>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub context: ContextLedger,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn invalid_request(details: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Invalid request format".into(),
            details: Some(details),
            message: None,
        }),
    )
}

/// Schema and syntax failures share the validation shape; an oversized body
/// keeps its 413.
fn payload_error(rejection: JsonRejection) -> ApiError {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse {
                error: "Request body too large".into(),
                details: Some(rejection.body_text()),
                message: None,
            }),
        ),
        _ => invalid_request(rejection.body_text()),
    }
}

fn api_error(err: Error, failure_message: &str) -> ApiError {
    match err {
        Error::Validation(e) => invalid_request(e.to_string()),
        e if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Conversation not found".into(),
                details: None,
                message: None,
            }),
        ),
        e => {
            error!(error = %e, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".into(),
                    details: None,
                    message: Some(failure_message.into()),
                }),
            )
        }
    }
}

// --- Handlers ---

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.chat.health_check().await,
        timestamp: Utc::now().timestamp_millis(),
        service: state.service_label.clone(),
    })
}

async fn categories() -> Json<Vec<CategoryInfo>> {
    Json(
        PROFILES
            .iter()
            .map(|p| CategoryInfo {
                id: p.category.as_str(),
                label: p.label,
            })
            .collect(),
    )
}

async fn chat(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(payload_error)?;

    let outcome = state
        .chat
        .submit_message(&req.session_id, &req.message, req.category.as_deref(), req.context)
        .await
        .map_err(|e| api_error(e, "Failed to process chat request"))?;

    Ok(Json(ChatResponse {
        response: outcome.result.response_text,
        citations: outcome.result.citations,
        response_id: outcome.result.response_id,
        category: outcome.result.category.as_str().to_string(),
        context: outcome.updated_context,
    }))
}

async fn get_conversation(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let (conversation, messages) = state
        .chat
        .get_conversation(&session_id)
        .await
        .map_err(|e| api_error(e, "Failed to fetch conversation"))?;

    Ok(Json(ConversationResponse {
        conversation,
        messages,
    }))
}

async fn get_context(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<ContextResponse>, ApiError> {
    let context = state
        .chat
        .get_context(&session_id)
        .await
        .map_err(|e| api_error(e, "Failed to fetch conversation context"))?;

    Ok(Json(ContextResponse { context }))
}

async fn clear_conversation(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    state
        .chat
        .clear_context(&session_id)
        .await
        .map_err(|e| api_error(e, "Failed to clear conversation"))?;

    Ok(Json(StatusMessage {
        message: "Conversation context cleared".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use lexline_advisor::{Exchange, PromptSettings};
    use lexline_core::error::{ProviderError, SessionError};
    use lexline_core::message::Message;
    use lexline_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use lexline_core::session::SessionStore;
    use lexline_sessions::InMemorySessionStore;
    use tower::ServiceExt;

    struct MockProvider {
        fail: bool,
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::Timeout("mock".into()));
            }
            Ok(ProviderResponse {
                message: Message::assistant("You may be entitled to a refund."),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    /// Store whose every operation fails with a storage error.
    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }
        async fn get(&self, _id: &str) -> Result<Option<Session>, SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
        async fn create(
            &self,
            _id: &str,
            _category: Option<lexline_core::category::Category>,
        ) -> Result<Session, SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
        async fn update_context(&self, _id: &str, _context: ContextLedger) -> Result<Session, SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
        async fn append_message(&self, _id: &str, _message: TranscriptMessage) -> Result<(), SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
        async fn record_exchange(
            &self,
            _id: &str,
            _category: Option<lexline_core::category::Category>,
            _messages: Vec<TranscriptMessage>,
            _context: ContextLedger,
        ) -> Result<Session, SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
        async fn messages(&self, _id: &str) -> Result<Vec<TranscriptMessage>, SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
        async fn count(&self) -> Result<usize, SessionError> {
            Err(SessionError::Storage("disk gone".into()))
        }
    }

    fn app_with(provider: MockProvider, store: Arc<dyn SessionStore>) -> Router {
        let exchange = Exchange::new(Arc::new(provider), PromptSettings::default());
        api_router(Arc::new(ApiState {
            chat: ChatService::new(exchange, store),
            service_label: "mock/mock-model".into(),
        }))
    }

    fn app() -> Router {
        app_with(MockProvider { fail: false }, Arc::new(InMemorySessionStore::new()))
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_connected() {
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "connected");
        assert_eq!(json["service"], "mock/mock-model");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn health_reports_disconnected_when_provider_fails() {
        let app = app_with(MockProvider { fail: true }, Arc::new(InMemorySessionStore::new()));
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let json = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json["status"], "disconnected");
    }

    #[tokio::test]
    async fn categories_lists_all_thirteen() {
        let req = Request::builder().uri("/api/categories").body(Body::empty()).unwrap();
        let json = json_body(app().oneshot(req).await.unwrap()).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 13);
        assert_eq!(list[0]["id"], "employment");
        assert_eq!(list[12]["id"], "general");
    }

    #[tokio::test]
    async fn chat_returns_answer_and_extended_context() {
        let response = app()
            .oneshot(chat_request(serde_json::json!({
                "message": "I bought a faulty laptop and want a refund",
                "sessionId": "s1"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["response"], "You may be entitled to a refund.");
        assert_eq!(json["category"], "consumer");
        assert!(json["responseId"].as_str().unwrap().starts_with("LR-"));
        assert!(json["citations"].as_str().unwrap().contains("Consumer Rights Act 2015"));

        let context = json["context"].as_array().unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(context[0]["role"], "user");
        assert_eq!(context[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn chat_uses_explicit_category() {
        let json = json_body(
            app()
                .oneshot(chat_request(serde_json::json!({
                    "message": "What are my options?",
                    "sessionId": "s1",
                    "category": "immigration"
                })))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["category"], "immigration");
    }

    #[tokio::test]
    async fn chat_falls_back_when_provider_fails() {
        let app = app_with(MockProvider { fail: true }, Arc::new(InMemorySessionStore::new()));
        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "My landlord won't return my deposit",
                "sessionId": "s1"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert!(json["responseId"].as_str().unwrap().starts_with("FB-"));
        assert_eq!(json["category"], "housing");
    }

    #[tokio::test]
    async fn chat_rejects_empty_message() {
        let response = app()
            .oneshot(chat_request(serde_json::json!({ "message": "   ", "sessionId": "s1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid request format");
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn chat_schema_failures_use_error_shape() {
        let missing_session = chat_request(serde_json::json!({ "message": "hello" }));
        let wrong_type = chat_request(serde_json::json!({ "message": 42, "sessionId": "s1" }));
        let malformed = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{\"message\": "))
            .unwrap();
        let no_content_type = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .body(Body::from(r#"{"message":"hi","sessionId":"s1"}"#))
            .unwrap();

        for req in [missing_session, wrong_type, malformed, no_content_type] {
            let response = app().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let json = json_body(response).await;
            assert_eq!(json["error"], "Invalid request format");
            assert!(!json["details"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn chat_rejects_overlong_message() {
        let response = app()
            .oneshot(chat_request(serde_json::json!({
                "message": "a".repeat(1001),
                "sessionId": "s1"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_storage_failure_is_500() {
        let app = app_with(MockProvider { fail: false }, Arc::new(BrokenStore));
        let response = app
            .oneshot(chat_request(serde_json::json!({ "message": "hi", "sessionId": "s1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json_body(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["message"], "Failed to process chat request");
    }

    #[tokio::test]
    async fn conversation_roundtrip() {
        let app = app();
        app.clone()
            .oneshot(chat_request(serde_json::json!({
                "message": "I was dismissed without notice",
                "sessionId": "s1"
            })))
            .await
            .unwrap();

        let req = Request::builder()
            .uri("/api/conversation/s1")
            .body(Body::empty())
            .unwrap();
        let json = json_body(app.clone().oneshot(req).await.unwrap()).await;
        assert_eq!(json["conversation"]["sessionId"], "s1");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);

        let req = Request::builder()
            .method("DELETE")
            .uri("/api/conversation/s1")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Conversation context cleared");

        let req = Request::builder()
            .uri("/api/conversation/s1/context")
            .body(Body::empty())
            .unwrap();
        let json = json_body(app.oneshot(req).await.unwrap()).await;
        assert!(json["context"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_conversation_is_404() {
        for (method, uri) in [
            ("GET", "/api/conversation/missing"),
            ("GET", "/api/conversation/missing/context"),
            ("DELETE", "/api/conversation/missing"),
        ] {
            let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
            let response = app().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(json_body(response).await["error"], "Conversation not found");
        }
    }
}
