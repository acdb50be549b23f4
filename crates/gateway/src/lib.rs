//! HTTP API gateway for Lexline.
//!
//! Exposes the chat, conversation and health endpoints under `/api`.
//! Built on Axum.

pub mod api;

use axum::extract::{ConnectInfo, DefaultBodyLimit};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{
    Router,
    middleware::{self, Next},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use lexline_advisor::{ChatService, Exchange, PromptSettings};
use lexline_config::{AppConfig, GatewayConfig};

pub use api::{ApiState, SharedState};

/// Path exempt from rate limiting so monitors can poll it freely.
const HEALTH_PATH: &str = "/api/health";

/// Build the full router.
///
/// Layers applied:
/// - CORS restricted to the configured origins
/// - Request body size limit (1 MB)
/// - In-memory rate limiting per client (health endpoint exempt)
/// - HTTP trace logging
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    let rate_limiter = Arc::new(RateLimiter::new(
        gateway.rate_limit_per_minute,
        Duration::from_secs(60),
    ));
    let trust_forwarded_for = gateway.trust_forwarded_for;

    api::api_router(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, trust_forwarded_for, req, next)
        }))
        .layer(cors_layer(&gateway.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
///
/// Builds the provider chain and the session store once and shares them
/// between all requests.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = lexline_providers::build_from_config(&config)?;
    let store = lexline_sessions::open(&config.sessions).await?;
    info!(
        provider = %provider.name(),
        store = %store.name(),
        model = %config.default_model,
        "Subsystems ready"
    );

    let exchange = Exchange::new(provider, PromptSettings::from_config(&config));
    let state = Arc::new(ApiState {
        chat: ChatService::new(exchange, store),
        service_label: format!("{}/{}", config.default_provider, config.default_model),
    });

    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client key.
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly).
struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if the request is allowed. A limit of 0 allows everything.
    fn check(&self, client_key: &str) -> bool {
        if self.max_requests == 0 {
            return true;
        }

        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Drop idle clients once the map gets large
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Client key: the peer IP, or the first `X-Forwarded-For` hop when the
/// gateway sits behind a trusted proxy. "anonymous" when neither is known.
fn client_key(req: &axum::extract::Request, trust_forwarded_for: bool) -> String {
    let forwarded = || {
        req.headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let peer = || {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    };

    let key = if trust_forwarded_for {
        forwarded().or_else(peer)
    } else {
        peer()
    };
    key.unwrap_or_else(|| "anonymous".to_string())
}

async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    trust_forwarded_for: bool,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if req.uri().path() == HEALTH_PATH {
        return Ok(next.run(req).await);
    }

    let key = client_key(&req, trust_forwarded_for);
    if !limiter.check(&key) {
        warn!(client = %key, "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}
