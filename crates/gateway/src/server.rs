//! Axum-based HTTP server for the gateway.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, MatchedPath, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use metrics_exporter_prometheus::PrometheusHandle;

use fanplay_controller::MomentOrchestrator;
use fanplay_core::{
    config::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SESSION_IDLE_SECS},
    types::{GuideResponse, MediaFile, PersonaTag, SourceInput, SportTag},
    Error, Result,
};
use fanplay_governance::track_request;

use crate::sessions::SessionRegistry;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
    /// Request body limit in bytes.
    pub max_body_bytes: usize,
    /// Idle time after which a session is evicted.
    pub session_idle_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            enable_tracing: true,
            max_body_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub sessions: SessionRegistry,
}

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig, orchestrator: Arc<MomentOrchestrator>) -> Self {
        Self {
            config,
            state: Arc::new(AppState {
                sessions: SessionRegistry::new(orchestrator),
            }),
            metrics_handle: None,
        }
    }

    /// Set metrics handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Shared state, mainly for inspection in tests.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/v1/sessions/:session_id", delete(delete_session_handler))
            .route("/v1/sessions/:session_id/analyze", post(analyze_handler))
            .route("/v1/sessions/:session_id/inflight", delete(cancel_handler))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        router = router.layer(middleware::from_fn(track_metrics));

        if self.config.enable_cors {
            router = router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        let sweeper = spawn_idle_sweep(self.state.clone(), self.config.session_idle_timeout);

        let served = axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)));
        sweeper.abort();
        served
    }
}

/// Periodically evict idle sessions.
fn spawn_idle_sweep(state: Arc<AppState>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    let period = (max_idle / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            state.sessions.evict_idle(max_idle);
        }
    })
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;
    track_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Uploaded media, base64 encoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    /// File name; identifies the source across calls.
    pub name: String,
    /// MIME type (e.g. `video/mp4`).
    pub mime_type: String,
    /// Standard base64 data, optionally as a `data:` URL.
    pub data: String,
}

/// Analyze request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Declared sport.
    pub sport: String,
    /// Persona tag.
    pub persona: String,
    /// Highlight link.
    #[serde(default)]
    pub url: Option<String>,
    /// Uploaded file.
    #[serde(default)]
    pub media: Option<MediaUpload>,
}

/// Versioned envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub version: &'static str,
    pub data: T,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// User-facing message.
    pub message: String,
    /// Whether retrying the same request may succeed.
    pub retryable: bool,
}

/// Cancel response.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Error wrapper mapping core errors and body rejections to HTTP responses.
pub enum ApiError {
    Core(Error),
    Body(JsonRejection),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Core(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            Self::Core(error) => error,
            Self::Body(rejection) => return body_rejection_response(rejection),
        };

        let status = match &error {
            Error::InvalidInput(_) | Error::UnsupportedPersona(_) => StatusCode::BAD_REQUEST,
            Error::SessionBusy | Error::Superseded => StatusCode::CONFLICT,
            Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Error::MalformedResponse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::EngineUnavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %error, "Request failed");
        }

        let body = ErrorResponse {
            code: error.code().to_string(),
            message: error.user_message(),
            retryable: error.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

fn body_rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let body = if status == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorResponse {
            code: "payload_too_large".to_string(),
            message: "The uploaded file is too large.".to_string(),
            retryable: false,
        }
    } else {
        ErrorResponse {
            code: "invalid_request".to_string(),
            message: rejection.body_text(),
            retryable: false,
        }
    };
    tracing::debug!(status = %status, reason = %rejection.body_text(), "Request body rejected");
    (status, Json(body)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn decode_media(upload: MediaUpload) -> Result<MediaFile> {
    // Accept the `data:<mime>;base64,<payload>` form produced by browsers.
    let payload = match upload.data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => upload.data.as_str(),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::invalid_input(format!("Media is not valid base64: {}", e)))?;

    Ok(MediaFile::new(upload.name, upload.mime_type, bytes))
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<ApiResponse<GuideResponse>>, ApiError> {
    let Json(req) = payload?;
    let sport: SportTag = req.sport.parse()?;
    let persona: PersonaTag = req.persona.parse()?;
    let media = req.media.map(decode_media).transpose()?;
    let source = SourceInput {
        url: req.url,
        media,
    };

    let session = state.sessions.get_or_create(&session_id);
    let guide = session.analyze(sport, persona, source).await?;

    Ok(Json(ApiResponse {
        version: "v1",
        data: guide,
    }))
}

async fn cancel_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> std::result::Result<Json<CancelResponse>, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| Error::SessionNotFound(session_id.clone()))?;

    Ok(Json(CancelResponse {
        cancelled: session.cancel(),
    }))
}

async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    if state.sessions.remove(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::SessionNotFound(session_id).into())
    }
}
