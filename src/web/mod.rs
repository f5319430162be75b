// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Detection API and browser UI

pub mod ui;

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::detectors::{DetectionService, Upload};
use crate::media::{self, MediaKind};
use crate::verdict::DetectionResult;
use crate::{Result, TruthScanError};

pub const BANNER: &str = "TruthScan API is running";

/// Room for multipart framing on top of the largest upload
const BODY_SLACK: u64 = 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub service: DetectionService,
    pub config: AppConfig,
    index_html: String,
}

impl AppState {
    pub fn new(config: AppConfig, service: DetectionService) -> Result<Self> {
        let index_html = ui::render_index(service.limits())?;
        Ok(Self {
            service,
            config,
            index_html,
        })
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = (state.service.limits().largest() + BODY_SLACK) as usize;
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/detect/text", post(detect_text))
        .route("/detect/image", post(detect_image))
        .route("/detect/video", post(detect_video))
        .route("/detect/audio", post(detect_audio))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Origins from configuration plus the server's own address
fn allowed_origins(config: &AppConfig) -> Vec<HeaderValue> {
    let own = [
        format!("http://{}:{}", config.server.host, config.server.port),
        format!("http://localhost:{}", config.server.port),
    ];

    let mut origins: Vec<HeaderValue> = Vec::new();
    for origin in config.server.allowed_origins.iter().map(String::as_str).chain(own.iter().map(String::as_str)) {
        match HeaderValue::from_str(origin.trim_end_matches('/')) {
            Ok(value) if !origins.contains(&value) => origins.push(value),
            Ok(_) => {}
            Err(_) => warn!("Ignoring invalid CORS origin '{}'", origin),
        }
    }
    origins
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(config))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_html.clone())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": BANNER }))
}

// === API Handlers ===

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

async fn detect_text(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<DetectionResult>> {
    let Json(request) = payload.map_err(|e| TruthScanError::Validation(e.body_text()))?;
    Ok(Json(state.service.detect_text(&request.text).await))
}

async fn detect_image(state: State<Arc<AppState>>, multipart: Multipart) -> Result<Json<DetectionResult>> {
    detect_upload(state, MediaKind::Image, multipart).await
}

async fn detect_video(state: State<Arc<AppState>>, multipart: Multipart) -> Result<Json<DetectionResult>> {
    detect_upload(state, MediaKind::Video, multipart).await
}

async fn detect_audio(state: State<Arc<AppState>>, multipart: Multipart) -> Result<Json<DetectionResult>> {
    detect_upload(state, MediaKind::Audio, multipart).await
}

async fn detect_upload(
    State(state): State<Arc<AppState>>,
    kind: MediaKind,
    multipart: Multipart,
) -> Result<Json<DetectionResult>> {
    let max = state.service.limits().max_bytes(kind).unwrap_or(0);
    let upload = read_file_field(multipart, kind, max).await?;
    Ok(Json(state.service.detect_upload(kind, &upload).await?))
}

/// Pull the `file` part out of a multipart form
async fn read_file_field(mut multipart: Multipart, kind: MediaKind, max_bytes: u64) -> Result<Upload> {
    let multipart_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            TruthScanError::TooLarge(format!("File too large. Max size is {}.", media::size_label(max_bytes)))
        } else {
            TruthScanError::Validation(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.bin", kind));
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload::new(bytes, filename, content_type));
    }

    Err(TruthScanError::Validation("Missing form field: file".to_string()))
}

impl IntoResponse for TruthScanError {
    fn into_response(self) -> Response {
        let status = match &self {
            TruthScanError::Validation(_) => StatusCode::BAD_REQUEST,
            TruthScanError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            TruthScanError::UnsupportedMedia(_) | TruthScanError::Media(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// Start the detection API with the given configuration
pub async fn start_server(config: AppConfig) -> Result<()> {
    let service = DetectionService::from_config(&config)?;
    let configured = service.providers().configured();
    if configured.is_empty() {
        warn!("No detection services configured; text and audio use local heuristics only");
    } else {
        info!("Detection services: {}", configured.join(", "));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, service)?);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("TruthScan API and UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_include_own_address() {
        let config = AppConfig::default();
        let origins = allowed_origins(&config);
        assert!(origins.contains(&HeaderValue::from_static("http://localhost:5173")));
        assert!(origins.contains(&HeaderValue::from_static("http://localhost:3000")));
        assert!(origins.contains(&HeaderValue::from_static("http://127.0.0.1:8000")));
        assert!(origins.contains(&HeaderValue::from_static("http://localhost:8000")));
    }

    #[test]
    fn test_duplicate_and_invalid_origins_dropped() {
        let mut config = AppConfig::default();
        config.server.allowed_origins = vec![
            "http://localhost:8000/".to_string(),
            "bad\norigin".to_string(),
        ];
        let origins = allowed_origins(&config);
        assert_eq!(origins.len(), 2);
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |e: TruthScanError| e.into_response().status();
        assert_eq!(status(TruthScanError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(TruthScanError::TooLarge("x".into())), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(status(TruthScanError::UnsupportedMedia("x".into())), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(TruthScanError::Config("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
