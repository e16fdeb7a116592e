//! HTTP server for tower conversion.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                        |
//! |--------|----------------|------------------------------------|
//! | GET    | `/health`      | Health check                       |
//! | POST   | `/api/convert` | Upload a CSV, get the document     |
//! | GET    | `/api/logs`    | SSE stream for real-time logs      |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, request_error, ConvertResponse};
use crate::error::{ConvertError, ServerError, ServerResult};
use crate::transform::pipeline::{convert_bytes, ConvertOptions};

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

type ApiError = (StatusCode, Json<Value>);

/// Build the router; conversions use `options`.
pub fn router(options: ConvertOptions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/convert", post(convert_upload))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(Arc::new(options))
}

/// Start the HTTP server
pub async fn start_server(port: u16, options: ConvertOptions) -> ServerResult<()> {
    let app = router(options);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log_info(format!("🚀 Towerdoc server running on http://localhost:{}", port));
    log_info("POST /api/convert - Upload CSV file");
    log_info("GET  /api/logs    - SSE log stream");
    log_info("GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "towerdoc",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn convert_upload(
    State(options): State<Arc<ConvertOptions>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, Json(request_error(&format!("Multipart error: {}", e))))
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        (StatusCode::BAD_REQUEST, Json(request_error(&format!("Read error: {}", e))))
                    })?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data
        .ok_or_else(|| (StatusCode::BAD_REQUEST, Json(request_error("No file provided"))))?;

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    // Each request converts against its own table; the blocking pool keeps
    // large files off the async workers.
    let result = tokio::task::spawn_blocking(move || convert_bytes(&bytes, &options))
        .await
        .map_err(|e| {
            log_error(format!("Conversion task failed: {}", e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(request_error("Conversion task failed")))
        })?
        .map_err(|e| (status_for(&e), Json(error_response(&e))))?;

    Ok(Json(ConvertResponse::new(result, file_name)))
}

fn status_for(err: &ConvertError) -> StatusCode {
    match err {
        ConvertError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConvertError::Source(_) | ConvertError::Row(_) => StatusCode::BAD_REQUEST,
        ConvertError::Json(_) | ConvertError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MissingField, SchemaError, SourceReadError};

    #[test]
    fn test_status_mapping() {
        let schema = ConvertError::Schema(SchemaError::from_missing(vec![MissingField {
            field: "Tower Name".into(),
            suggestion: None,
        }]));
        assert_eq!(status_for(&schema), StatusCode::UNPROCESSABLE_ENTITY);

        let source = ConvertError::Source(SourceReadError::EmptyFile);
        assert_eq!(status_for(&source), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "towerdoc");
    }
}
