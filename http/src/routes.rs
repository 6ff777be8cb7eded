//! HTTP routes for the receipt notification transformer.
//!
//! Every failure is answered with a JSON body of the form
//! `{"error": {"code": ..., "message": ...}}`. Notifications that are valid
//! JSON but do not match the expected shape get a `422`, bodies that are
//! not JSON at all get a `400`.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sesmap_utils::{first_record, transform_record, OutboundEvent, TransformError};
use tracing::{info, instrument, warn};

/// Builds the service router, limiting request bodies to `max_body_bytes`.
pub fn router(max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/transform", post(transform_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

async fn index_handler() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found_handler(uri: Uri) -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No route for {}", uri.path()),
    )
}

#[instrument(name = "sesmap.transform", skip(payload))]
async fn transform_handler(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OutboundEvent>, HttpError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected unreadable request body");
        HttpError::from(rejection)
    })?;

    match first_record(&body).and_then(transform_record) {
        Ok(event) => {
            info!(
                emisor = %event.emisor,
                recipients = event.receptor.len(),
                delayed = event.retrasado,
                "Transformed receipt notification"
            );
            Ok(Json(event))
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Rejected receipt notification");
            Err(e.into())
        }
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl From<TransformError> for HttpError {
    fn from(value: TransformError) -> Self {
        HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, value.kind(), value.to_string())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(value: JsonRejection) -> Self {
        match value.status() {
            StatusCode::PAYLOAD_TOO_LARGE => HttpError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                value.body_text(),
            ),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => HttpError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                value.body_text(),
            ),
            _ => HttpError::new(StatusCode::BAD_REQUEST, "invalid_json", value.body_text()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}
