use super::types::{ErrorResponse, HealthResponse, RelayResponse};
use crate::{Error, relay::Relay};
use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{
        HeaderValue, Method, StatusCode,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS},
    },
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

pub async fn relay(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return preflight().await;
    }

    // An unreadable body only matters once the method is known to be POST.
    let body = match body {
        Ok(body) => body,
        Err(rejection) if method == Method::POST => {
            let err = Error::bad_input(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ));
            error!("Rejected relay request: {}", err);
            return error_response(&err);
        }
        Err(_) => Bytes::new(),
    };

    info!("Received {} relay request ({} bytes)", method, body.len());

    let outcome = state.relay.handle(&method, &body).await;
    match outcome.result {
        Ok(result) => (
            StatusCode::OK,
            Json(RelayResponse {
                response: result.text,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// CORS preflight. Origin and content type are added by the router layers.
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, OPTIONS"),
            ),
            (
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ),
        ],
    )
        .into_response()
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight().await;
    }
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not Found".to_string(),
        }),
    )
        .into_response()
}

pub fn error_response(err: &Error) -> Response {
    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.outbound_message(),
        }),
    )
        .into_response()
}
