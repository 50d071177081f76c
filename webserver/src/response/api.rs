use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct ApiErrorResponse {
    pub message: String,
}

impl ApiErrorResponse {
    pub fn send(status: u16, message: Option<String>) -> Response {
        let status = StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = message.unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        });

        (status, Json(Self { message })).into_response()
    }
}
