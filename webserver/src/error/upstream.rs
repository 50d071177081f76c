use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use thiserror::Error;

use crate::response::api::ApiErrorResponse;
use crate::service::upstream::Resource;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream {resource} responded with status {status}")]
    Status {
        resource: Resource,
        status: u16,
        body: Option<Value>,
    },
    #[error("Upstream {resource} unreachable: {reason}")]
    Unreachable { resource: Resource, reason: String },
}

impl UpstreamError {
    pub fn failure_message(resource: Resource) -> String {
        format!("Failed to fetch {}", resource)
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        match self {
            UpstreamError::Status {
                resource,
                status,
                body,
            } => {
                let status_code = StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                match body {
                    Some(body) => (status_code, Json(body)).into_response(),
                    None => ApiErrorResponse::send(
                        status_code.as_u16(),
                        Some(Self::failure_message(resource)),
                    ),
                }
            }
            UpstreamError::Unreachable { resource, .. } => {
                ApiErrorResponse::send(
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    Some(Self::failure_message(resource)),
                )
            }
        }
    }
}
