use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::upstream::UpstreamError;
use crate::response::api::ApiErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    UpstreamError(#[from] UpstreamError),
    #[error("The requested resource does not exist on this server")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::UpstreamError(error) => error.into_response(),
            ApiError::NotFound => ApiErrorResponse::send(
                StatusCode::NOT_FOUND.as_u16(),
                Some(message),
            ),
        }
    }
}
