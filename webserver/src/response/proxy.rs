use axum::body::Bytes;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Successful upstream body, relayed unchanged.
#[derive(Clone, Debug)]
pub struct ProxyResponse(pub Bytes);

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (CONTENT_TYPE, "application/json"),
            ],
            self.0,
        )
            .into_response()
    }
}
