use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum_macros::debug_handler;

use crate::error::api::ApiError;
use crate::response::proxy::ProxyResponse;
use crate::service::upstream::Resource;
use crate::state::common::CommonState;

/// Product listing, or a single product when called with `?id=`. Query
/// parameters are forwarded as received.
#[debug_handler]
pub async fn get_products(
    _headers: HeaderMap,
    RawQuery(query): RawQuery,
    State(state): State<CommonState>,
) -> Result<ProxyResponse, ApiError> {
    let body = state
        .upstream_service
        .forward(Resource::Products, query)
        .await?;

    Ok(ProxyResponse(body))
}
