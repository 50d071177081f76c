use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum_macros::debug_handler;

use crate::error::api::ApiError;
use crate::response::proxy::ProxyResponse;
use crate::service::upstream::Resource;
use crate::state::common::CommonState;

#[debug_handler]
pub async fn get_categories(
    _headers: HeaderMap,
    RawQuery(query): RawQuery,
    State(state): State<CommonState>,
) -> Result<ProxyResponse, ApiError> {
    let body = state
        .upstream_service
        .forward(Resource::Categories, query)
        .await?;

    Ok(ProxyResponse(body))
}

#[debug_handler]
pub async fn get_supermarkets(
    _headers: HeaderMap,
    RawQuery(query): RawQuery,
    State(state): State<CommonState>,
) -> Result<ProxyResponse, ApiError> {
    let body = state
        .upstream_service
        .forward(Resource::Supermarkets, query)
        .await?;

    Ok(ProxyResponse(body))
}
