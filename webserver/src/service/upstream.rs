use axum::body::Bytes;
use serde_json::Value;
use strum_macros::{AsRefStr, Display};

use crate::appstate::AppState;
use crate::error::upstream::UpstreamError;

/// Upstream collections exposed through the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Products,
    Categories,
    Supermarkets,
}

#[derive(Clone)]
pub struct UpstreamService {
    app_state: AppState,
}

impl UpstreamService {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Sends `GET {base}{resource}?{query}` with the bearer credential and
    /// returns the body of a successful response untouched.
    pub async fn forward(
        &self,
        resource: Resource,
        query: Option<String>,
    ) -> Result<Bytes, UpstreamError> {
        let mut url = self
            .app_state
            .api_base_url()
            .join(resource.as_ref())
            .map_err(|e| UpstreamError::Unreachable {
                resource,
                reason: e.to_string(),
            })?;
        url.set_query(query.as_deref().filter(|query| !query.is_empty()));

        tracing::info!(
            %resource,
            query = query.as_deref().unwrap_or_default(),
            "Forwarding request upstream"
        );

        let response = self
            .app_state
            .client()
            .get(url)
            .bearer_auth(self.app_state.api_key())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%resource, reason = %e, "Upstream unreachable");
                UpstreamError::Unreachable {
                    resource,
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            UpstreamError::Unreachable {
                resource,
                reason: e.to_string(),
            }
        })?;

        if !status.is_success() {
            tracing::warn!(
                %resource,
                status = status.as_u16(),
                "Upstream request failed"
            );
            return Err(UpstreamError::Status {
                resource,
                status: status.as_u16(),
                body: serde_json::from_slice::<Value>(&body).ok(),
            });
        }

        Ok(body)
    }
}
