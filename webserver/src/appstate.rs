use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use shared::client::{build_client, parse_base_url};

/// Upstream connection shared by every request: one pooled http client, the
/// API base url and the bearer credential.
#[derive(Clone)]
pub struct AppState {
    client: Client,
    api_base_url: Url,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(
        api_base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client =
            build_client(timeout).context("Failed to build upstream client")?;
        let api_base_url = parse_base_url(api_base_url)
            .context("Invalid upstream api base url")?;

        Ok(Self {
            client,
            api_base_url,
            api_key: Arc::from(api_key),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
