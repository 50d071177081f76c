use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::listing::ListingQuery;
use crate::product::{Category, Envelope, Product, Supermarket};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog url: {0}")]
    InvalidUrl(String),
    #[error("Catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Catalog responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid catalog response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Source of product listings, implemented over HTTP by [`CatalogClient`].
#[async_trait]
pub trait ProductSource: Send + Sync + 'static {
    async fn fetch_products(
        &self,
        query: &ListingQuery,
    ) -> Result<Envelope<Vec<Product>>, CatalogError>;
}

pub fn build_client(timeout: Duration) -> Result<Client, CatalogError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(CatalogError::Transport)
}

/// Parses a base url and makes sure it ends with a slash so that relative
/// resource paths are appended instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, CatalogError> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized)
        .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Client for the catalog proxy. Every call is a single attempt.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            http: build_client(DEFAULT_TIMEOUT)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn products(
        &self,
        query: &ListingQuery,
    ) -> Result<Envelope<Vec<Product>>, CatalogError> {
        self.get("products", &query.to_params()).await
    }

    /// Looks up a single product. A missing product is `Ok(None)`, whether
    /// the upstream answers with `404` or with empty `data`.
    pub async fn product(
        &self,
        id: &str,
    ) -> Result<Option<Product>, CatalogError> {
        let response = self
            .get::<Envelope<Option<Product>>>(
                "products",
                &[("id", id.to_owned())],
            )
            .await;

        match response {
            Ok(envelope) => Ok(envelope.data),
            Err(CatalogError::Status { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.get::<Envelope<Vec<Category>>>("categories", &[])
            .await
            .map(|envelope| envelope.data)
    }

    pub async fn supermarkets(&self) -> Result<Vec<Supermarket>, CatalogError> {
        self.get::<Envelope<Vec<Supermarket>>>("supermarkets", &[])
            .await
            .map(|envelope| envelope.data)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        tracing::debug!(%url, ?params, "Requesting catalog");

        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(CatalogError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                });

            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(CatalogError::Decode)
    }
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn fetch_products(
        &self,
        query: &ListingQuery,
    ) -> Result<Envelope<Vec<Product>>, CatalogError> {
        self.products(query).await
    }
}
