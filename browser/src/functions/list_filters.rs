use anyhow::Context;
use shared::client::CatalogClient;

use crate::render;

pub async fn list_categories(client: &CatalogClient) -> anyhow::Result<String> {
    let categories = client
        .categories()
        .await
        .context("Failed to load categories")?;

    Ok(render::categories(&categories))
}

pub async fn list_supermarkets(
    client: &CatalogClient,
) -> anyhow::Result<String> {
    let supermarkets = client
        .supermarkets()
        .await
        .context("Failed to load supermarkets")?;

    Ok(render::supermarkets(&supermarkets))
}
