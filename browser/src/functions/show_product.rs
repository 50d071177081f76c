use anyhow::Context;
use shared::client::CatalogClient;

use crate::render;

pub async fn show_product(
    client: &CatalogClient,
    id: &str,
) -> anyhow::Result<String> {
    let product = client
        .product(id)
        .await
        .with_context(|| format!("Failed to load product {}", id))?;

    Ok(render::product_detail(product.as_ref()))
}
