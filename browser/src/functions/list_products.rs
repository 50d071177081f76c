use shared::client::CatalogClient;
use shared::session::ListingView;

use crate::config::ListArgs;
use crate::render;

pub async fn list_products(
    client: &CatalogClient,
    args: &ListArgs,
) -> anyhow::Result<String> {
    let query = args.to_state()?.query();

    let view = match client.products(&query).await {
        Ok(envelope) => ListingView::from_envelope(envelope, query.page),
        Err(error) => {
            tracing::error!(%error, "Failed to load products");
            ListingView::failed()
        }
    };

    Ok(render::listing(&view))
}
