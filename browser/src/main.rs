use std::sync::Arc;

use anyhow::Context;
use browser::config::{AppConfig, Command};
use browser::functions;
use clap::Parser;
use shared::client::CatalogClient;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();

    config.log.init();

    let client = CatalogClient::new(&config.proxy_url)
        .context("Invalid proxy url")?;

    tracing::debug!(proxy = %client.base_url(), "Using catalog proxy");

    match &config.command {
        Command::List(args) => {
            let output =
                functions::list_products::list_products(&client, args).await?;
            println!("{}", output);
        }
        Command::Show { id } => {
            let output =
                functions::show_product::show_product(&client, id).await?;
            println!("{}", output);
        }
        Command::Categories => {
            let output =
                functions::list_filters::list_categories(&client).await?;
            println!("{}", output);
        }
        Command::Supermarkets => {
            let output =
                functions::list_filters::list_supermarkets(&client).await?;
            println!("{}", output);
        }
        Command::Interactive => {
            let input = BufReader::new(tokio::io::stdin());
            let mut output = tokio::io::stdout();
            functions::interactive::interactive(
                Arc::new(client),
                input,
                &mut output,
            )
            .await?;
        }
    }

    Ok(())
}
