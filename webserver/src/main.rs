use std::time::Duration;

use clap::Parser;
use shared::error::{AsConfigError, AsServerError, MainError};
use webserver::app::ApplicationServer;
use webserver::appstate::AppState;
use webserver::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let config = AppConfig::parse();

    config.log.init();

    tracing::info!("version: {}", env!("CARGO_PKG_VERSION"));

    let app_state = AppState::new(
        &config.api_base_url,
        &config.api_key,
        Duration::from_secs(config.http_timeout),
    )
    .into_config_error()?;

    tracing::info!(
        upstream = %app_state.api_base_url(),
        "Proxying catalog requests"
    );

    ApplicationServer::serve(&config, app_state)
        .await
        .into_server_error()
}
