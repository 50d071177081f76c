use std::time::Duration;

use test_helpers::upstream::{TestUpstream, TEST_API_KEY};
use tokio::net::TcpListener;
use webserver::app::ApplicationServer;
use webserver::appstate::AppState;

/// Serves the proxy in front of `upstream` on an ephemeral port and returns
/// its base url.
pub async fn spawn_proxy(upstream: &TestUpstream) -> String {
    let app_state = AppState::new(
        &upstream.base_url(),
        TEST_API_KEY,
        Duration::from_secs(5),
    )
    .unwrap();
    let router = ApplicationServer::router(app_state, 5, None);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });

    format!("http://{}/", addr)
}
