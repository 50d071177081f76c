use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{BoxError, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::appstate::AppState;
use crate::config::AppConfig;
use crate::error::api::ApiError;
use crate::handler::{catalog as catalog_handlers, products as product_handlers};
use crate::state::common::CommonState;

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(
        config: &AppConfig,
        app_state: AppState,
    ) -> anyhow::Result<()> {
        let router = Self::router(app_state, config.http_timeout, config.rps);

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!(
            env = ?config.cargo_env,
            "🚀 Server has launched on http://{addr}"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .context("Server error")?;

        Ok(())
    }

    pub fn router(
        app_state: AppState,
        http_timeout: u64,
        rps: Option<u64>,
    ) -> Router {
        let routes = {
            let common_state = CommonState::new(app_state);

            Router::new()
                .route("/products", get(product_handlers::get_products))
                .route("/categories", get(catalog_handlers::get_categories))
                .route(
                    "/supermarkets",
                    get(catalog_handlers::get_supermarkets),
                )
                .with_state(common_state)
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = routes
            .merge(Router::new().route(
                "/health",
                get(|| async { env!("CARGO_PKG_VERSION").to_string() }),
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(HandleErrorLayer::new(move |error: BoxError| {
                        Self::handle_timeout_error(error, http_timeout)
                    }))
                    .timeout(Duration::from_secs(http_timeout))
                    .layer(cors)
                    .layer(BufferLayer::new(4096))
                    .layer(RateLimitLayer::new(
                        rps.filter(|rps| *rps > 0).unwrap_or(u64::MAX),
                        Duration::from_secs(1),
                    )),
            );

        router.fallback(Self::handle_404)
    }

    async fn handle_timeout_error(
        err: BoxError,
        http_timeout: u64,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if err.is::<tower::timeout::error::Elapsed>() {
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({
                    "message":
                        format!(
                            "request took longer than the configured {} second timeout",
                            http_timeout
                        )
                })),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": format!("unhandled internal error: {}", err)
                })),
            )
        }
    }

    /// Resolves on CTRL+C; used for the server's graceful shutdown.
    async fn shutdown_signal() {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::warn!("signal shutdown");
    }

    async fn handle_404() -> impl IntoResponse {
        ApiError::NotFound
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
    use axum::http::{Method, Request};
    use axum::response::Response;
    use serde_json::Value;
    use test_helpers::upstream::{ProductCatalog, TestUpstream, TEST_API_KEY};
    use tower::ServiceExt;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn router_for(base_url: &str) -> Router {
        let app_state =
            AppState::new(base_url, TEST_API_KEY, Duration::from_secs(5))
                .unwrap();
        ApplicationServer::router(app_state, 5, None)
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn products_are_forwarded_with_bearer_token() {
        let upstream = MockServer::start().await;
        let body = json!({
            "data": [],
            "meta": { "total": 0, "total_pages": 0 }
        });
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(query_param("search", "sirene"))
            .and(query_param("supermarket", "lidl"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&upstream)
            .await;

        let response = get(
            router_for(&upstream.uri()),
            "/products?search=sirene&supermarket=lidl&page=2",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert_eq!(json_body(response).await, body);
    }

    #[tokio::test]
    async fn single_product_lookup() {
        let upstream = TestUpstream::start(ProductCatalog::fake(25)).await;

        let response =
            get(router_for(&upstream.base_url()), "/products?id=7").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["id"], "7");
        assert_eq!(body["data"]["name"], "Product 7");
        assert!(body.get("meta").is_none());
    }

    #[tokio::test]
    async fn listing_metadata_is_relayed() {
        let upstream = TestUpstream::start(ProductCatalog::fake(25)).await;

        let response = get(
            router_for(&upstream.base_url()),
            "/products?supermarket=kaufland&page=1",
        )
        .await;

        let body = json_body(response).await;
        let expected = upstream
            .catalog()
            .products()
            .iter()
            .filter(|p| p.supermarket.slug == "kaufland")
            .count();
        assert_eq!(body["meta"]["total"], expected);
        assert_eq!(body["meta"]["total_pages"], 1);
    }

    #[tokio::test]
    async fn upstream_error_body_is_relayed() {
        let upstream = TestUpstream::start(ProductCatalog::fake(3)).await;

        let response =
            get(router_for(&upstream.base_url()), "/products?id=999").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Product not found" })
        );
    }

    #[tokio::test]
    async fn upstream_error_without_body_gets_a_message() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&upstream)
            .await;

        let response = get(router_for(&upstream.uri()), "/categories").await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Failed to fetch categories" })
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_500() {
        let response =
            get(router_for("http://127.0.0.1:1/"), "/supermarkets").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Failed to fetch supermarkets" })
        );
    }

    #[tokio::test]
    async fn categories_and_supermarkets_are_forwarded() {
        let upstream = TestUpstream::start(ProductCatalog::fake(9)).await;
        let router = router_for(&upstream.base_url());

        let categories = json_body(get(router.clone(), "/categories").await).await;
        assert_eq!(categories["data"].as_array().unwrap().len(), 3);

        let supermarkets =
            json_body(get(router, "/supermarkets").await).await;
        assert_eq!(supermarkets["data"][0]["slug"], "billa");

        let requests = upstream.received_requests().await;
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|request| request
            .headers
            .get("authorization")
            .is_some_and(|value| value == "Bearer test-api-key")));
    }

    #[tokio::test]
    async fn wrong_credential_is_passed_through() {
        let upstream = TestUpstream::start(ProductCatalog::fake(3)).await;
        let app_state = AppState::new(
            &upstream.base_url(),
            "wrong-key",
            Duration::from_secs(5),
        )
        .unwrap();
        let router = ApplicationServer::router(app_state, 5, None);

        let response = get(router, "/products").await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Unauthenticated." })
        );
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let router = router_for("http://127.0.0.1:9/");

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/products")
                    .header("origin", "https://brochures.example")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn health_and_unknown_routes() {
        let router = router_for("http://127.0.0.1:9/");

        let health = get(router.clone(), "/health").await;
        assert_eq!(health.status(), StatusCode::OK);
        let version = to_bytes(health.into_body(), usize::MAX).await.unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));

        let missing = get(router, "/brochures").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(missing).await,
            json!({
                "message": "The requested resource does not exist on this server"
            })
        );
    }
}
