//! Web layer
//!
//! Wires the catalog, the stream resolver and the guide aggregator into an
//! axum router. Guide and stream routes sit behind their own response cache
//! policy; listings and health are rendered per request.

use anyhow::Result;
use axum::{
    Router,
    http::HeaderMap,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{
    catalog::Catalog,
    config::Config,
    errors::AppResult,
    proxy::EpgAggregator,
    sources::{StreamMarkers, StreamResolver},
    utils::{HttpFetcher, StandardHttpClient, UrlUtils},
};

pub mod cache;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routes;

pub use cache::{CachePolicy, ResponseCache};
pub use responses::ApiResponse;
pub use routes::RouteTable;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub routes: Arc<RouteTable>,
    pub resolver: Arc<StreamResolver>,
    pub epg: Arc<EpgAggregator>,
    pub cache: ResponseCache,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> AppResult<Self> {
        let client: Arc<dyn HttpFetcher> = Arc::new(StandardHttpClient::new(&config.http)?);
        Self::with_fetcher(config, catalog, client)
    }

    /// Build state around an existing upstream client
    pub fn with_fetcher(
        config: Config,
        catalog: Catalog,
        client: Arc<dyn HttpFetcher>,
    ) -> AppResult<Self> {
        let routes = RouteTable::build(&catalog)?;
        let resolver = StreamResolver::new(client.clone(), StreamMarkers::from(&config.resolver));
        let epg = EpgAggregator::new(client, &config.epg);
        let cache = ResponseCache::new(config.cache.max_entries);

        info!(
            channels = catalog.len(),
            stream_routes = routes.len(),
            "Application state initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            routes: Arc::new(routes),
            resolver: Arc::new(resolver),
            epg: Arc::new(epg),
            cache,
            start_time: Instant::now(),
        })
    }

    /// Base URL for links in listings: configured value, else the request's host
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        match &self.config.web.base_url {
            Some(base_url) => base_url.trim_end_matches('/').to_string(),
            None => UrlUtils::request_base_url(headers),
        }
    }

    fn cache_policy(&self, ttl: Duration) -> CachePolicy {
        CachePolicy::new(self.cache.clone(), ttl)
    }
}

/// Build the application router
pub fn create_app(state: AppState) -> Router {
    let guide_routes = Router::new()
        .route("/epg", get(handlers::epg::default_guide))
        .route("/epg/{region}", get(handlers::epg::region_guide))
        .route_layer(from_fn_with_state(
            state.cache_policy(state.config.cache.epg_ttl),
            cache::cache_response,
        ));

    let stream_routes = Router::new()
        .route("/channel/{route_name}", get(handlers::stream::redirect_to_stream))
        .route_layer(from_fn_with_state(
            state.cache_policy(state.config.cache.stream_ttl),
            cache::cache_response,
        ));

    Router::new()
        .route("/channels", get(handlers::channels::list_default_channels))
        .route("/channels/{region}", get(handlers::channels::list_region_channels))
        .route("/health", get(handlers::health::health_check))
        .merge(guide_routes)
        .merge(stream_routes)
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_logging_middleware))
        .with_state(state)
}

/// HTTP server bound to the configured address
pub struct WebServer {
    app: Router,
    addr: String,
}

impl WebServer {
    pub fn new(config: &Config, state: AppState) -> Self {
        Self {
            app: create_app(state),
            addr: format!("{}:{}", config.web.host, config.web.port),
        }
    }

    /// Serve until SIGTERM or SIGINT
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, draining in-flight requests
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr.as_str())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;

        info!(addr = %self.addr, "Web server listening");
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Web server stopped");
        Ok(())
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to install signal handlers, waiting for Ctrl+C");
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received Ctrl+C, shutting down gracefully");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down gracefully");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{SourceError, SourceResult};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use tower::ServiceExt;

    struct OfflineUpstream;

    #[async_trait]
    impl HttpFetcher for OfflineUpstream {
        async fn fetch_text(&self, url: &str) -> SourceResult<String> {
            Err(SourceError::Request {
                url: url.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    fn app() -> Router {
        let state = AppState::with_fetcher(
            Config::default(),
            Catalog::embedded().unwrap(),
            Arc::new(OfflineUpstream),
        )
        .unwrap();
        create_app(state)
    }

    async fn send(app: Router, method: Method, uri: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ORIGIN, "http://player.example.com")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = send(app(), Method::GET, "/playlist.m3u").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_only_accepts_get() {
        let response = send(app(), Method::POST, "/channels").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let response = send(app(), Method::GET, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn test_offline_upstream_is_bad_gateway() {
        let response = send(app(), Method::GET, "/channel/lbc-international").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(!response.headers().contains_key(header::CACHE_CONTROL));
    }

    #[tokio::test]
    async fn test_guide_routes_serve_xmltv() {
        for uri in ["/epg", "/epg/us"] {
            let response = send(app(), Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");
        }
    }

    #[tokio::test]
    async fn test_guide_without_programmes_gets_short_cache_lifetime() {
        let response = send(app(), Method::GET, "/epg/eu").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=60"
        );
    }

    #[test]
    fn test_base_url_prefers_configuration() {
        let mut config = Config::default();
        config.web.base_url = Some("https://tv.example.com/".to_string());
        let state = AppState::with_fetcher(
            config,
            Catalog::embedded().unwrap(),
            Arc::new(OfflineUpstream),
        )
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "ignored.local".parse().unwrap());
        assert_eq!(state.base_url(&headers), "https://tv.example.com");
    }
}
