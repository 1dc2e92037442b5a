//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Build per-process collaborators (upstream client, formatter, sitemap store)
//! - Serve until the shutdown signal fires

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::{record, sitemap};
use crate::records::{PageRenderer, RecordFormatter, SummaryPageRenderer};
use crate::sitemap::{IdentifierStore, PostgresStore, SitemapBuilder};
use crate::upstream::UpstreamFetcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub fetcher: UpstreamFetcher,
    pub formatter: RecordFormatter,
    pub sitemap: SitemapBuilder,
}

/// HTTP server for the record proxy.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a server backed by the configured PostgreSQL store and the
    /// built-in page renderer.
    pub fn new(config: ProxyConfig) -> Self {
        let store = Arc::new(PostgresStore::new(
            &config.database,
            Duration::from_secs(config.timeouts.connect_secs),
        ));
        Self::with_components(config, store, Arc::new(SummaryPageRenderer))
    }

    /// Create a server with explicit collaborators.
    pub fn with_components(
        config: ProxyConfig,
        store: Arc<dyn IdentifierStore>,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        let fetcher = UpstreamFetcher::new(&config.upstream, &config.timeouts, &config.retries);
        let sitemap = SitemapBuilder::new(store, &config.sitemap, &config.timeouts);

        let state = AppState {
            config: Arc::new(config),
            fetcher,
            formatter: RecordFormatter::new(renderer),
            sitemap,
        };
        Self { state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let config = &self.state.config;

        let router = Router::new()
            .route("/record/{*identifier}", get(record::get_record))
            .route("/sitemap.xml", get(sitemap::get_sitemap))
            .route("/health", get(health));

        let router = match &config.listener.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router,
        };

        router.with_state(self.state.clone()).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_host = %self.state.config.upstream.host,
            upstream_port = self.state.config.upstream.port,
            "HTTP server starting"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }
}

async fn health() -> &'static str {
    "ok"
}
