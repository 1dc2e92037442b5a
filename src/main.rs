//! CSW Record Proxy
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!   GET /record/{id}     │  http::record                                │
//!   ─────────────────────┼─▶ RecordFormat ─▶ upstream::UpstreamFetcher ─┼──▶ CSW catalog
//!                        │                      │                       │    (GetRecordById)
//!                        │                      ▼                       │
//!   ◀────────────────────┼── records::RecordFormatter (json/xml/html)   │
//!                        │                                              │
//!   GET /sitemap.xml     │  http::sitemap                               │
//!   ─────────────────────┼─▶ sitemap::SitemapBuilder ──────────────────┼──▶ Geoportal
//!   ◀────────────────────┼── <urlset> document                         │    PostgreSQL
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use csw_record_proxy::config::loader::load_config;
use csw_record_proxy::lifecycle::{signals, Shutdown};
use csw_record_proxy::observability::{logging, metrics};
use csw_record_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "csw-record-proxy")]
#[command(about = "Serve CSW catalog records as JSON, XML or HTML, plus a sitemap", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "csw-record-proxy.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability);

    tracing::info!("csw-record-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_host = %config.upstream.host,
        upstream_root_path = %config.upstream.root_path,
        database_host = %config.database.host,
        database_name = %config.database.name,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        signal = signals::wait_for_stop_signal() => {
            let signal = signal?;
            tracing::info!(signal, "Stop signal received, draining");
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => {
            tracing::error!("HTTP server exited without a stop signal");
            result??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
