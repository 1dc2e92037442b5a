//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, fetcher, sitemap builder produce:
//!     → logging.rs (structured log events, request ID as a field)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
