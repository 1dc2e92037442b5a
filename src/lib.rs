//! CSW record proxy library.
//!
//! Relays single catalog records from a CSW `GetRecordById` endpoint as JSON,
//! raw XML or an HTML page, and builds a sitemap from the catalog database.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod records;
pub mod resilience;
pub mod sitemap;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
