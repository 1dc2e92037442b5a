//! Sitemap generation from the catalog database.
//!
//! # Data Flow
//! ```text
//! GET /sitemap.xml
//!     → builder.rs (deadline around the store call)
//!     → store.rs (connect, fixed query, discoverable identifiers)
//!     → builder.rs (prolog + one <url> per identifier + close)
//! ```
//!
//! # Design Decisions
//! - Zero rows is a valid, complete document, not an error
//! - Connection and query failures never produce a partial document

pub mod builder;
pub mod store;

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub use builder::SitemapBuilder;
pub use store::{CatalogRow, IdentifierStore, MemoryStore, PostgresStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SitemapError {
    #[error("catalog database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("sitemap query failed: {0}")]
    QueryFailed(String),

    #[error("sitemap query exceeded {0:?}")]
    QueryTimedOut(Duration),
}

impl SitemapError {
    pub fn outcome(&self) -> &'static str {
        match self {
            SitemapError::DatabaseUnavailable(_) => "database_unavailable",
            SitemapError::QueryFailed(_) => "query_failed",
            SitemapError::QueryTimedOut(_) => "timeout",
        }
    }
}

impl IntoResponse for SitemapError {
    fn into_response(self) -> Response {
        match self {
            SitemapError::DatabaseUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Error Connecting to Geoportal Database.",
            )
                .into_response(),
            SitemapError::QueryFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Sitemap query failed").into_response()
            }
            SitemapError::QueryTimedOut(_) => {
                (StatusCode::GATEWAY_TIMEOUT, "Sitemap query timed out").into_response()
            }
        }
    }
}
