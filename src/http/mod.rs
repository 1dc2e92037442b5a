//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → record.rs  (/record/{id}: fetch upstream, format)
//!     → sitemap.rs (/sitemap.xml: query store, render document)
//!     → Send to client
//! ```

pub mod record;
pub mod request;
pub mod server;
pub mod sitemap;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
