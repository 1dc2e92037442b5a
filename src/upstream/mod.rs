//! Upstream catalog (CSW) access.
//!
//! # Data Flow
//! ```text
//! identifier
//!     → query.rs (encode once, build GetRecordById path)
//!     → fetcher.rs (GET, stream body into a per-request buffer)
//!     → FetchResult | FetchFailure
//! ```
//!
//! # Design Decisions
//! - Headers and body are only handed out together, after end-of-body
//! - A connection that closes mid-body is a failure, never a short success
//! - Each fetch owns its buffer; nothing is shared between requests

pub mod fetcher;
pub mod query;

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

pub use fetcher::UpstreamFetcher;
pub use query::{encode_component, get_record_by_id_path};

/// A complete upstream response.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Status the catalog answered with. Logged, not interpreted.
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchResult {
    /// Build a successful result, mostly useful to exercise formatters directly.
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers,
            body: body.into(),
        }
    }
}

/// Why an upstream fetch produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    /// Connection-level failure before any response arrived.
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    /// Headers arrived but the connection closed before end-of-body.
    #[error("upstream closed the connection after {received} body bytes")]
    TerminatedEarly { received: usize },

    /// The fetch did not finish before its deadline.
    #[error("upstream fetch exceeded {0:?}")]
    TimedOut(Duration),

    /// The configured host/path did not form a valid request URI.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
}

impl FetchFailure {
    /// Short label for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            FetchFailure::Unreachable(_) => "unreachable",
            FetchFailure::TerminatedEarly { .. } => "terminated",
            FetchFailure::TimedOut(_) => "timeout",
            FetchFailure::InvalidRequest(_) => "invalid_request",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FetchFailure::Unreachable(_) | FetchFailure::TerminatedEarly { .. } => {
                StatusCode::BAD_GATEWAY
            }
            FetchFailure::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            FetchFailure::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients; low-level detail stays in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            FetchFailure::Unreachable(_) => "Upstream catalog service could not be reached",
            FetchFailure::TerminatedEarly { .. } => "The request did not complete correctly",
            FetchFailure::TimedOut(_) => "Upstream catalog service timed out",
            FetchFailure::InvalidRequest(_) => "Upstream request could not be built",
        }
    }
}

impl IntoResponse for FetchFailure {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}
