//! Record conversion and presentation.
//!
//! # Data Flow
//! ```text
//! FetchResult
//!     → formatter.rs (dispatch on RecordFormat)
//!         structured: markup.rs → JSON
//!         raw:        headers + body passthrough
//!         page:       markup.rs → summary lookup → page.rs
//!     → Response
//! ```

pub mod format;
pub mod formatter;
pub mod markup;
pub mod page;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

pub use format::RecordFormat;
pub use formatter::RecordFormatter;
pub use markup::ConversionFailure;
pub use page::{PageRenderer, RenderError, RenderOptions, SummaryPageRenderer};

use crate::upstream::FetchFailure;

/// Everything that can stop a `/record` request from producing its output.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid format requested: {0:?}")]
    InvalidFormat(String),

    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Conversion(#[from] ConversionFailure),

    #[error("response does not contain a summary record")]
    NotFound,

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl RecordError {
    /// Short label for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            RecordError::InvalidFormat(_) => "invalid_format",
            RecordError::Fetch(failure) => failure.outcome(),
            RecordError::Conversion(_) => "conversion_failed",
            RecordError::NotFound => "not_found",
            RecordError::Render(_) => "render_failed",
        }
    }
}

impl IntoResponse for RecordError {
    fn into_response(self) -> Response {
        match self {
            RecordError::InvalidFormat(_) => {
                (StatusCode::BAD_REQUEST, "Invalid Format Requested").into_response()
            }
            RecordError::Fetch(failure) => failure.into_response(),
            RecordError::Conversion(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upstream response could not be converted",
            )
                .into_response(),
            RecordError::NotFound => {
                (StatusCode::NOT_FOUND, "Metadata Identifier Not Found").into_response()
            }
            RecordError::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Record page could not be rendered",
            )
                .into_response(),
        }
    }
}

/// Part of a qualified name after its prefix (`csw:SummaryRecord` → `SummaryRecord`).
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn child_by_local_name<'a>(value: &'a Value, local_name: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(key, _)| local_part(key) == local_name)
        .map(|(_, child)| child)
}

/// First step: the `GetRecordByIdResponse` wrapper at the document root.
pub fn response_wrapper(document: &Value) -> Option<&Value> {
    child_by_local_name(document, "GetRecordByIdResponse")
}

/// Second step: the `SummaryRecord` inside the wrapper.
pub fn summary_record(wrapper: &Value) -> Option<&Value> {
    child_by_local_name(wrapper, "SummaryRecord")
}

pub fn find_summary_record(document: &Value) -> Option<&Value> {
    response_wrapper(document).and_then(summary_record)
}
