//! `GET /record/{identifier}?f={format}`

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::records::{RecordError, RecordFormat};
use crate::upstream::get_record_by_id_path;

#[derive(Debug, Default, Deserialize)]
pub struct RecordParams {
    /// Requested output format; absent means page.
    pub f: Option<String>,
}

/// Fetch one record from the catalog and re-serve it in the requested format.
///
/// The identifier arrives percent-decoded from the path and is encoded again
/// exactly once for the upstream query.
pub async fn get_record(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Query(params): Query<RecordParams>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let response = match fetch_and_render(&state, &identifier, params.f.as_deref()).await {
        Ok((format, response)) => {
            tracing::info!(
                request_id = %request_id,
                identifier = %identifier,
                format = %format,
                status = %response.status(),
                "Record served"
            );
            response
        }
        Err(err) => {
            match &err {
                RecordError::InvalidFormat(_) | RecordError::NotFound => tracing::warn!(
                    request_id = %request_id,
                    identifier = %identifier,
                    outcome = err.outcome(),
                    error = %err,
                    "Record request rejected"
                ),
                _ => tracing::error!(
                    request_id = %request_id,
                    identifier = %identifier,
                    outcome = err.outcome(),
                    error = %err,
                    "Record request failed"
                ),
            }
            err.into_response()
        }
    };

    metrics::record_request("record", response.status().as_u16(), start);
    response
}

async fn fetch_and_render(
    state: &AppState,
    identifier: &str,
    format_param: Option<&str>,
) -> Result<(RecordFormat, Response), RecordError> {
    // Format is validated before any upstream I/O.
    let format = RecordFormat::from_param(format_param)?;
    let path = get_record_by_id_path(&state.config.upstream.root_path, identifier);
    let fetched = state.fetcher.fetch(&path).await?;
    let response = state.formatter.render(format, fetched)?;
    Ok((format, response))
}
