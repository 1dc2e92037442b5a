//! `GET /sitemap.xml`

use std::time::Instant;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn get_sitemap(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let response = match state.sitemap.build().await {
        Ok(sitemap) => {
            tracing::info!(request_id = %request_id, entries = sitemap.entries, "Sitemap served");
            metrics::record_sitemap_entries(sitemap.entries);
            ([(header::CONTENT_TYPE, "application/xml")], sitemap.document).into_response()
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                outcome = err.outcome(),
                error = %err,
                "Sitemap unavailable"
            );
            err.into_response()
        }
    };

    metrics::record_request("sitemap", response.status().as_u16(), start);
    response
}
