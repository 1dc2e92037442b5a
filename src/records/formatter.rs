//! Format-specific response dispatch.
//!
//! # Responsibilities
//! - structured: convert the whole document, no shape check
//! - raw: upstream end-to-end headers, then upstream body untouched
//! - page: require `GetRecordByIdResponse → SummaryRecord`, render that subtree

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::records::markup;
use crate::records::page::{PageRenderer, RenderOptions};
use crate::records::{find_summary_record, RecordError, RecordFormat};
use crate::upstream::FetchResult;

/// Consumes one [`FetchResult`] and produces the client response.
#[derive(Clone)]
pub struct RecordFormatter {
    renderer: Arc<dyn PageRenderer>,
}

impl RecordFormatter {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    pub fn render(&self, format: RecordFormat, fetched: FetchResult) -> Result<Response, RecordError> {
        match format {
            RecordFormat::Structured => self.render_structured(fetched),
            RecordFormat::Raw => Ok(self.render_raw(fetched)),
            RecordFormat::Page => self.render_page(fetched),
        }
    }

    pub fn render_structured(&self, fetched: FetchResult) -> Result<Response, RecordError> {
        let document = markup::parse_bytes(&fetched.body)?;
        Ok(Json(document).into_response())
    }

    pub fn render_raw(&self, fetched: FetchResult) -> Response {
        let FetchResult {
            mut headers, body, ..
        } = fetched;
        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(Body::empty());
        // Extending with an owned map keeps repeated header values.
        response.headers_mut().extend(headers);
        *response.body_mut() = Body::from(body);
        response
    }

    pub fn render_page(&self, fetched: FetchResult) -> Result<Response, RecordError> {
        let document = markup::parse_bytes(&fetched.body)?;
        let record = find_summary_record(&document).ok_or(RecordError::NotFound)?;
        let html = self.renderer.render(record, RenderOptions { layout: false })?;
        Ok(Html(html).into_response())
    }
}

/// Headers that belong to the upstream connection and its body framing.
/// The outgoing response is framed again from the buffered body.
const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::CONTENT_LENGTH,
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
