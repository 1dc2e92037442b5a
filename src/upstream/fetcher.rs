//! Streaming GET against the catalog service.
//!
//! # Responsibilities
//! - Issue one GET per attempt to the configured host and port
//! - Append body frames to a per-request buffer in arrival order
//! - Tell "closed mid-body" apart from "unreachable" and "timed out"

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, Uri};
use futures_util::StreamExt;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{RetryConfig, TimeoutConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::resilience::{with_deadline, DeadlineExceeded, RetryPolicy};
use crate::upstream::{FetchFailure, FetchResult};

const USER_AGENT: &str = concat!("csw-record-proxy/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one upstream catalog.
#[derive(Clone)]
pub struct UpstreamFetcher {
    client: Client<HttpConnector, Body>,
    host: String,
    port: u16,
    deadline: Duration,
    retry: RetryPolicy,
}

impl UpstreamFetcher {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig, retries: &RetryConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            host: upstream.host.clone(),
            port: upstream.port,
            deadline: Duration::from_secs(timeouts.upstream_secs),
            retry: RetryPolicy::from(retries),
        }
    }

    /// Fetch `path` (already carrying its encoded query) from the catalog.
    ///
    /// Succeeds only once the upstream has signalled end-of-body.
    pub async fn fetch(&self, path: &str) -> Result<FetchResult, FetchFailure> {
        let start = Instant::now();
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            match with_deadline(self.deadline, self.fetch_once(path)).await {
                Ok(Ok(result)) => break Ok(result),
                Ok(Err(failure)) if self.retry.should_retry(attempt, &failure) => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::info!(
                        attempt,
                        delay = ?delay,
                        error = %failure,
                        "Retrying upstream fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(Err(failure)) => break Err(failure),
                Err(DeadlineExceeded(deadline)) => break Err(FetchFailure::TimedOut(deadline)),
            }
        };

        match &outcome {
            Ok(result) => {
                tracing::debug!(
                    host = %self.host,
                    status = %result.status,
                    bytes = result.body.len(),
                    attempts = attempt,
                    "Upstream fetch complete"
                );
                metrics::record_upstream_fetch("ok", result.body.len(), start);
            }
            Err(failure) => {
                tracing::warn!(
                    host = %self.host,
                    attempts = attempt,
                    error = %failure,
                    "Upstream fetch failed"
                );
                metrics::record_upstream_fetch(failure.outcome(), 0, start);
            }
        }

        outcome
    }

    async fn fetch_once(&self, path: &str) -> Result<FetchResult, FetchFailure> {
        let uri: Uri = format!("http://{}:{}{}", self.host, self.port, path)
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| FetchFailure::InvalidRequest(e.to_string()))?;

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
            .map_err(|e| FetchFailure::InvalidRequest(e.to_string()))?;

        let response: axum::http::Response<Incoming> = self
            .client
            .request(request)
            .await
            .map_err(|e| FetchFailure::Unreachable(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let mut buffer: Vec<u8> = Vec::new();
        let mut frames = Body::new(body).into_data_stream();

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                Err(e) => {
                    tracing::debug!(received = buffer.len(), error = %e, "Upstream body interrupted");
                    return Err(FetchFailure::TerminatedEarly {
                        received: buffer.len(),
                    });
                }
            }
        }

        Ok(FetchResult {
            status: parts.status,
            headers: parts.headers,
            body: Bytes::from(buffer),
        })
    }
}
