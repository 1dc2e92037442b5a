//! Shared utilities for integration tests.
//!
//! Mock upstreams speak raw HTTP/1.1 over TCP so tests control every byte,
//! including bodies that end before their declared length.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

use csw_record_proxy::config::ProxyConfig;
use csw_record_proxy::records::SummaryPageRenderer;
use csw_record_proxy::sitemap::MemoryStore;
use csw_record_proxy::HttpServer;

pub const CATALOG_PATH: &str = "/geoportal/csw";

/// Catalog answer carrying one summary record titled "Foo".
pub const SUMMARY_RESPONSE: &str = concat!(
    "<csw:GetRecordByIdResponse xmlns:csw=\"http://www.opengis.net/cat/csw/2.0.2\" ",
    "xmlns:dc=\"http://purl.org/dc/elements/1.1/\">",
    "<csw:SummaryRecord><dc:identifier>urn:abc/123</dc:identifier>",
    "<dc:title>Foo</dc:title></csw:SummaryRecord>",
    "</csw:GetRecordByIdResponse>"
);

/// Catalog answer with no record inside.
pub const EMPTY_RESPONSE: &str =
    "<csw:GetRecordByIdResponse xmlns:csw=\"http://www.opengis.net/cat/csw/2.0.2\"/>";

/// A running mock upstream and what it has seen.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request targets received so far, in arrival order.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

/// Start a backend that answers every request with `status`, the extra
/// `headers` and `body`.
pub async fn start_backend(
    status: u16,
    headers: &'static [(&'static str, &'static str)],
    body: &'static str,
) -> MockBackend {
    start_backend_with(move |_| {
        let mut response = format!("HTTP/1.1 {} {}\r\n", status, reason(status));
        for (name, value) in headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        response.into_bytes()
    })
    .await
}

/// Start a backend that announces `declared_len` body bytes, sends only
/// `body`, then closes the connection.
pub async fn start_truncated_backend(declared_len: usize, body: &'static str) -> MockBackend {
    assert!(declared_len > body.len());
    start_backend_with(move |_| {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: {}\r\n\r\n{}",
            declared_len, body
        )
        .into_bytes()
    })
    .await
}

/// Start a backend that sends `chunks` with chunked transfer encoding.
pub async fn start_chunked_backend(chunks: &'static [&'static str]) -> MockBackend {
    start_backend_with(move |_| {
        let mut response = String::from(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        );
        for chunk in chunks {
            response.push_str(&format!("{:x}\r\n{}\r\n", chunk.len(), chunk));
        }
        response.push_str("0\r\n\r\n");
        response.into_bytes()
    })
    .await
}

/// Start a backend that answers every request with `body` as XML.
pub async fn start_xml_backend(body: String) -> MockBackend {
    start_backend_with(move |_| {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .into_bytes()
    })
    .await
}

/// Start a backend whose raw response bytes are produced per request target.
pub async fn start_backend_with<F>(respond: F) -> MockBackend
where
    F: Fn(&str) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = MockBackend {
        addr: listener.local_addr().unwrap(),
        hits: Arc::new(AtomicUsize::new(0)),
        paths: Arc::new(Mutex::new(Vec::new())),
    };

    let respond = Arc::new(respond);
    let seen = backend.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let respond = respond.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                let Some(target) = read_request_target(&mut socket).await else {
                    return;
                };
                seen.hits.fetch_add(1, Ordering::SeqCst);
                seen.paths.lock().unwrap().push(target.clone());

                let _ = socket.write_all(&respond(&target)).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    backend
}

/// An address with nothing listening on it.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Read the request head and return its target (path and query).
async fn read_request_target(socket: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }
    let head = String::from_utf8_lossy(&head);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Config pointing the proxy at `upstream` with short deadlines.
pub fn config_for(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.host = upstream.ip().to_string();
    config.upstream.port = upstream.port();
    config.upstream.root_path = CATALOG_PATH.to_string();
    config.database.host = "127.0.0.1".to_string();
    config.database.name = "geoportal".to_string();
    config.timeouts.upstream_secs = 2;
    config.timeouts.query_secs = 1;
    config.timeouts.connect_secs = 1;
    config
}

/// Proxy router backed by `store` and the built-in page renderer.
pub fn proxy(config: ProxyConfig, store: MemoryStore) -> Router {
    HttpServer::with_components(config, Arc::new(store), Arc::new(SummaryPageRenderer)).router()
}

/// Issue one GET against `router`.
pub async fn get(router: Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

/// Serve `router` on a real socket.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// One HTTP/1.1 GET over a fresh connection. Returns the lowercased response
/// head and the bytes that follow it on the wire.
pub async fn wire_get(addr: SocketAddr, target: &str) -> (String, Vec<u8>) {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target, addr
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    socket.read_to_end(&mut raw).await.unwrap();
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head");
    let head = String::from_utf8_lossy(&raw[..split]).to_lowercase();
    (head, raw[split + 4..].to_vec())
}
