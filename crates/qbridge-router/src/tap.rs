use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use qbridge_common::TapConfig;

/// How much of a relayed body is kept for the debug-log preview.
const BODY_PREVIEW_BYTES: usize = 500;

/// Headers hyper manages itself or that must not cross the relay.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

#[derive(Clone)]
pub struct TapState {
    pub config: Arc<TapConfig>,
    pub client: wreq::Client,
}

pub fn tap_router(state: TapState) -> Router {
    Router::new().fallback(relay).with_state(state)
}

async fn relay(
    State(state): State<TapState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();
    let url = format!(
        "http://{}:{}{}",
        state.config.upstream_host, state.config.upstream_port, path
    );

    info!(method = %method, path = %path, "inbound request");
    debug!(headers = ?headers, "inbound headers");
    if !body.is_empty() {
        debug!(preview = %preview(&body), "inbound body");
    }

    let upstream_method =
        wreq::Method::from_bytes(method.as_str().as_bytes()).unwrap_or(wreq::Method::GET);
    let mut builder = state.client.request(upstream_method, &url);
    for (name, value) in &headers {
        // The client sets its own Host for the upstream.
        if name == header::HOST {
            continue;
        }
        if let Ok(value) = value.to_str() {
            builder = builder.header(name.as_str(), value);
        }
    }
    if !body.is_empty() {
        builder = builder.body(body);
    }

    let upstream = match builder.send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, url = %url, "upstream request failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Proxy Error").into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    info!(status = %status, "upstream response");
    debug!(headers = ?upstream.headers(), "upstream headers");

    let mut builder = Response::builder().status(status);
    if let Some(response_headers) = builder.headers_mut() {
        for (name, value) in upstream.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_str().as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                response_headers.append(name, value);
            }
        }
    }

    // Stream upstream chunks through as they arrive, teeing a capped copy
    // into the log once the stream ends.
    let (tx, rx) = tokio::sync::mpsc::channel::<Bytes>(16);
    tokio::spawn(async move {
        let mut stream = upstream.bytes_stream();
        let mut captured = Vec::new();
        while let Some(item) = stream.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(_) => break,
            };
            append_capped(&mut captured, chunk.as_ref(), BODY_PREVIEW_BYTES);
            if tx.send(chunk).await.is_err() {
                break;
            }
        }
        if !captured.is_empty() {
            debug!(preview = %String::from_utf8_lossy(&captured), "upstream body");
        }
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    builder
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Proxy Error").into_response())
}

fn preview(body: &Bytes) -> String {
    let end = body.len().min(BODY_PREVIEW_BYTES);
    String::from_utf8_lossy(&body[..end]).into_owned()
}

fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], cap: usize) {
    if buf.len() >= cap {
        return;
    }
    let take = (cap - buf.len()).min(chunk.len());
    buf.extend_from_slice(&chunk[..take]);
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|header| name.eq_ignore_ascii_case(header))
}
