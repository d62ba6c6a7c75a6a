use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use tracing::{debug, warn};

use qbridge_common::{BridgeConfig, RelayError};
use qbridge_transform::normalize;

use crate::client::classify_error;

#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<BridgeConfig>,
    pub client: wreq::Client,
    pub started_at: Instant,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    bridge: &'static str,
    target: String,
    uptime: f64,
}

pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state)
}

async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        bridge: "qbridge",
        target: state.config.target_url.clone(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

async fn list_models(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    let url = format!("{}/models", state.config.target_url);
    let authorization = header_or_empty(&headers, header::AUTHORIZATION);

    match relay_models(&state.client, &url, &authorization).await {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(err) => {
            warn!(error = %err, url = %url, "models relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch models"})),
            )
                .into_response()
        }
    }
}

async fn chat_completions(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Unparseable or empty bodies normalize as absent input; the
    // normalizer is total and always yields a valid outbound request.
    let inbound: Option<JsonValue> = serde_json::from_slice(&body).ok();
    let outbound = normalize(inbound.as_ref());
    debug!(body = %outbound, "normalized chat request");

    let url = format!("{}/chat/completions", state.config.target_url);
    let authorization = header_or_empty(&headers, header::AUTHORIZATION);
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    match relay_chat(&state.client, &url, &authorization, &accept, &outbound).await {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(err) => {
            warn!(error = %err, url = %url, "chat relay failed");
            let payload = json!({
                "error": {
                    "message": format!("Bridge error: {err}"),
                    "type": "bridge_error",
                }
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

async fn relay_models(
    client: &wreq::Client,
    url: &str,
    authorization: &str,
) -> Result<(StatusCode, JsonValue), RelayError> {
    let response = client
        .request(wreq::Method::GET, url)
        .header(header::AUTHORIZATION.as_str(), authorization)
        .send()
        .await
        .map_err(transport)?;

    decode_json(response).await
}

async fn relay_chat(
    client: &wreq::Client,
    url: &str,
    authorization: &str,
    accept: &str,
    body: &JsonValue,
) -> Result<(StatusCode, JsonValue), RelayError> {
    let payload = serde_json::to_vec(body).map_err(|err| RelayError::Transport(err.to_string()))?;

    let response = client
        .request(wreq::Method::POST, url)
        .header(header::CONTENT_TYPE.as_str(), "application/json")
        .header(header::AUTHORIZATION.as_str(), authorization)
        .header(header::ACCEPT.as_str(), accept)
        .body(payload)
        .send()
        .await
        .map_err(transport)?;

    decode_json(response).await
}

/// Relay the downstream status verbatim together with its JSON body.
async fn decode_json(response: wreq::Response) -> Result<(StatusCode, JsonValue), RelayError> {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.bytes().await.map_err(transport)?;
    let body = serde_json::from_slice(&bytes).map_err(|err| RelayError::Decode(err.to_string()))?;
    Ok((status, body))
}

fn transport(err: wreq::Error) -> RelayError {
    debug!(kind = classify_error(&err), "downstream transport error");
    RelayError::Transport(err.to_string())
}

fn header_or_empty(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(&name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}
