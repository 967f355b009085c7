//! HTTP transports for the MCP bridge.
//!
//! `GET /mcp` opens an SSE stream whose first `endpoint` event tells the
//! client where to POST; responses to those POSTs are pushed as `message`
//! events. `POST /mcp` without a session is plain request/response.

use super::connections::{ConnectionId, ConnectionRegistry, PushError};
use super::handler::RadioServerHandler;
use super::jsonrpc::JsonRpcResponse;
use crate::error::status_for_code;
use crate::{Config, Error};
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRef, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{future, stream, Stream, StreamExt};
use rmcp::model::JsonRpcVersion2_0;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path both transports are mounted on
pub const MCP_PATH: &str = "/mcp";

/// Shared state of all HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub handler: Arc<RadioServerHandler>,
    pub connections: ConnectionRegistry,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for ConnectionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.connections.clone()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<ConnectionId>,
}

/// Whether a client should be told to use POST instead of SSE
pub fn needs_post_fallback(user_agent: &str, patterns: &[String]) -> bool {
    let user_agent = user_agent.to_lowercase();
    patterns
        .iter()
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| user_agent.contains(&pattern.to_lowercase()))
}

/// `GET /mcp`: open a streaming channel, or answer with the POST fallback message
pub async fn sse_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if needs_post_fallback(user_agent, &state.config.streaming.fallback_user_agents) {
        info!("SSE refused for user agent '{}', sending POST fallback", user_agent);
        return Json(json!({
            "jsonrpc": JsonRpcVersion2_0,
            "result": {
                "message": "SSE not supported on this client. Send JSON-RPC requests with POST /mcp instead."
            }
        }))
        .into_response();
    }

    let keep_alive = Duration::from_secs(state.config.streaming.keep_alive_secs);
    Sse::new(open_stream(&state.connections))
        .keep_alive(KeepAlive::new().interval(keep_alive))
        .into_response()
}

/// Register a connection and build its event stream. The registry entry is
/// removed when the stream is dropped.
fn open_stream(
    connections: &ConnectionRegistry,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send + 'static {
    let (guard, receiver) = connections.open();
    info!("SSE connection opened: {}", guard.id());

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{MCP_PATH}?sessionId={}", guard.id()));

    let messages = receiver.map(move |message| {
        debug!("Pushing response over SSE connection {}", guard.id());
        Event::default().event("message").json_data(message)
    });

    stream::once(future::ready(Ok(endpoint))).chain(messages)
}

/// `POST /mcp`: request/response, or delivery into an open SSE session
pub async fn post_handler(
    State(state): State<AppState>,
    session: Result<Query<SessionQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let session = match session {
        Ok(Query(session)) => session,
        Err(rejection) => {
            warn!("Rejecting POST with unreadable query string: {}", rejection);
            let error = Error::InvalidRequest(rejection.body_text());
            return json_response(JsonRpcResponse::failure(None, &error));
        }
    };

    match session.session_id {
        Some(id) => deliver_to_session(state, id, body),
        None => match state.handler.handle_message(&body).await {
            Some(response) => json_response(response),
            None => StatusCode::ACCEPTED.into_response(),
        },
    }
}

fn deliver_to_session(state: AppState, id: ConnectionId, body: Bytes) -> Response {
    if !state.connections.contains(id) {
        warn!("POST for unknown SSE session {}", id);
        let error = Error::InvalidRequest(PushError::UnknownSession(id).to_string());
        return (
            StatusCode::NOT_FOUND,
            Json(JsonRpcResponse::failure(None, &error)),
        )
            .into_response();
    }

    // The response travels over the SSE stream; if that stream is gone by
    // the time it is ready, it is dropped.
    tokio::spawn(async move {
        if let Some(response) = state.handler.handle_message(&body).await {
            if let Err(e) = state.connections.push(id, response) {
                debug!("Discarding response: {}", e);
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}

fn json_response(response: JsonRpcResponse) -> Response {
    let status = response
        .error_code()
        .map_or(StatusCode::OK, status_for_code);
    (status, Json(response)).into_response()
}
