//! `.well-known` OAuth discovery documents.
//!
//! These are placeholders for clients that look for them before
//! connecting. Nothing issues or validates tokens.

use crate::server::transport::MCP_PATH;
use axum::extract::Host;
use axum::http::HeaderMap;
use axum::response::Json;
use serde_json::{json, Value};

fn issuer(host: &str, headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}

pub fn authorization_server_document(issuer: &str) -> Value {
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code"],
        "code_challenge_methods_supported": ["S256"],
    })
}

pub fn protected_resource_document(issuer: &str) -> Value {
    json!({
        "resource": format!("{issuer}{MCP_PATH}"),
        "authorization_servers": [issuer],
        "bearer_methods_supported": ["header"],
    })
}

pub async fn authorization_server_handler(Host(host): Host, headers: HeaderMap) -> Json<Value> {
    Json(authorization_server_document(&issuer(&host, &headers)))
}

pub async fn protected_resource_handler(Host(host): Host, headers: HeaderMap) -> Json<Value> {
    Json(protected_resource_document(&issuer(&host, &headers)))
}
