use super::jsonrpc::{InitializeParams, JsonRpcRequest, JsonRpcResponse, Method, RequestId};
use crate::client::{RadioDirectoryClient, RadioSearch};
use crate::tools::{self, ResultFormatter, SearchTool, SEARCH_TOOL_NAME};
use crate::{Config, Error, Result};
use futures::FutureExt;
use rmcp::model::{
    CallToolResult, Implementation, InitializeResult, ListToolsResult, ProtocolVersion,
    ServerCapabilities,
};
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Protocol version advertised regardless of what the client asks for
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::V_2024_11_05;

pub const SERVER_NAME: &str = "radio-search-mcp";

/// Transport-independent MCP request handler
#[derive(Debug, Clone)]
pub struct RadioServerHandler {
    search_tool: SearchTool,
}

impl RadioServerHandler {
    pub fn new(config: &Config) -> Result<Self> {
        let client = RadioDirectoryClient::new(&config.upstream)?;
        Ok(Self::with_backend(Arc::new(client), config))
    }

    /// Build a handler around an arbitrary search backend
    pub fn with_backend(backend: Arc<dyn RadioSearch>, config: &Config) -> Self {
        info!("Initializing radio MCP server handler");
        let formatter = ResultFormatter::new(config.upstream.site_url.clone());
        Self {
            search_tool: SearchTool::new(backend, formatter),
        }
    }

    /// Handle one raw message body. Returns `None` for notifications.
    pub async fn handle_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Rejecting unparseable JSON-RPC body: {}", e);
                return Some(JsonRpcResponse::failure(None, &Error::Parse(e.to_string())));
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                &Error::InvalidRequest(e.to_string()),
            )),
        }
    }

    /// Handle a decoded request. Returns `None` only for `notifications/*`;
    /// other requests without an id are answered with a `null` id.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest {
            method, id, params, ..
        } = request;

        let outcome = match Method::parse(&method, params) {
            Ok(method) => self.dispatch(method).await,
            Err(e) => Err(e),
        };

        respond(id, outcome)
    }

    async fn dispatch(&self, method: Method) -> Result<Option<Value>> {
        match method {
            Method::Initialize(params) => {
                Ok(Some(serde_json::to_value(Self::initialize(&params))?))
            }
            Method::ListTools => {
                let result = ListToolsResult {
                    tools: tools::list_tools().to_vec(),
                    next_cursor: None,
                };
                Ok(Some(serde_json::to_value(result)?))
            }
            Method::CallTool(params) => {
                let result = self.call_tool(params.name.as_deref(), params.arguments).await?;
                Ok(Some(serde_json::to_value(result)?))
            }
            Method::Ping => Ok(Some(json!({}))),
            Method::Notification(name) => {
                debug!("Received notification: {}", name);
                Ok(None)
            }
            Method::Unknown(name) => Err(Error::MethodNotFound(name)),
        }
    }

    fn initialize(params: &InitializeParams) -> InitializeResult {
        if let Some(requested) = &params.protocol_version {
            debug!(
                "Client requested protocol {}, answering with {:?}",
                requested, PROTOCOL_VERSION
            );
        }

        InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: crate::VERSION.into(),
            },
            instructions: None,
        }
    }

    /// Run the search tool; panics inside it are reported as internal errors
    async fn call_tool(
        &self,
        name: Option<&str>,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> Result<CallToolResult> {
        if let Some(name) = name {
            if name != SEARCH_TOOL_NAME {
                return Err(Error::InvalidArgument {
                    field: "name".to_string(),
                    reason: format!("unknown tool '{name}'"),
                });
            }
        }

        let input = SearchTool::parse_arguments(arguments.as_ref())?;
        info!("Tool called: {} query='{}'", SEARCH_TOOL_NAME, input.query);

        AssertUnwindSafe(self.search_tool.search(input))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Error::Internal(panic_message(&*panic))))
    }
}

fn respond(id: Option<RequestId>, outcome: Result<Option<Value>>) -> Option<JsonRpcResponse> {
    match outcome {
        Ok(Some(result)) => Some(JsonRpcResponse::success(id, result)),
        Ok(None) => None,
        Err(e) => {
            warn!("Request failed: {}", e);
            Some(JsonRpcResponse::failure(id, &e))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool handler panicked".to_string())
}
