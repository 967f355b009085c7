use axum::http::StatusCode;
use rmcp::model::{ErrorCode, ErrorData};
use thiserror::Error;

/// Implementation-defined server error, used for upstream and internal failures
pub const SERVER_ERROR: ErrorCode = ErrorCode(-32000);

/// Error taxonomy for the protocol bridge and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (permanent failures)
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    // Request-shaped errors
    #[error("Invalid argument: {field} - {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // Upstream errors
    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    UpstreamMalformed(String),

    // Catch-all
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Shorthand for a missing or empty `query` argument
    pub fn missing_query() -> Self {
        Self::InvalidArgument {
            field: "query".to_string(),
            reason: "a non-empty search query is required".to_string(),
        }
    }

    /// JSON-RPC error code this error is reported with
    pub const fn rpc_code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::INVALID_PARAMS,
            Self::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            Self::InvalidRequest(_) => ErrorCode::INVALID_REQUEST,
            Self::Parse(_) => ErrorCode::PARSE_ERROR,
            Self::Config(_)
            | Self::Io(_)
            | Self::Serde(_)
            | Self::UpstreamUnavailable(_)
            | Self::UpstreamMalformed(_)
            | Self::Internal(_)
            | Self::Service(_) => SERVER_ERROR,
        }
    }

    /// HTTP status the request/response transport answers with
    pub fn http_status(&self) -> StatusCode {
        status_for_code(self.rpc_code())
    }
}

/// Map a JSON-RPC error code onto the POST transport status
pub fn status_for_code(code: ErrorCode) -> StatusCode {
    if code == ErrorCode::METHOD_NOT_FOUND {
        StatusCode::NOT_FOUND
    } else if [
        ErrorCode::INVALID_PARAMS,
        ErrorCode::INVALID_REQUEST,
        ErrorCode::PARSE_ERROR,
    ]
    .contains(&code)
    {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<&Error> for ErrorData {
    fn from(err: &Error) -> Self {
        Self::new(err.rpc_code(), err.to_string(), None)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
