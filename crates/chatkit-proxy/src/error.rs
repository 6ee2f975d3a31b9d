//! Proxy error types

use crate::dto::ProxyResponse;
use axum::http::StatusCode;

pub type ProxyResult<T> = Result<T, ProxyError>;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed. Use POST.";
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error: Missing API keys.";
pub const UPSTREAM_MESSAGE: &str =
    "Failed to create a session token. Check server logs for the upstream error.";
pub const FATAL_MESSAGE: &str = "A fatal server error occurred.";

/// Every way a session request can fail.
///
/// The `Display` text is for server logs only; callers see the fixed
/// messages above.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    #[error("Missing configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    #[error("Upstream rejected session request with status {status}: {detail}")]
    UpstreamRejection { status: u16, detail: String },

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Configuration { .. }
            | ProxyError::UpstreamRejection { .. }
            | ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to an untrusted caller
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed { .. } => METHOD_NOT_ALLOWED_MESSAGE,
            ProxyError::Configuration { .. } => CONFIGURATION_MESSAGE,
            ProxyError::UpstreamRejection { .. } => UPSTREAM_MESSAGE,
            ProxyError::Unexpected(_) => FATAL_MESSAGE,
        }
    }

    /// Record the full detail server-side
    pub fn log(&self) {
        match self {
            ProxyError::MethodNotAllowed { method } => {
                tracing::debug!(%method, "rejected non-POST session request");
            }
            ProxyError::Configuration { missing } => {
                tracing::error!(missing = ?missing, "missing critical environment variables");
            }
            ProxyError::UpstreamRejection { status, detail } => {
                tracing::error!(status = *status, detail = %detail, "session API request failed");
            }
            ProxyError::Unexpected(cause) => {
                tracing::error!(cause = %cause, "fatal error while creating session");
            }
        }
    }

    pub fn to_proxy_response(&self) -> ProxyResponse {
        let response = ProxyResponse::error(self.status_code(), self.public_message());
        match self {
            ProxyError::MethodNotAllowed { .. } => response.with_allow("POST"),
            _ => response,
        }
    }
}
