//! ChatKit session proxy
//!
//! Accepts a POST from a browser client, creates a ChatKit session upstream
//! with the server-held API key and workflow id, and relays only the
//! short-lived `client_secret` back.

pub mod app_state;
pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod restapi;
pub mod upstream;

// Re-export key types
pub use app_state::AppState;
pub use config::{Credentials, ProxyConfig};
pub use dto::{ParsedBody, ProxyResponse, ResponseBody, ANONYMOUS_USER};
pub use error::{ProxyError, ProxyResult};
pub use handler::{InboundRequest, SessionProxy, MAX_BODY_BYTES};
pub use restapi::{create_router, serve, validate_path, ServeError, DEFAULT_SESSION_PATH};
pub use upstream::{HttpSessionIssuer, SessionIssuer, UpstreamOutcome};
