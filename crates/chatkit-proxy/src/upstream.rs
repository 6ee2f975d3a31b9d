//! Upstream session creation
//!
//! One POST per call, no retry, and the client's default timeouts.

use crate::config::Credentials;
use crate::dto::{CreateSessionRequest, CreateSessionResponse};
use async_trait::async_trait;

pub const SESSIONS_PATH: &str = "/v1/chatkit/sessions";
pub const BETA_HEADER: &str = "OpenAI-Beta";
pub const BETA_HEADER_VALUE: &str = "chatkit_beta=v1";

/// Result of a single upstream attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// Upstream issued a session; carries its client secret
    Success(String),
    /// Upstream answered with a non-2xx status
    UpstreamError { status: u16, detail: String },
    /// The call failed or the answer could not be read
    TransportError(String),
}

/// Something that can mint a session for a user
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    async fn create_session(
        &self,
        credentials: &Credentials,
        request: &CreateSessionRequest,
    ) -> UpstreamOutcome;
}

/// Issues sessions against the HTTP sessions API
#[derive(Debug, Clone)]
pub struct HttpSessionIssuer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSessionIssuer {
    pub fn new(api_base: &str) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    pub fn with_client(client: reqwest::Client, api_base: &str) -> Self {
        let endpoint = format!("{}{}", api_base.trim_end_matches('/'), SESSIONS_PATH);
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SessionIssuer for HttpSessionIssuer {
    async fn create_session(
        &self,
        credentials: &Credentials,
        request: &CreateSessionRequest,
    ) -> UpstreamOutcome {
        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&credentials.api_key)
            .header(BETA_HEADER, BETA_HEADER_VALUE)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return UpstreamOutcome::TransportError(format!("request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return UpstreamOutcome::UpstreamError { status: status.as_u16(), detail };
        }

        match response.json::<CreateSessionResponse>().await {
            Ok(session) => UpstreamOutcome::Success(session.client_secret),
            Err(e) => UpstreamOutcome::TransportError(format!("invalid session response: {}", e)),
        }
    }
}
