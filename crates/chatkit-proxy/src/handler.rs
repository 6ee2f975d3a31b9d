//! Session token proxy pipeline
//!
//! method gate -> configuration -> body -> identifier -> upstream -> response.
//! Every exit is a JSON body; failure detail goes to the log only.

use crate::config::ProxyConfig;
use crate::dto::{CreateSessionRequest, FallbackReason, ParsedBody, ProxyResponse};
use crate::error::{ProxyError, ProxyResult};
use crate::upstream::{SessionIssuer, UpstreamOutcome};
use axum::body::{self, Body};
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest request body read before falling back to the anonymous user
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Inbound call as seen by the handler
///
/// The body is left unread so a rejected method never pays for buffering it.
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Body,
}

impl InboundRequest {
    pub fn new(method: Method, body: Option<Bytes>) -> Self {
        let body = body.map(Body::from).unwrap_or_else(Body::empty);
        Self { method, headers: HeaderMap::new(), body }
    }

    pub fn post_json(body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, Some(body.into()))
    }
}

/// Exchanges server-held credentials for a short-lived client secret
#[derive(Clone)]
pub struct SessionProxy {
    config: Arc<ProxyConfig>,
    issuer: Arc<dyn SessionIssuer>,
}

impl SessionProxy {
    pub fn new(config: Arc<ProxyConfig>, issuer: Arc<dyn SessionIssuer>) -> Self {
        Self { config, issuer }
    }

    pub async fn handle(&self, request: InboundRequest) -> ProxyResponse {
        match self.issue_client_secret(request).await {
            Ok(client_secret) => ProxyResponse::client_secret(client_secret),
            Err(err) => {
                err.log();
                err.to_proxy_response()
            }
        }
    }

    async fn issue_client_secret(&self, request: InboundRequest) -> ProxyResult<String> {
        if request.method != Method::POST {
            return Err(ProxyError::MethodNotAllowed { method: request.method.to_string() });
        }

        let credentials = self.config.credentials()?;

        let parsed = match body::to_bytes(request.body, MAX_BODY_BYTES).await {
            Ok(bytes) => ParsedBody::parse(Some(&bytes[..])),
            Err(err) => ParsedBody::FallbackUsed(FallbackReason::Malformed(format!(
                "unreadable body: {}",
                err
            ))),
        };
        match &parsed {
            ParsedBody::Parsed(_) => {}
            ParsedBody::FallbackUsed(FallbackReason::EmptyBody) => {
                debug!("no request body, using anonymous user");
            }
            ParsedBody::FallbackUsed(FallbackReason::Malformed(reason)) => {
                warn!(%reason, "ignoring malformed request body");
            }
        }
        let user = parsed.user_reference();
        debug!(caller_supplied = parsed.caller_id().is_some(), "resolved session user");

        let session_request = CreateSessionRequest::new(&credentials.workflow_id, user);
        match self.issuer.create_session(&credentials, &session_request).await {
            UpstreamOutcome::Success(client_secret) => {
                info!(token_len = client_secret.len(), "created client secret");
                Ok(client_secret)
            }
            UpstreamOutcome::UpstreamError { status, detail } => {
                Err(ProxyError::UpstreamRejection { status, detail })
            }
            UpstreamOutcome::TransportError(cause) => Err(ProxyError::Unexpected(cause)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, DEFAULT_API_BASE};
    use crate::dto::{ResponseBody, ANONYMOUS_USER};
    use crate::error::{CONFIGURATION_MESSAGE, FATAL_MESSAGE, UPSTREAM_MESSAGE};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    /// Replays a fixed outcome and records what it was asked for
    struct RecordingIssuer {
        outcome: UpstreamOutcome,
        calls: Mutex<Vec<CreateSessionRequest>>,
    }

    impl RecordingIssuer {
        fn new(outcome: UpstreamOutcome) -> Arc<Self> {
            Arc::new(Self { outcome, calls: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> Vec<CreateSessionRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionIssuer for RecordingIssuer {
        async fn create_session(
            &self,
            _credentials: &Credentials,
            request: &CreateSessionRequest,
        ) -> UpstreamOutcome {
            self.calls.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    fn proxy(config: ProxyConfig, issuer: Arc<RecordingIssuer>) -> SessionProxy {
        SessionProxy::new(Arc::new(config), issuer)
    }

    fn configured() -> ProxyConfig {
        ProxyConfig::new("sk-test", "wf_1", DEFAULT_API_BASE)
    }

    fn error_of(response: &ProxyResponse) -> &str {
        match &response.body {
            ResponseBody::Error { error } => error,
            other => panic!("expected error body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_post_methods_are_rejected_before_anything_else() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("cs".into()));
        let proxy = proxy(ProxyConfig::from_lookup(|_| None), issuer.clone());

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS] {
            let response = proxy.handle(InboundRequest::new(method, None)).await;
            assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(error_of(&response), "Method Not Allowed. Use POST.");
        }
        assert!(issuer.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_configuration_never_calls_upstream() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("cs".into()));
        let config = ProxyConfig { workflow_id: None, ..configured() };
        let proxy = proxy(config, issuer.clone());

        let response = proxy.handle(InboundRequest::post_json(r#"{"userId":"abc123"}"#)).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(&response), CONFIGURATION_MESSAGE);
        assert!(issuer.calls().is_empty());
    }

    #[tokio::test]
    async fn forwards_caller_identifier_and_returns_client_secret() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("sk_test_1".into()));
        let proxy = proxy(configured(), issuer.clone());

        let response = proxy.handle(InboundRequest::post_json(r#"{"userId":"abc123"}"#)).await;

        assert_eq!(response, ProxyResponse::client_secret("sk_test_1".into()));
        assert_eq!(issuer.calls(), vec![CreateSessionRequest::new("wf_1", "abc123")]);
    }

    #[tokio::test]
    async fn empty_or_garbage_body_falls_back_to_anonymous_user() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("cs".into()));
        let proxy = proxy(configured(), issuer.clone());

        let empty = proxy.handle(InboundRequest::new(Method::POST, None)).await;
        let garbage = proxy.handle(InboundRequest::post_json("{not json")).await;

        assert_eq!(empty.status, StatusCode::OK);
        assert_eq!(garbage.status, StatusCode::OK);
        let users: Vec<String> = issuer.calls().into_iter().map(|c| c.user).collect();
        assert_eq!(users, vec![ANONYMOUS_USER.to_string(), ANONYMOUS_USER.to_string()]);
    }

    #[tokio::test]
    async fn oversized_body_falls_back_to_anonymous_user() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("cs".into()));
        let proxy = proxy(configured(), issuer.clone());
        let oversized = format!(r#"{{"userId":"{}"}}"#, "u".repeat(MAX_BODY_BYTES));

        let response = proxy.handle(InboundRequest::post_json(oversized)).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(issuer.calls(), vec![CreateSessionRequest::new("wf_1", ANONYMOUS_USER)]);
    }

    #[tokio::test]
    async fn rejected_method_ignores_oversized_body() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("cs".into()));
        let proxy = proxy(configured(), issuer.clone());
        let body = Bytes::from(vec![b' '; MAX_BODY_BYTES * 4]);

        let response = proxy.handle(InboundRequest::new(Method::GET, Some(body))).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(issuer.calls().is_empty());
    }

    #[tokio::test]
    async fn upstream_rejection_is_hidden_from_caller() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::UpstreamError {
            status: 401,
            detail: r#"{"error":"invalid_api_key"}"#.into(),
        });
        let proxy = proxy(configured(), issuer);

        let response = proxy.handle(InboundRequest::post_json("{}")).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(&response), UPSTREAM_MESSAGE);
        assert!(!error_of(&response).contains("invalid_api_key"));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_fatal_error() {
        let issuer =
            RecordingIssuer::new(UpstreamOutcome::TransportError("connection refused".into()));
        let proxy = proxy(configured(), issuer);

        let response = proxy.handle(InboundRequest::post_json("{}")).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(&response), FATAL_MESSAGE);
    }

    #[tokio::test]
    async fn repeated_calls_give_the_same_shape() {
        let issuer = RecordingIssuer::new(UpstreamOutcome::Success("cs".into()));
        let proxy = proxy(configured(), issuer.clone());

        let first = proxy.handle(InboundRequest::post_json(r#"{"userId":"u"}"#)).await;
        let second = proxy.handle(InboundRequest::post_json(r#"{"userId":"u"}"#)).await;

        assert_eq!(first, second);
        assert_eq!(issuer.calls().len(), 2);
    }
}
