//! Wire types for the inbound endpoint and the upstream sessions API

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Identifier used when the caller does not supply one.
/// Every such request maps onto the same anonymous upstream user.
pub const ANONYMOUS_USER: &str = "anonymous-user";

/// Optional JSON body sent by the browser client
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionRequestBody {
    #[serde(default, rename = "userId", alias = "deviceId")]
    pub user_id: Option<String>,
}

/// Why the inbound body could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    EmptyBody,
    Malformed(String),
}

/// Outcome of reading the inbound body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedBody {
    Parsed(SessionRequestBody),
    FallbackUsed(FallbackReason),
}

impl ParsedBody {
    pub fn parse(raw: Option<&[u8]>) -> Self {
        let raw = match raw {
            Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
            _ => return ParsedBody::FallbackUsed(FallbackReason::EmptyBody),
        };

        let value = match serde_json::from_slice::<serde_json::Value>(raw) {
            Ok(value @ serde_json::Value::Object(_)) => value,
            Ok(_) => {
                return ParsedBody::FallbackUsed(FallbackReason::Malformed(
                    "expected a JSON object".to_string(),
                ))
            }
            Err(e) => return ParsedBody::FallbackUsed(FallbackReason::Malformed(e.to_string())),
        };

        match serde_json::from_value::<SessionRequestBody>(value) {
            Ok(body) => ParsedBody::Parsed(body),
            Err(e) => ParsedBody::FallbackUsed(FallbackReason::Malformed(e.to_string())),
        }
    }

    /// Caller identifier if one was supplied and non-empty
    pub fn caller_id(&self) -> Option<&str> {
        match self {
            ParsedBody::Parsed(body) => body.user_id.as_deref().filter(|id| !id.is_empty()),
            ParsedBody::FallbackUsed(_) => None,
        }
    }

    /// Identifier forwarded upstream
    pub fn user_reference(&self) -> &str {
        self.caller_id().unwrap_or(ANONYMOUS_USER)
    }
}

/// Workflow the session is created against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRef {
    pub id: String,
}

/// Body of `POST /v1/chatkit/sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub workflow: WorkflowRef,
    pub user: String,
}

impl CreateSessionRequest {
    pub fn new(workflow_id: impl Into<String>, user: impl Into<String>) -> Self {
        Self { workflow: WorkflowRef { id: workflow_id.into() }, user: user.into() }
    }
}

/// The only field of the upstream session we read
#[derive(Deserialize)]
pub struct CreateSessionResponse {
    pub client_secret: String,
}

/// JSON payload returned to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    ClientSecret { client_secret: String },
    Error { error: String },
}

/// Status plus JSON body produced by the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
    pub allow: Option<&'static str>,
}

impl ProxyResponse {
    pub fn client_secret(client_secret: String) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::ClientSecret { client_secret },
            allow: None,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, body: ResponseBody::Error { error: message.into() }, allow: None }
    }

    pub fn with_allow(mut self, methods: &'static str) -> Self {
        self.allow = Some(methods);
        self
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(allow) = self.allow {
            response.headers_mut().insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &[u8]) -> ParsedBody {
        ParsedBody::parse(Some(raw))
    }

    #[test]
    fn reads_user_id() {
        let parsed = parse(br#"{"userId":"abc123"}"#);
        assert_eq!(
            parsed,
            ParsedBody::Parsed(SessionRequestBody { user_id: Some("abc123".into()) })
        );
        assert_eq!(parsed.user_reference(), "abc123");
    }

    #[test]
    fn accepts_device_id_spelling() {
        let parsed = parse(br#"{"deviceId":"dev-9","extra":true}"#);
        assert_eq!(parsed.user_reference(), "dev-9");
    }

    #[test]
    fn missing_or_empty_identifier_uses_anonymous_user() {
        assert_eq!(parse(b"{}").user_reference(), ANONYMOUS_USER);
        assert_eq!(parse(br#"{"userId":""}"#).user_reference(), ANONYMOUS_USER);
        assert_eq!(
            parse(br#"{"userId":null}"#).user_reference(),
            ANONYMOUS_USER
        );
    }

    #[test]
    fn empty_body_is_a_fallback() {
        assert_eq!(ParsedBody::parse(None), ParsedBody::FallbackUsed(FallbackReason::EmptyBody));
        assert_eq!(
            parse(b"  \n"),
            ParsedBody::FallbackUsed(FallbackReason::EmptyBody)
        );
    }

    #[test]
    fn non_object_bodies_are_malformed() {
        let cases: [&[u8]; 5] =
            [b"not json", b"null", b"[1,2]", br#"["abc"]"#, br#"{"userId":42}"#];
        for raw in cases {
            let parsed = parse(raw);
            assert!(
                matches!(parsed, ParsedBody::FallbackUsed(FallbackReason::Malformed(_))),
                "{:?} should be malformed",
                String::from_utf8_lossy(raw)
            );
            assert_eq!(parsed.user_reference(), ANONYMOUS_USER);
        }
    }

    #[test]
    fn session_request_uses_nested_workflow_and_bare_user() {
        let request = CreateSessionRequest::new("wf_1", "abc123");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"workflow": {"id": "wf_1"}, "user": "abc123"})
        );
    }

    #[test]
    fn response_bodies_have_single_key() {
        let ok = ResponseBody::ClientSecret { client_secret: "cs_1".into() };
        let err = ResponseBody::Error { error: "nope".into() };
        assert_eq!(serde_json::to_value(ok).unwrap(), json!({"client_secret": "cs_1"}));
        assert_eq!(serde_json::to_value(err).unwrap(), json!({"error": "nope"}));
    }
}
