//! Request ID middleware
//!
//! Reuses a caller-supplied `x-request-id` when it is short and printable,
//! otherwise mints one. The id is echoed on the response and attached to a
//! tracing span so every log line of the invocation can be correlated.

use axum::{
    http::{HeaderValue, Request},
    response::Response,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Layer that adds request IDs
#[derive(Clone)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service that adds request IDs
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let existing = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .filter(|v| v.len() <= MAX_REQUEST_ID_LEN)
            .and_then(|v| v.to_str().ok().map(|s| (s.to_string(), v.clone())))
            .filter(|(s, _)| !s.is_empty());

        let (request_id, header_value) = match existing {
            Some((id, value)) => (id, Some(value)),
            None => {
                let id = Uuid::new_v4().to_string();
                match HeaderValue::from_str(&id) {
                    Ok(value) => {
                        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
                        (id, Some(value))
                    }
                    Err(_) => (id, None),
                }
            }
        };

        req.extensions_mut().insert(RequestId(request_id.clone()));

        let span = tracing::info_span!("session_request", request_id = %request_id);
        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let mut response = inner.call(req).await?;
                if let Some(value) = header_value {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Request ID extractor
#[derive(Clone, Debug)]
pub struct RequestId(pub String);
