//! HTTP router hosting the session endpoint

use crate::{
    error::FATAL_MESSAGE, handler::InboundRequest, middleware::RequestIdLayer, AppState,
    ProxyResponse,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub const DEFAULT_SESSION_PATH: &str = "/api/chatkit/session";

/// Mount the session handler on `path` for every method
///
/// `path` must already be a valid mount path, see [`super::validate_path`].
pub fn create_router(app_state: AppState, path: &str) -> Router {
    Router::new()
        .route(path, any(create_session))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer)
        .with_state(app_state)
}

/// Any method on the session path; the handler owns the 405 answer and
/// reads the body itself
async fn create_session(
    State(app_state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    app_state
        .proxy
        .handle(InboundRequest { method, headers, body })
        .await
        .into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(%detail, "session handler panicked");
    ProxyResponse::error(StatusCode::INTERNAL_SERVER_ERROR, FATAL_MESSAGE).into_response()
}
