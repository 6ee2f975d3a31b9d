//! HTTP hosting for the session handler

pub mod router;

pub use router::{create_router, DEFAULT_SESSION_PATH};

use crate::AppState;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid mount path '{0}': expected a literal path starting with '/'")]
    InvalidPath(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Check that `path` can be mounted as a single literal route
pub fn validate_path(path: &str) -> Result<(), ServeError> {
    let literal = path.starts_with('/')
        && path.split('/').all(|segment| !segment.starts_with([':', '*']));
    if literal {
        Ok(())
    } else {
        Err(ServeError::InvalidPath(path.to_string()))
    }
}

/// Serve the session endpoint on `addr`
pub async fn serve(app_state: AppState, addr: &str, path: &str) -> Result<(), ServeError> {
    validate_path(path)?;
    let app = create_router(app_state, path);

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ServeError::InvalidAddress(format!("{}: {}", addr, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;

    tracing::info!(%addr, %path, "session proxy listening");
    axum::serve(listener, app).await?;

    Ok(())
}
