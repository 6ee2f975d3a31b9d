//! Application state shared by the HTTP adapter

use crate::{config::ProxyConfig, handler::SessionProxy, upstream::HttpSessionIssuer};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub proxy: SessionProxy,
}

impl AppState {
    pub fn new(proxy: SessionProxy) -> Self {
        Self { proxy }
    }

    /// Wire the HTTP issuer against the configured API base
    pub fn from_config(config: ProxyConfig) -> Self {
        let issuer = Arc::new(HttpSessionIssuer::new(&config.api_base));
        tracing::info!(endpoint = %issuer.endpoint(), "upstream sessions endpoint");
        Self::new(SessionProxy::new(Arc::new(config), issuer))
    }
}
