//! Proxy configuration
//!
//! The two secrets are optional at load time and validated on every call, so a
//! deployment with a missing key still answers each request with a JSON 500.

use crate::error::{ProxyError, ProxyResult};
use std::fmt;

/// Environment variable holding the upstream API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable holding the workflow identifier
pub const WORKFLOW_ID_ENV: &str = "CHATKIT_WORKFLOW_ID";
/// Environment variable overriding the upstream base URL
pub const API_BASE_ENV: &str = "CHATKIT_API_BASE";

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

const REDACTED: &str = "***REDACTED***";

/// Server-held configuration for the session proxy
#[derive(Clone)]
pub struct ProxyConfig {
    pub api_key: Option<String>,
    pub workflow_id: Option<String>,
    pub api_base: String,
}

impl ProxyConfig {
    pub fn new(
        api_key: impl Into<String>,
        workflow_id: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            api_key: non_empty(Some(api_key.into())),
            workflow_id: non_empty(Some(workflow_id.into())),
            api_base: api_base.into(),
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = non_empty(lookup(API_BASE_ENV))
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            api_key: non_empty(lookup(API_KEY_ENV)),
            workflow_id: non_empty(lookup(WORKFLOW_ID_ENV)),
            api_base,
        }
    }

    /// Names of the required variables that are not set
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(API_KEY_ENV);
        }
        if self.workflow_id.is_none() {
            missing.push(WORKFLOW_ID_ENV);
        }
        missing
    }

    /// Validated credentials for one invocation
    pub fn credentials(&self) -> ProxyResult<Credentials> {
        match (&self.api_key, &self.workflow_id) {
            (Some(api_key), Some(workflow_id)) => Ok(Credentials {
                api_key: api_key.clone(),
                workflow_id: workflow_id.clone(),
            }),
            _ => Err(ProxyError::Configuration { missing: self.missing_keys() }),
        }
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("workflow_id", &self.workflow_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// The key pair used for a single upstream call
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub workflow_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &REDACTED)
            .field("workflow_id", &self.workflow_id)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
