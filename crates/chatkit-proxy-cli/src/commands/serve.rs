//! Session endpoint server command

use crate::error::CliResult;
use chatkit_proxy::{AppState, ProxyConfig, DEFAULT_SESSION_PATH};
use clap::Args;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host and port to bind to
    #[arg(long, env = "CHATKIT_PROXY_ADDR", default_value = "127.0.0.1:8888")]
    pub addr: String,

    /// Path the session endpoint is mounted on
    #[arg(long, env = "CHATKIT_PROXY_PATH", default_value = DEFAULT_SESSION_PATH)]
    pub path: String,
}

/// Execute the serve command
pub async fn execute(args: ServeArgs) -> CliResult<()> {
    let config = ProxyConfig::from_env();

    let missing = config.missing_keys();
    if !missing.is_empty() {
        // Keep serving: each request answers with a configuration error until fixed.
        tracing::warn!(missing = ?missing, "required configuration is missing");
    }

    let app_state = AppState::from_config(config);
    chatkit_proxy::serve(app_state, &args.addr, &args.path).await?;

    Ok(())
}
