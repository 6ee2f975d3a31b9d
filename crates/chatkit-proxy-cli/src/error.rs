//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Server error: {0}")]
    Serve(#[from] chatkit_proxy::ServeError),

    #[error("Missing configuration: {}", .0.join(", "))]
    MissingConfiguration(Vec<&'static str>),

    #[error("General error: {0}")]
    General(String),
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::General(format!("{:#}", err))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
