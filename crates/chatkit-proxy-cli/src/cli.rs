//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chatkit-proxy",
    about = "ChatKit session proxy - mints client secrets without exposing the API key",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Log at debug level unless RUST_LOG is set")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the session endpoint over HTTP
    Serve {
        #[command(flatten)]
        args: crate::commands::ServeArgs,
    },
    /// Report which required configuration keys are set
    Doctor,
}
