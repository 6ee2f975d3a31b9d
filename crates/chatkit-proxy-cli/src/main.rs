//! ChatKit session proxy CLI entry point

use chatkit_proxy_cli::{
    cli::{Cli, Commands},
    commands::DoctorCommand,
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("chatkit-proxy v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { args } => chatkit_proxy_cli::commands::serve::execute(args).await,
        Commands::Doctor => DoctorCommand::run(),
    }
}
