mod check;
mod cli;
mod error;
mod server;
mod tools;

use std::sync::Arc;

use clap::Parser;
use rmcp::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unimux_core::TargetRegistry;

use crate::cli::{Cli, Command, LogFormat};
use crate::error::ServerError;
use crate::server::UnimuxServer;

#[tokio::main]
async fn main() {
    // A missing .env is fine; targets may come from the config file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.log_format);

    if let Err(err) = run(cli).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

/// Logs go to stderr: stdout carries the MCP stdio transport.
fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let targets = unimux_config::load_targets(cli.global.config.as_deref())?;
    let registry = Arc::new(TargetRegistry::new(targets)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(registry).await,
        Command::Check => check::run(&registry, &mut std::io::stdout()).await,
    }
}

async fn serve(registry: Arc<TargetRegistry>) -> Result<(), ServerError> {
    info!(targets = registry.targets().len(), "starting MCP server on stdio");

    let service = UnimuxServer::new(registry)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    tokio::select! {
        quit = service.waiting() => {
            let reason = quit.map_err(|e| ServerError::Transport(e.to_string()))?;
            info!(?reason, "MCP session ended");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
        }
    }
    Ok(())
}
