//! # Chimera Panel Entry Point
//!
//! Parses the command line, checks that the project root contains
//! `index.html`, switches into the project root and runs the control panel
//! server until Ctrl+C.
//!
//! ## Example Usage
//!
//! ```bash
//! # Serve the current directory on localhost:8008
//! cargo run
//!
//! # Another port, and open the browser once running
//! cargo run -- --port 8009 --open
//!
//! # Serve a project living elsewhere, reachable from the LAN
//! cargo run -- --root ../chimera --host 0.0.0.0
//! ```
//!
//! Log levels can be controlled through the `RUST_LOG` environment variable.

use chimera_panel::config::{Cli, ServerConfig};
use chimera_panel::error::Result;
use chimera_panel::server;
use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match launch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn launch(cli: Cli) -> Result<()> {
    let config = ServerConfig::from_cli(cli)?;

    // Relative paths used by the frontend resolve against the project root.
    std::env::set_current_dir(config.project_root())?;
    tracing::debug!("Working directory set to {}", config.project_root().display());

    let cancel_token = CancellationToken::new();
    tokio::spawn(server::cancel_on_interrupt(cancel_token.clone()));

    tracing::info!("Starting Chimera control panel");
    server::run(config, cancel_token).await?;

    tracing::info!("Chimera control panel shutting down");
    Ok(())
}
