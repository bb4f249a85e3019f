//! yuzu-updater CLI entry point
//!
//! Parses arguments, sets up logging and Ctrl-C handling, runs the update and
//! turns any failure into a colored diagnostic and a stable exit code.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use yuzu_updater::cli;
use yuzu_updater::core::error::{exit_code_for, user_friendly_error};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    cli.init_logging();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current chunk or file");
            on_interrupt.cancel();
        }
    });

    match cli.execute(cancel).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let code = exit_code_for(&e);
            user_friendly_error(e).display();
            std::process::exit(code);
        }
    }
}
