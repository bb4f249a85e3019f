//! The update command: run the workflow and report the result.

use crate::config::UpdaterConfig;
use crate::fetcher::{ProcessInspector, Transport};
use crate::utils::progress::ProgressBar;
use crate::version::VersionProbe;
use crate::workflow::{UpdateWorkflow, WorkflowOutcome};
use anyhow::Result;
use colored::Colorize;
use tokio_util::sync::CancellationToken;

/// Behaviour switches for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOptions {
    /// Resolve and decide only
    pub check_only: bool,
    /// Hide the download progress bar
    pub no_progress: bool,
    /// Print nothing on success
    pub quiet: bool,
}

/// Run the workflow with the given capabilities and print the outcome.
pub async fn execute<T, I, P>(
    config: &UpdaterConfig,
    transport: &T,
    processes: &I,
    probe: &P,
    options: UpdateOptions,
    cancel: CancellationToken,
) -> Result<()>
where
    T: Transport + ?Sized,
    I: ProcessInspector + ?Sized,
    P: VersionProbe + ?Sized,
{
    let workflow = UpdateWorkflow::new(config, transport, processes, probe, cancel);

    if !options.quiet {
        println!("{}", "Checking for updates...".cyan());
    }

    let outcome = if options.check_only {
        let spinner = ProgressBar::spinner(options.no_progress || options.quiet, "Resolving versions");
        let result = workflow.check().await;
        spinner.finish_and_clear();
        result?
    } else {
        let bar = ProgressBar::download(options.no_progress || options.quiet);
        bar.set_message("Downloading");
        let reporter = bar.clone();

        let result = workflow
            .run(move |progress| {
                if let Some(total) = progress.total {
                    reporter.set_length(total);
                }
                reporter.set_position(progress.downloaded);
                if progress.total == Some(progress.downloaded) && progress.downloaded > 0 {
                    reporter.set_message("Installing");
                }
            })
            .await;
        bar.finish_and_clear();
        result?
    };

    if !options.quiet {
        print_outcome(&outcome, options.check_only);
    }
    Ok(())
}

fn print_outcome(outcome: &WorkflowOutcome, check_only: bool) {
    match outcome {
        WorkflowOutcome::UpToDate {
            version,
        } => {
            println!("{}", format!("yuzu is up to date (build {version})").green());
        }
        WorkflowOutcome::UpdateAvailable {
            from,
            to,
        } => {
            println!("{}", format!("Update available: {from} -> {to}").green());
            if check_only {
                println!("Run `yuzu-updater` without --check to install it");
            }
        }
        WorkflowOutcome::Updated {
            from,
            to,
            asset,
        } => {
            println!("{}", format!("Updated yuzu from build {from} to {to}").green().bold());
            println!("Installed {}", asset.dimmed());
        }
    }
}
