//! postcodenl-downloader
//!
//! Downloads the latest delivery of each postcode.nl subscription account.

use anyhow::{Context, Result};
use clap::Parser;
use postcodenl_data::Client;
use postcodenl_data::downloader::{self, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match download(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn download(cli: &Cli) -> Result<()> {
    let client = Client::new(cli.key.clone(), cli.secret.clone())
        .context("failed to set up the API client")?
        .with_progress(cli.verbose);

    let summary = downloader::run(&client, &cli.options())?;
    tracing::info!(
        downloaded = summary.downloaded.len(),
        skipped = summary.skipped.len(),
        "Done"
    );
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
