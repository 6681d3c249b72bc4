//! profile-mover: relocate browser profiles and link them back in place

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use profile_mover::config::Config;
use profile_mover::pipeline;

/// Environment variable holding the diagnostic log filter
const LOG_ENV: &str = "PROFILE_MOVER_LOG";

#[derive(Parser)]
#[command(name = "profile-mover")]
#[command(about = "Move per-user browser profiles to a central directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the file with the list of users
    #[arg(short, long)]
    file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let Some(report) = pipeline::run(&config, &cli.file)? else {
        return Ok(());
    };

    println!();
    println!("{}", report.table());
    let summary = report.summary_line();
    if report.failed() > 0 {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary.green());
    }

    Ok(())
}
