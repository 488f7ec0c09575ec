// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use lens_capture::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "lens-capture")]
#[command(about = "Take a photo and send it to an image-search application")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/lens-capture/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive mode: Enter captures, g opens the gallery, q quits
    Shell,

    /// Open the gallery
    Gallery,

    /// List handoff candidates and whether each one is installed
    Candidates,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=lens_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("GIT_VERSION"), "Starting lens-capture");

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        Some(Commands::Shell) | None => lens_capture::terminal::run(&config).await,
        Some(Commands::Gallery) => cli::open_gallery(&config),
        Some(Commands::Candidates) => cli::list_candidates(&config),
        Some(Commands::Config) => cli::print_config(&config),
    }
}
