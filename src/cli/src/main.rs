//! Image Retag CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use image_retag_cli::commands::{dispatch, Cli};

fn main() {
    // Initialize tracing; stdout carries the archive
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
