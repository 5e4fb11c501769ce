//! heartcheck - heart-disease risk awareness from lifestyle answers
//!
//! Maps a short questionnaire onto the 13 clinical features of the classic
//! heart-disease dataset and scores them with a locally trained tree
//! ensemble. Awareness tool only, not a diagnosis.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(cli)
}
