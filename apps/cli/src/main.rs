//! contentgate CLI: tiered URL content extraction and quality scoring.
//!
//! Fetches readable text from caller-supplied URLs and grades it with a
//! deterministic rubric. Results go to stdout as JSON, logs to stderr.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
