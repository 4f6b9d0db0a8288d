//! pinedocs CLI: cleans downloaded Pine Script documentation.
//!
//! Runs the processing pipeline by default; `crawl` downloads the pages the
//! pipeline consumes.

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
