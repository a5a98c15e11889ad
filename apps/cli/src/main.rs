//! Polidoc CLI — multilingual policy-document registry.
//!
//! Imports spreadsheet registries into a searchable local catalog and
//! exposes faceted search, browsing, and catalog administration.

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
