//! rigmate CLI: marketplace PC part catalog and build recommender.
//!
//! Ingests raw marketplace listings into a normalized component catalog and
//! assembles budget-constrained, compatibility-checked build recommendations.

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
