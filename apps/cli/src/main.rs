//! DraftForge CLI — keyword-to-article assembly tool.
//!
//! Orchestrates search-data and generative-text APIs into long-form articles
//! stored in a local database.

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
