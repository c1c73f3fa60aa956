//! blogdraft CLI: drafts Naver blog posts for unwritten Notion rows.
//!
//! With no subcommand, runs the pipeline once and exits.

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
