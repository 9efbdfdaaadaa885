//! Binary crate for the `forecast-helper` background process.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Speaking the host module's notification protocol over stdio

use clap::Parser;
use forecast_core::Config;

mod cli;
mod host;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let config = Config::load()?;
    logging::init(&config)?;
    cmd.run(config).await
}
