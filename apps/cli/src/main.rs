//! ShipQuote CLI: headless driver for the vehicle-shipping quote wizard.
//!
//! Inspects the resolved form schema, decodes VINs, and submits leads from
//! a JSON answers file without the interactive front end.

mod answers;
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
