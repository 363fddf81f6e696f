//! ShipQuote TUI: interactive terminal front end for the quote wizard.
//!
//! Walks the customer through the resolved steps, runs VIN lookups in the
//! background and submits the finished lead, built with `ratatui` +
//! `crossterm`. Logs go to a file so they do not disturb the terminal.

mod app;
mod screens;
mod widgets;

use std::fs::OpenOptions;
use std::sync::Mutex;

use color_eyre::eyre::Result;
use shipquote_shared::{config_dir, load_config};

/// Log file name under the config directory.
const LOG_FILE_NAME: &str = "tui.log";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;
    let config = load_config()?;
    app::run(config).await
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shipquote=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
