//! dashtree CLI: inspect how a dashboard layout is paged and tabbed.
//!
//! Loads a layout document and prints its pages, tab outline, or the raw
//! event stream a renderer would consume.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
