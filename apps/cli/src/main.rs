//! Styleguide CLI — extracts documented SCSS into a style guide model.
//!
//! Crawls DocBlocks out of stylesheets and exports the grouped entities and
//! a search index as JSON for a renderer to consume.

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
