//! code2prompt - Turn a source tree into a single LLM prompt
//!
//! code2prompt provides:
//! - Directory traversal honoring `.gitignore`, built-in and user excludes
//! - Deterministic per-directory sampling for large trees
//! - Template-driven prompt rendering with a source tree outline
//! - Optional token counting and a JSON envelope

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod core;
mod discovery;
mod prompt;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(cli)
}
