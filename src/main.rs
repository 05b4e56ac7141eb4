//! Tessera - a static site generator with localized text partials and
//! delta-synced resources.

mod build;
mod cli;
mod compiler;
mod config;
mod error;
mod init;
mod logger;
mod utils;
mod watch;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use std::{env, path::PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::set_level(cli.quiet, cli.verbose);

    match &cli.command {
        Some(Commands::Init { path }) => init::new_site(path),
        Some(Commands::Compile) | None => run(&cli),
    }
}

/// Load config for the resolved root and run the requested passes.
fn run(cli: &Cli) -> Result<()> {
    let root = env::var_os("COMPILE_PATH")
        .map(PathBuf::from)
        .or_else(|| cli.path.clone())
        .unwrap_or_else(|| PathBuf::from("./"));
    let output = env::var_os("COMPILE_OUTPUT")
        .map(PathBuf::from)
        .or_else(|| cli.output.clone());

    let mut config = SiteConfig::load(&root)?;
    config.finalize(output);

    if cli.sync {
        build::sync_only(&config)?;
    } else {
        build::build_site(&config)?;
    }

    if cli.watch {
        watch::watch_for_changes_blocking(&config)?;
    }

    Ok(())
}
