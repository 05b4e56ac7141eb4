//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.
//!
//! The `COMPILE_PATH` and `COMPILE_OUTPUT` environment variables override
//! `--path` and `--output`; that precedence (env beats flag) is applied in
//! `main`, not here, since clap's `env` attribute expresses the opposite.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tessera static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root path (default: current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Output directory path; omit to print compiled pages to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only sync resources, skip template compilation
    #[arg(long)]
    pub sync: bool,

    /// Keep running and re-sync resources/styles on change
    #[arg(short, long)]
    pub watch: bool,

    /// Suppress informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show extra diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// subcommands (default: compile)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scaffold a new site at the given path
    Init {
        /// the path of the site directory
        path: PathBuf,
    },

    /// Compile pages, sync resources and build stylesheets
    Compile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_is_default() {
        let cli = Cli::parse_from(["tessera"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_init_subcommand() {
        let cli = Cli::parse_from(["tessera", "init", "my-site"]);
        match cli.command {
            Some(Commands::Init { path }) => assert_eq!(path, PathBuf::from("my-site")),
            _ => panic!("expected init subcommand"),
        }
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "tessera", "--path", "site", "--output", "dist", "--sync", "--quiet",
        ]);
        assert_eq!(cli.path, Some(PathBuf::from("site")));
        assert_eq!(cli.output, Some(PathBuf::from("dist")));
        assert!(cli.sync);
        assert!(cli.quiet);
        assert!(!cli.watch);
    }
}
