//! Quill CLI - static site generator.
//!
//! Provides commands for:
//! - `build`: Render the site into the output directory
//! - `serve`: Preview the site with a live server

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quill - static site generator.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site.
    Build(BuildArgs),
    /// Start the live preview server.
    Serve(ServeArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.verbose,
            Self::Serve(args) => args.verbose,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(VERSION),
        Commands::Serve(args) => serve(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn serve(args: ServeArgs) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(args.execute(VERSION))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "quill",
            "build",
            "--output-dir",
            "dist",
            "--jobs",
            "4",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.command.verbose());
        assert!(matches!(cli.command, Commands::Build(_)));
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["quill", "serve", "--port", "3000"]).unwrap();

        assert!(matches!(cli.command, Commands::Serve(_)));
        assert!(!cli.command.verbose());
    }

    #[test]
    fn test_serve_rejects_output_dir() {
        let result = Cli::try_parse_from(["quill", "serve", "--output-dir", "dist"]);

        assert!(result.is_err());
    }
}
