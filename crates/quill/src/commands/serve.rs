//! `quill serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_server::{ServerConfig, run_server};

use crate::commands::site_settings;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long, env = "QUILL_CONTENT_DIR")]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Include draft pages.
    #[arg(long, env = "QUILL_DRAFTS", value_parser = clap::builder::FalseyValueParser::new())]
    drafts: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            drafts: self.drafts.then_some(true),
            host: self.host,
            port: self.port,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Serving on http://{}:{}{}/",
            config.server.host,
            config.server.port,
            config.base_path()
        ));
        output.info(&format!(
            "Content directory: {}",
            config.content_resolved.source_dir.display()
        ));
        if config.content_resolved.drafts {
            output.warning("Drafts: included");
        }

        run_server(server_config(&config, version))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration for a loaded project configuration.
fn server_config(config: &Config, version: &str) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        content_dir: config.content_resolved.source_dir.clone(),
        extensions: config.content_resolved.extensions.clone(),
        ignore_patterns: config.content_resolved.ignore.clone(),
        templates_dir: config.build_resolved.templates_dir.clone(),
        static_dirs: config.build_resolved.static_dirs.clone(),
        settings: site_settings(config, version),
        transformer: None,
    }
}
