//! `quill build` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quill_build::{BuildOptions, build};
use quill_config::{CliSettings, Config};
use quill_site::{MarkdownMarkup, MiniJinjaEngine, Site};

use crate::commands::{content_storage, site_settings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long, env = "QUILL_CONTENT_DIR")]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Include draft pages.
    #[arg(long, env = "QUILL_DRAFTS", value_parser = clap::builder::FalseyValueParser::new())]
    drafts: bool,

    /// Render worker count, 0 for one per CPU (overrides config).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or content can't be loaded, output
    /// can't be written, or any page fails to render.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            drafts: self.drafts.then_some(true),
            jobs: self.jobs,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Building {} into {}",
            config.content_resolved.source_dir.display(),
            config.build_resolved.output_dir.display()
        ));

        let storage = content_storage(&config);
        let templates = Arc::new(MiniJinjaEngine::from_dir(
            config.build_resolved.templates_dir.clone(),
        ));
        let site = Site::load(
            &storage,
            site_settings(&config, version),
            Arc::new(MarkdownMarkup),
            templates,
        )?;

        let options = BuildOptions {
            output_dir: config.build_resolved.output_dir.clone(),
            static_dirs: config.build_resolved.static_dirs.clone(),
            jobs: config.build_resolved.jobs,
        };
        let report = build(&site, &storage, &options)?;

        output.build_report(&report);
        if !report.is_success() {
            return Err(CliError::PagesFailed(report.failures.len()));
        }
        Ok(())
    }
}
