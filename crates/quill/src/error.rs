//! CLI error types.

use quill_build::BuildError;
use quill_config::ConfigError;
use quill_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Server(String),

    #[error("{0} page(s) failed to render")]
    PagesFailed(usize),
}
