//! Build error types.

use std::io;
use std::path::{Path, PathBuf};

use quill_site::RenderError;
use quill_storage::DiscoveryError;

/// Fatal error aborting a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Output couldn't be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A content asset couldn't be read back from storage.
    #[error(transparent)]
    Asset(#[from] DiscoveryError),
    /// The worker pool couldn't be created.
    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Walking a static directory failed.
    #[error("Failed to walk static directory: {0}")]
    Walk(#[from] ignore::Error),
}

impl BuildError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// A route that failed to render.
#[derive(Debug)]
pub struct PageFailure {
    /// Public URL of the route.
    pub url_path: String,
    pub error: RenderError,
}

impl std::fmt::Display for PageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url_path, self.error)
    }
}
