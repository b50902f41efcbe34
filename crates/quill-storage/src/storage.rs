//! Storage trait, discovery records and error types.
//!
//! # Path Convention
//!
//! All record paths are **relative, `/`-separated paths** from the content
//! root, regardless of host platform:
//! - `"index.md"` - root index document
//! - `"blog/post-a.dj"` - nested document
//! - `"blog/post-a/cover.jpg"` - asset colocated with a page

use std::path::PathBuf;

use crate::front_matter::RawFrontMatter;

/// Raw content document produced by discovery.
///
/// Front matter is split from the body but not decoded; decoding failures are
/// reported by the page factory, not by discovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Relative path (e.g., "blog/post-a.dj").
    pub path: String,
    /// Undecoded front-matter block.
    pub front_matter: RawFrontMatter,
    /// Document body after the front-matter block.
    pub body: String,
}

/// Raw non-document file produced by discovery.
///
/// Only stat data is collected; bytes are read on demand via
/// [`Storage::read_asset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    /// Relative path (e.g., "blog/post-a/cover.jpg").
    pub path: String,
    /// File size in bytes.
    pub size: u64,
}

/// Result of a discovery pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Content documents, sorted by path.
    pub documents: Vec<DocumentRecord>,
    /// Assets, sorted by path.
    pub assets: Vec<AssetRecord>,
}

impl Discovery {
    /// Sort both record lists lexicographically by relative path.
    ///
    /// Backends call this before returning so downstream processing is
    /// reproducible across runs.
    pub fn sort(&mut self) {
        self.documents.sort_by(|a, b| a.path.cmp(&b.path));
        self.assets.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Check if nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.assets.is_empty()
    }
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiscoveryErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path or identifier.
    InvalidPath,
    /// File content is not valid UTF-8.
    InvalidEncoding,
    /// Other/unknown error category.
    Other,
}

/// Discovery error with semantic kind, offending path and backend source.
///
/// Discovery errors are fatal: a content root that cannot be read completely
/// must not produce a partial site.
#[derive(Debug)]
pub struct DiscoveryError {
    /// Semantic error category.
    pub kind: DiscoveryErrorKind,
    /// Offending path (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DiscoveryError {
    /// Create a new discovery error.
    #[must_use]
    pub fn new(kind: DiscoveryErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(DiscoveryErrorKind::NotFound).with_path(path)
    }

    /// Create a discovery error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => DiscoveryErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => DiscoveryErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => DiscoveryErrorKind::InvalidEncoding,
            _ => DiscoveryErrorKind::Other,
        };
        Self::new(kind).with_source(err).with_path(path)
    }
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: blog/post.md)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            DiscoveryErrorKind::NotFound => "Not found",
            DiscoveryErrorKind::PermissionDenied => "Permission denied",
            DiscoveryErrorKind::InvalidPath => "Invalid path",
            DiscoveryErrorKind::InvalidEncoding => "Invalid encoding",
            DiscoveryErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Content discovery abstraction.
///
/// Implementations walk a content root and classify every entry as either a
/// document (recognised by extension) or an asset. Hidden and ignored paths
/// are excluded entirely.
pub trait Storage: Send + Sync {
    /// Discover every document and asset under the content root.
    ///
    /// Both lists are sorted lexicographically by relative path.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] naming the offending path if the root or any
    /// file beneath it cannot be read.
    fn discover(&self) -> Result<Discovery, DiscoveryError>;

    /// Read the bytes of an asset.
    ///
    /// # Arguments
    ///
    /// * `path` - Relative asset path (e.g., "blog/post-a/cover.jpg")
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the asset doesn't exist or can't be read.
    fn read_asset(&self, path: &str) -> Result<Vec<u8>, DiscoveryError>;
}
