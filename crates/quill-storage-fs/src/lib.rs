//! Filesystem discovery backend for Quill.
//!
//! This crate provides [`FsStorage`], a filesystem-based implementation of the
//! [`Storage`](quill_storage::Storage) trait. It handles:
//!
//! - Recursive walking of the content root in path order
//! - Classification of files into documents (by extension) and assets
//! - Exclusion of hidden entries and configurable glob patterns
//! - Splitting document front matter from the body
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quill_storage::Storage;
//! use quill_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("content"))
//!     .with_ignore_patterns(&["drafts/**".to_owned()]);
//! let discovery = storage.discover()?;
//! ```

mod scanner;

use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use quill_storage::{Discovery, DiscoveryError, DiscoveryErrorKind, Storage};
use scanner::Scanner;

/// Backend identifier for error messages.
pub(crate) const BACKEND: &str = "Fs";

/// Document extensions recognised when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "dj"];

/// Filesystem storage implementation.
pub struct FsStorage {
    source_dir: PathBuf,
    extensions: Vec<String>,
    ignore: Vec<Pattern>,
}

impl FsStorage {
    /// Create a new filesystem storage with default document extensions.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Content root directory
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            source_dir,
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            ignore: Vec::new(),
        }
    }

    /// Replace the recognised document extensions.
    ///
    /// Extensions are matched case-insensitively; a leading dot is stripped.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Exclude paths matching any of the given glob patterns.
    ///
    /// Patterns are matched against the relative path and the file name.
    /// Invalid patterns are skipped with a warning.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!(pattern = %p, error = %e, "Invalid ignore pattern skipped");
                    None
                }
            })
            .collect();
        self
    }

    /// Content root directory.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

impl Storage for FsStorage {
    fn discover(&self) -> Result<Discovery, DiscoveryError> {
        Scanner::new(
            self.source_dir.clone(),
            self.extensions.clone(),
            self.ignore.clone(),
        )
        .scan()
    }

    fn read_asset(&self, path: &str) -> Result<Vec<u8>, DiscoveryError> {
        let rel = Path::new(path);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(DiscoveryError::new(DiscoveryErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        let full = self.source_dir.join(rel);
        fs::read(&full).map_err(|e| DiscoveryError::io(e, path).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_with_extensions_normalises() {
        let storage = FsStorage::new(PathBuf::from("content")).with_extensions([".MD", "txt", ""]);

        assert_eq!(storage.extensions, vec!["md".to_owned(), "txt".to_owned()]);
    }

    #[test]
    fn test_invalid_ignore_pattern_is_skipped() {
        let storage = FsStorage::new(PathBuf::from("content"))
            .with_ignore_patterns(&["[".to_owned(), "*.tmp".to_owned()]);

        assert_eq!(storage.ignore.len(), 1);
    }

    #[test]
    fn test_discover_custom_extensions() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("page.txt"), "Text page").unwrap();
        fs::write(temp_dir.path().join("page.md"), "Markdown").unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf()).with_extensions(["txt"]);

        let discovery = storage.discover().unwrap();

        assert_eq!(discovery.documents.len(), 1);
        assert_eq!(discovery.documents[0].path, "page.txt");
        assert_eq!(discovery.assets[0].path, "page.md");
    }

    #[test]
    fn test_read_asset() {
        let temp_dir = create_test_dir();
        fs::create_dir_all(temp_dir.path().join("blog")).unwrap();
        fs::write(temp_dir.path().join("blog/logo.png"), b"png").unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let bytes = storage.read_asset("blog/logo.png").unwrap();

        assert_eq!(bytes, b"png");
    }

    #[test]
    fn test_read_asset_rejects_traversal() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().join("content"));

        let err = storage.read_asset("../secret.txt").unwrap_err();

        assert_eq!(err.kind, DiscoveryErrorKind::InvalidPath);
    }

    #[test]
    fn test_read_asset_missing() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let err = storage.read_asset("missing.png").unwrap_err();

        assert_eq!(err.kind, DiscoveryErrorKind::NotFound);
    }
}
