//! Content discovery by filesystem walking.
//!
//! The scanner classifies every visible file under the content root as either
//! a document (by extension) or an asset. Documents are read in full so their
//! front matter can be split; assets are only stat'ed.

use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use quill_storage::{
    AssetRecord, Discovery, DiscoveryError, DiscoveryErrorKind, DocumentRecord, front_matter,
};

use crate::BACKEND;

/// Walks a content root and produces discovery records.
pub(crate) struct Scanner {
    source_dir: PathBuf,
    extensions: Vec<String>,
    ignore: Vec<Pattern>,
}

impl Scanner {
    /// Create a new Scanner.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Root directory to scan
    /// * `extensions` - Lowercase document extensions without the dot
    /// * `ignore` - Glob patterns matched against relative paths
    pub fn new(source_dir: PathBuf, extensions: Vec<String>, ignore: Vec<Pattern>) -> Self {
        Self {
            source_dir,
            extensions,
            ignore,
        }
    }

    /// Walk the content root.
    ///
    /// Unlike a lenient scan, a missing root is an error: an empty site must
    /// never be published because of a typo in the content path.
    pub fn scan(&self) -> Result<Discovery, DiscoveryError> {
        if !self.source_dir.is_dir() {
            return Err(DiscoveryError::not_found(&self.source_dir).with_backend(BACKEND));
        }

        let root = self.source_dir.clone();
        let ignore = self.ignore.clone();
        let walker = WalkBuilder::new(&self.source_dir)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                relative_key(&root, entry.path())
                    .is_none_or(|key| key.is_empty() || !is_ignored(&ignore, &key))
            })
            .build();

        let mut discovery = Discovery::default();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(&e, &self.source_dir))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let key = relative_key(&self.source_dir, path).ok_or_else(|| {
                DiscoveryError::new(DiscoveryErrorKind::InvalidEncoding)
                    .with_path(path)
                    .with_backend(BACKEND)
            })?;

            if self.is_document(path) {
                discovery.documents.push(read_document(path, key)?);
            } else {
                let size = entry
                    .metadata()
                    .map_err(|e| walk_error(&e, path))?
                    .len();
                discovery.assets.push(AssetRecord { path: key, size });
            }
        }

        discovery.sort();
        tracing::debug!(
            documents = discovery.documents.len(),
            assets = discovery.assets.len(),
            root = %self.source_dir.display(),
            "Content root scanned"
        );
        Ok(discovery)
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
    }
}

fn read_document(path: &Path, key: String) -> Result<DocumentRecord, DiscoveryError> {
    let source = fs::read_to_string(path)
        .map_err(|e| DiscoveryError::io(e, path).with_backend(BACKEND))?;
    let (front_matter, body) = front_matter::split(&source);
    Ok(DocumentRecord {
        path: key,
        front_matter,
        body: body.to_owned(),
    })
}

/// Convert an absolute path under `root` into a `/`-joined relative key.
///
/// Returns `None` for paths outside the root or with non-UTF-8 components.
pub(crate) fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

fn is_ignored(patterns: &[Pattern], key: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let name = key.rsplit('/').next().unwrap_or(key);
    patterns
        .iter()
        .any(|p| p.matches_with(key, options) || p.matches_with(name, options))
}

fn walk_error(err: &ignore::Error, fallback: &Path) -> DiscoveryError {
    let path = error_path(err).unwrap_or(fallback).to_path_buf();
    let kind = match err.io_error().map(std::io::Error::kind) {
        Some(std::io::ErrorKind::NotFound) => DiscoveryErrorKind::NotFound,
        Some(std::io::ErrorKind::PermissionDenied) => DiscoveryErrorKind::PermissionDenied,
        _ => DiscoveryErrorKind::Other,
    };
    DiscoveryError::new(kind)
        .with_path(path)
        .with_backend(BACKEND)
        .with_source(std::io::Error::other(err.to_string()))
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_storage::RawFrontMatter;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn scanner(root: &Path, ignore: &[&str]) -> Scanner {
        Scanner::new(
            root.to_path_buf(),
            vec!["md".to_owned(), "dj".to_owned()],
            ignore.iter().map(|p| Pattern::new(p).unwrap()).collect(),
        )
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_relative_key() {
        let root = Path::new("/content");

        assert_eq!(
            relative_key(root, Path::new("/content/blog/post.md")),
            Some("blog/post.md".to_owned())
        );
        assert_eq!(relative_key(root, Path::new("/content")), Some(String::new()));
        assert_eq!(relative_key(root, Path::new("/other/post.md")), None);
    }

    #[test]
    fn test_scan_classifies_documents_and_assets() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write(root, "index.md", "---\ntitle: Home\n---\nWelcome");
        write(root, "blog/post-a.dj", "Post A");
        write(root, "blog/post-a/cover.jpg", "jpeg-bytes");

        let discovery = scanner(root, &[]).scan().unwrap();

        let docs: Vec<_> = discovery.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(docs, vec!["blog/post-a.dj", "index.md"]);
        assert_eq!(
            discovery.documents[1].front_matter,
            RawFrontMatter::Block("title: Home\n".to_owned())
        );
        assert_eq!(discovery.documents[1].body, "Welcome");
        assert_eq!(discovery.assets.len(), 1);
        assert_eq!(discovery.assets[0].path, "blog/post-a/cover.jpg");
        assert_eq!(discovery.assets[0].size, 10);
    }

    #[test]
    fn test_scan_excludes_hidden_entries() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write(root, "visible.md", "Visible");
        write(root, ".hidden.md", "Hidden");
        write(root, ".git/config", "[core]");
        write(root, "blog/.draft/notes.md", "Notes");

        let discovery = scanner(root, &[]).scan().unwrap();

        let docs: Vec<_> = discovery.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(docs, vec!["visible.md"]);
        assert!(discovery.assets.is_empty());
    }

    #[test]
    fn test_scan_applies_ignore_patterns() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write(root, "keep.md", "Keep");
        write(root, "scratch/wip.md", "WIP");
        write(root, "notes.tmp", "tmp");

        let discovery = scanner(root, &["scratch", "*.tmp"]).scan().unwrap();

        let docs: Vec<_> = discovery.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(docs, vec!["keep.md"]);
        assert!(discovery.assets.is_empty());
    }

    #[test]
    fn test_scan_extension_match_is_case_insensitive() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write(root, "README.MD", "Readme");

        let discovery = scanner(root, &[]).scan().unwrap();

        assert_eq!(discovery.documents.len(), 1);
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let temp_dir = create_test_dir();
        let missing = temp_dir.path().join("missing");

        let err = scanner(&missing, &[]).scan().unwrap_err();

        assert_eq!(err.kind, DiscoveryErrorKind::NotFound);
        assert_eq!(err.path.as_deref(), Some(missing.as_path()));
    }

    #[test]
    fn test_scan_invalid_utf8_document_is_error() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("bad.md"), [0xff_u8, 0xfe, 0x00]).unwrap();

        let err = scanner(root, &[]).scan().unwrap_err();

        assert_eq!(err.kind, DiscoveryErrorKind::InvalidEncoding);
        assert!(err.to_string().contains("bad.md"));
    }
}
