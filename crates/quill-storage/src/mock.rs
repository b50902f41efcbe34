//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing graph construction without
//! filesystem access.

use std::collections::BTreeMap;

use crate::front_matter;
use crate::storage::{
    AssetRecord, Discovery, DiscoveryError, DiscoveryErrorKind, DocumentRecord, Storage,
};

/// Mock storage for testing.
///
/// Holds documents and assets in memory. Use the builder methods to configure
/// the mock with test data. Document sources are split into front matter and
/// body exactly like the filesystem backend does.
///
/// # Example
///
/// ```ignore
/// use quill_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_document("blog/post-a.dj", "---\nweight: 1\n---\nBody")
///     .with_asset("blog/post-a/cover.jpg", b"jpeg");
///
/// let discovery = storage.discover().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    documents: BTreeMap<String, String>,
    assets: BTreeMap<String, Vec<u8>>,
    unreadable: Option<String>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document from its full source text.
    #[must_use]
    pub fn with_document(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.documents.insert(path.into(), source.into());
        self
    }

    /// Add an asset with the given bytes.
    #[must_use]
    pub fn with_asset(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(path.into(), bytes.into());
        self
    }

    /// Make discovery fail with a permission error on the given path.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<String>) -> Self {
        self.unreadable = Some(path.into());
        self
    }
}

impl Storage for MockStorage {
    fn discover(&self) -> Result<Discovery, DiscoveryError> {
        if let Some(path) = &self.unreadable {
            return Err(DiscoveryError::new(DiscoveryErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend("Mock"));
        }

        let documents = self
            .documents
            .iter()
            .map(|(path, source)| {
                let (front_matter, body) = front_matter::split(source);
                DocumentRecord {
                    path: path.clone(),
                    front_matter,
                    body: body.to_owned(),
                }
            })
            .collect();
        let assets = self
            .assets
            .iter()
            .map(|(path, bytes)| AssetRecord {
                path: path.clone(),
                size: bytes.len() as u64,
            })
            .collect();

        let mut discovery = Discovery { documents, assets };
        discovery.sort();
        Ok(discovery)
    }

    fn read_asset(&self, path: &str) -> Result<Vec<u8>, DiscoveryError> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| DiscoveryError::not_found(path).with_backend("Mock"))
    }
}
