//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use quill_site::{
    AssetResolver, ImageTransformer, MarkdownMarkup, MiniJinjaEngine, Site, SiteError, SiteSettings,
};
use quill_storage::Storage;
use quill_storage_fs::FsStorage;

/// Shared state for request handlers.
pub(crate) struct AppState {
    /// Content discovery, re-run on every page request.
    pub(crate) storage: FsStorage,
    /// Document extensions; matching files are never served raw.
    pub(crate) extensions: Vec<String>,
    pub(crate) templates_dir: PathBuf,
    /// Content directory; only discovered assets are served from it.
    pub(crate) content_files: AssetResolver,
    /// Static directories, served as they are.
    pub(crate) static_files: AssetResolver,
    pub(crate) settings: SiteSettings,
    pub(crate) transformer: Option<Arc<dyn ImageTransformer>>,
}

impl AppState {
    /// Load the site from the current state of the content directory.
    ///
    /// Templates are reloaded as well, so template edits are picked up.
    pub(crate) fn load_site(&self) -> Result<Site, SiteError> {
        let templates = Arc::new(MiniJinjaEngine::from_dir(self.templates_dir.clone()));
        Site::load(
            &self.storage,
            self.settings.clone(),
            Arc::new(MarkdownMarkup),
            templates,
        )
    }

    /// Check whether a content-relative key names a discovered asset.
    ///
    /// Hidden and ignored files exist on disk but are never discovered.
    pub(crate) fn is_content_asset(&self, key: &str) -> Result<bool, SiteError> {
        let key = quill_site::path::lookup_key(key);
        let discovery = self.storage.discover()?;
        Ok(discovery
            .assets
            .iter()
            .any(|asset| quill_site::path::lookup_key(&asset.path) == key))
    }

    /// Check whether a request path names a content document.
    pub(crate) fn is_document(&self, request_path: &str) -> bool {
        quill_site::path::extension(request_path)
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }
}
