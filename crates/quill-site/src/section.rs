//! Directory-derived sections.

use std::sync::Arc;

use crate::asset::ContentAsset;
use crate::collection::Collection;
use crate::page::ContentPage;

/// A directory-derived grouping of pages.
///
/// Membership is fixed at graph construction. The section's index page, if
/// any, is a member of [`pages`](Self::pages).
#[derive(Debug)]
pub struct Section {
    pub(crate) key: String,
    pub(crate) label: String,
    pub(crate) url_path: String,
    pub(crate) parent: Option<String>,
    pub(crate) index: Option<Arc<ContentPage>>,
    pub(crate) pages: Vec<Arc<ContentPage>>,
    pub(crate) children: Vec<Arc<Section>>,
    pub(crate) assets: Vec<Arc<ContentAsset>>,
}

impl Section {
    /// Directory key (e.g., "blog", "docs/guides").
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Public URL path of the section (its index page's URL when present).
    #[must_use]
    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    /// Key of the parent section; `None` for top-level sections.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Index page of the section.
    #[must_use]
    pub fn index(&self) -> Option<&Arc<ContentPage>> {
        self.index.as_ref()
    }

    /// Direct pages in listing order.
    #[must_use]
    pub fn pages(&self) -> Collection<ContentPage> {
        Collection::new(self.pages.clone())
    }

    /// Direct pages other than the index page, in listing order.
    #[must_use]
    pub fn regular_pages(&self) -> Collection<ContentPage> {
        self.pages
            .iter()
            .filter(|p| !p.is_section_index())
            .cloned()
            .collect()
    }

    /// Number of direct pages.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pages.len()
    }

    /// Child sections in order.
    #[must_use]
    pub fn children(&self) -> &[Arc<Section>] {
        &self.children
    }

    /// Assets attached directly to the section directory.
    #[must_use]
    pub fn assets(&self) -> Collection<ContentAsset> {
        Collection::new(self.assets.clone())
    }

    /// Every page in the subtree, depth-first: direct pages, then each child.
    #[must_use]
    pub fn all_pages(&self) -> Collection<ContentPage> {
        let mut pages = Vec::new();
        self.collect_pages(&mut pages);
        Collection::new(pages)
    }

    /// Every asset in the subtree, depth-first: section assets, then page
    /// bundles in page order, then each child.
    #[must_use]
    pub fn all_assets(&self) -> Collection<ContentAsset> {
        let mut assets = Vec::new();
        self.collect_assets(&mut assets);
        Collection::new(assets)
    }

    fn collect_pages(&self, out: &mut Vec<Arc<ContentPage>>) {
        out.extend(self.pages.iter().cloned());
        for child in &self.children {
            child.collect_pages(out);
        }
    }

    fn collect_assets(&self, out: &mut Vec<Arc<ContentAsset>>) {
        out.extend(self.assets.iter().cloned());
        for page in &self.pages {
            out.extend(page.assets().iter().cloned());
        }
        for child in &self.children {
            child.collect_assets(out);
        }
    }
}
