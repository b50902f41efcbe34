//! Site-wide settings passed down from the composition root.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::GraphOptions;

/// Paginated listing of a section's pages.
#[derive(Clone, Debug, Serialize)]
pub struct ListingSettings {
    /// Section key (e.g., "blog").
    pub section: String,
    /// Pages per listing page.
    pub per_page: usize,
    /// Template overriding the default selection.
    pub template: Option<String>,
}

/// Settings shared by every render.
#[derive(Clone, Debug, Serialize)]
pub struct SiteSettings {
    pub title: String,
    /// Origin used for absolute URLs (e.g., `https://example.com`).
    pub base_url: Option<String>,
    /// URL prefix for all routes, `""` or `/segment`.
    pub base_path: String,
    /// Generator version exposed to templates.
    pub version: String,
    /// Keep draft pages.
    pub drafts: bool,
    /// Front-matter keys indexed as taxonomies.
    pub taxonomies: Vec<String>,
    /// Pagination URL pattern with a `{n}` placeholder.
    pub pagination_pattern: String,
    /// Default page size for [`paginate`](crate::SiteContext::paginate).
    pub per_page: usize,
    pub listings: Vec<ListingSettings>,
    /// Named image transform presets.
    pub image_presets: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Quill Site".to_owned(),
            base_url: None,
            base_path: String::new(),
            version: String::new(),
            drafts: false,
            taxonomies: Vec::new(),
            pagination_pattern: "page/{n}/".to_owned(),
            per_page: 10,
            listings: Vec::new(),
            image_presets: BTreeMap::new(),
        }
    }
}

impl SiteSettings {
    /// Graph construction options derived from these settings.
    #[must_use]
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            base_path: self.base_path.clone(),
            include_drafts: self.drafts,
            taxonomies: self.taxonomies.clone(),
        }
    }

    /// Listing configured for a section key (case-insensitive).
    #[must_use]
    pub fn listing(&self, section: &str) -> Option<&ListingSettings> {
        let key = crate::path::lookup_key(section);
        self.listings
            .iter()
            .find(|l| crate::path::lookup_key(&l.section) == key)
    }
}
