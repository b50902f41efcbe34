//! Query API bound to one render.
//!
//! A [`SiteContext`] pairs the immutable [`SiteGraph`] with the page being
//! rendered and, for listing routes, the paginated view. Templates reach the
//! graph only through this type.

use std::sync::Arc;

use crate::asset::ContentAsset;
use crate::collection::Collection;
use crate::error::InvalidArgument;
use crate::graph::SiteGraph;
use crate::page::ContentPage;
use crate::pagination::{PaginatedView, Paginator};
use crate::path;
use crate::section::Section;
use crate::settings::SiteSettings;
use crate::taxonomy::Taxonomy;

/// Per-render view over the site.
#[derive(Clone, Debug)]
pub struct SiteContext {
    graph: Arc<SiteGraph>,
    settings: Arc<SiteSettings>,
    paginator: Paginator,
    page: Option<Arc<ContentPage>>,
    pagination: Option<PaginatedView<ContentPage>>,
    current_url: String,
}

impl SiteContext {
    /// Create a context not yet bound to a page.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the configured pagination pattern is
    /// invalid.
    pub fn new(graph: Arc<SiteGraph>, settings: Arc<SiteSettings>) -> Result<Self, InvalidArgument> {
        let paginator = Paginator::new(&settings.pagination_pattern)?;
        let current_url = path::url_path(&settings.base_path, "");
        Ok(Self {
            graph,
            settings,
            paginator,
            page: None,
            pagination: None,
            current_url,
        })
    }

    /// Bind the page being rendered.
    #[must_use]
    pub fn with_page(mut self, page: Arc<ContentPage>) -> Self {
        page.url_path().clone_into(&mut self.current_url);
        self.page = Some(page);
        self
    }

    /// Bind a listing page; the current URL becomes the view's URL.
    #[must_use]
    pub fn with_pagination(mut self, view: PaginatedView<ContentPage>) -> Self {
        self.current_url = view.current_url();
        self.pagination = Some(view);
        self
    }

    /// Page being rendered.
    #[must_use]
    pub fn current_page(&self) -> Option<&Arc<ContentPage>> {
        self.page.as_ref()
    }

    /// URL of the route being rendered.
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &SiteGraph {
        &self.graph
    }

    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Generator version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.settings.version
    }

    /// Build a site URL for `path`.
    ///
    /// The base path is prepended unless the path already carries it, and
    /// the configured origin is prepended when `absolute` is set. URLs with a
    /// scheme or starting with `//` are returned unchanged, so applying this
    /// twice yields the same result.
    #[must_use]
    pub fn url(&self, path: &str, absolute: bool) -> String {
        if has_scheme(path) || path.starts_with("//") {
            return path.to_owned();
        }

        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        let base = self.settings.base_path.trim_end_matches('/');
        let joined = if base.is_empty()
            || path == base
            || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
        {
            path
        } else {
            format!("{base}{path}")
        };

        match (&self.settings.base_url, absolute) {
            (Some(origin), true) => format!("{}{joined}", origin.trim_end_matches('/')),
            _ => joined,
        }
    }

    /// Check whether `path` addresses the route being rendered.
    #[must_use]
    pub fn is_current(&self, path: &str) -> bool {
        path::lookup_key(&self.url(path, false)) == path::lookup_key(&self.current_url)
    }

    /// Page by slug.
    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Arc<ContentPage>> {
        self.graph.page(slug)
    }

    #[must_use]
    pub fn root_pages(&self) -> Collection<ContentPage> {
        self.graph.root_pages()
    }

    #[must_use]
    pub fn sections(&self) -> &[Arc<Section>] {
        self.graph.sections()
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Arc<Section>> {
        self.graph.section(name)
    }

    /// All non-index, non-draft pages across the site.
    #[must_use]
    pub fn regular_pages(&self) -> Collection<ContentPage> {
        self.graph.regular_pages()
    }

    #[must_use]
    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.graph.taxonomy(name)
    }

    #[must_use]
    pub fn taxonomy_term(&self, taxonomy: &str, term: &str) -> Collection<ContentPage> {
        self.graph.taxonomy_term(taxonomy, term)
    }

    /// Previous page in site-wide reading order.
    #[must_use]
    pub fn previous(&self) -> Option<Arc<ContentPage>> {
        let order = self.graph.reading_order();
        let index = self.reading_position()?;
        order.get(index.checked_sub(1)?).cloned()
    }

    /// Next page in site-wide reading order.
    #[must_use]
    pub fn next(&self) -> Option<Arc<ContentPage>> {
        let order = self.graph.reading_order();
        let index = self.reading_position()?;
        order.get(index + 1).cloned()
    }

    /// Previous page in the current page's listing.
    #[must_use]
    pub fn previous_in_section(&self) -> Option<Arc<ContentPage>> {
        let (siblings, index) = self.sibling_position()?;
        siblings.get(index.checked_sub(1)?).cloned()
    }

    /// Next page in the current page's listing.
    #[must_use]
    pub fn next_in_section(&self) -> Option<Arc<ContentPage>> {
        let (siblings, index) = self.sibling_position()?;
        siblings.get(index + 1).cloned()
    }

    /// Content assets under a directory key (`""` for all).
    #[must_use]
    pub fn assets(&self, root: &str) -> Collection<ContentAsset> {
        self.graph.assets_under(root)
    }

    /// Bundle assets of the page with `slug`; empty when the page is unknown.
    #[must_use]
    pub fn page_assets(&self, slug: &str) -> Collection<ContentAsset> {
        self.graph
            .page(slug)
            .map(|p| self.graph.bundle_assets(p))
            .unwrap_or_default()
    }

    /// Bundle assets of `page` under the bundle subdirectory `key`.
    #[must_use]
    pub fn assets_for(&self, page: &ContentPage, key: &str) -> Collection<ContentAsset> {
        let dir = path::normalize(&format!("{}/{key}", page.slug()));
        self.graph
            .bundle_assets(page)
            .filter(|a| path::is_within(&a.relative_path, &dir))
    }

    /// Paginated view bound to a listing route.
    #[must_use]
    pub fn pagination(&self) -> Option<&PaginatedView<ContentPage>> {
        self.pagination.as_ref()
    }

    /// Paginate an arbitrary collection at the bound page number.
    ///
    /// Page 1 lives at the current route's base URL.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if `per_page` is 0.
    pub fn paginate(
        &self,
        items: &Collection<ContentPage>,
        per_page: usize,
    ) -> Result<PaginatedView<ContentPage>, InvalidArgument> {
        let (page_number, base_url) = match &self.pagination {
            Some(view) => (view.page_number(), view.url(1)),
            None => (1, self.current_url.clone()),
        };
        self.paginator.paginate(items, page_number, per_page, &base_url)
    }

    /// The site paginator.
    #[must_use]
    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    fn reading_position(&self) -> Option<usize> {
        self.graph.position(self.page.as_ref()?.slug())
    }

    fn sibling_position(&self) -> Option<(Collection<ContentPage>, usize)> {
        let page = self.page.as_ref()?;
        let siblings = self.graph.siblings(page);
        let index = siblings.iter().position(|p| Arc::ptr_eq(p, page))?;
        Some((siblings, index))
    }
}

fn has_scheme(url: &str) -> bool {
    url.split_once(':').is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
