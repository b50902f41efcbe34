//! Render orchestration.
//!
//! # Architecture
//!
//! [`Site`] binds the content graph to the settings and a template engine.
//! Every render follows the same steps:
//!
//! 1. Resolve: a [`Route`] names the page or listing page to produce.
//! 2. Load: the page, section and paginated view are looked up in the graph.
//! 3. Bind: a [`SiteContext`] is created for the route.
//! 4. Render: the selected template is evaluated against the context.
//!
//! The route space is every visible page plus every page of each configured
//! listing. Page 1 of a listing shares the URL of its section index page.
//!
//! # Example
//!
//! ```ignore
//! let site = Site::load(&storage, settings, Arc::new(MarkdownMarkup), templates)?;
//! for target in site.routes() {
//!     let html = site.render(&target.route)?;
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use quill_storage::Storage;

use crate::context::SiteContext;
use crate::error::{InvalidArgument, RenderError, SiteError};
use crate::graph::SiteGraph;
use crate::markup::Markup;
use crate::page::ContentPage;
use crate::pagination::{PaginatedView, Paginator};
use crate::path;
use crate::section::Section;
use crate::settings::{ListingSettings, SiteSettings};
use crate::template::TemplateEngine;

/// Template used when nothing more specific applies.
pub const DEFAULT_TEMPLATE: &str = "page.html";
/// Template for section index pages.
pub const SECTION_TEMPLATE: &str = "section.html";
/// Template for listings without an index page.
pub const LIST_TEMPLATE: &str = "list.html";

/// File written for every route.
const OUTPUT_FILE: &str = "index.html";

/// Something the site can render.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// A single page, by slug.
    Page(String),
    /// One page of a section listing.
    Listing {
        /// Section key.
        section: String,
        /// 1-based page number.
        page_number: usize,
    },
}

/// A route with its public URL and output location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTarget {
    pub route: Route,
    /// Public URL path including the base path.
    pub url_path: String,
    /// Output file relative to the output directory.
    pub output_path: PathBuf,
}

/// Outcome of a live request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveOutcome {
    /// Rendered HTML.
    Render(String),
    /// Redirect to the canonical location.
    Redirect(String),
    /// No route answers the path.
    NotFound,
}

/// A built site ready to render.
pub struct Site {
    graph: Arc<SiteGraph>,
    settings: Arc<SiteSettings>,
    templates: Arc<dyn TemplateEngine>,
    paginator: Paginator,
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("graph", &self.graph)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Site {
    /// Discover content, build the graph and bind it to the templates.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if discovery fails, the content is invalid or
    /// the pagination pattern is rejected.
    pub fn load(
        storage: &dyn Storage,
        settings: SiteSettings,
        markup: Arc<dyn Markup>,
        templates: Arc<dyn TemplateEngine>,
    ) -> Result<Self, SiteError> {
        let graph = SiteGraph::load(storage, &settings.graph_options(), markup)?;
        Self::new(graph, settings, templates)
    }

    /// Bind an existing graph.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidArgument`] if the pagination pattern has
    /// no `{n}` placeholder.
    pub fn new(
        graph: SiteGraph,
        settings: SiteSettings,
        templates: Arc<dyn TemplateEngine>,
    ) -> Result<Self, SiteError> {
        let paginator = Paginator::new(&settings.pagination_pattern)?;
        Ok(Self {
            graph: Arc::new(graph),
            settings: Arc::new(settings),
            templates,
            paginator,
        })
    }

    #[must_use]
    pub fn graph(&self) -> &SiteGraph {
        &self.graph
    }

    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Every renderable route in reading order, listings last.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteTarget> {
        let mut targets: Vec<RouteTarget> = self
            .graph
            .reading_order()
            .iter()
            .filter(|page| self.listing_for(page).is_none())
            .map(|page| self.target(Route::Page(page.slug().to_owned()), page.url_path()))
            .collect();

        for listing in &self.settings.listings {
            let (section, view) = match self.listing_view(listing, 1) {
                Ok(Some(found)) => found,
                Ok(None) => {
                    tracing::warn!(section = %listing.section, "Listing references unknown section");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(section = %listing.section, %error, "Listing skipped");
                    continue;
                }
            };
            for n in 1..=view.total_pages() {
                let route = Route::Listing {
                    section: section.key().to_owned(),
                    page_number: n,
                };
                targets.push(self.target(route, &view.url(n)));
            }
        }

        targets
    }

    /// Map a public URL path to a route.
    ///
    /// Matching is case-insensitive and ignores trailing slashes.
    #[must_use]
    pub fn resolve(&self, url_path: &str) -> Option<Route> {
        if let Some(page) = self.graph.page_by_url(url_path) {
            let section = self
                .listing_for(page)
                .and_then(|listing| self.graph.section(&listing.section));
            return Some(match section {
                Some(section) => Route::Listing {
                    section: section.key().to_owned(),
                    page_number: 1,
                },
                None => Route::Page(page.slug().to_owned()),
            });
        }

        let key = path::lookup_key(url_path);
        self.settings.listings.iter().find_map(|listing| {
            let (section, view) = self.listing_view(listing, 1).ok().flatten()?;
            (1..=view.total_pages())
                .find(|&n| path::lookup_key(&view.url(n)) == key)
                .map(|page_number| Route::Listing {
                    section: section.key().to_owned(),
                    page_number,
                })
        })
    }

    /// Render a route to HTML.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::RouteNotFound`] if the route doesn't exist, or
    /// the template engine's error.
    pub fn render(&self, route: &Route) -> Result<String, RenderError> {
        let context = SiteContext::new(Arc::clone(&self.graph), Arc::clone(&self.settings))?;

        let (context, template) = match route {
            Route::Page(slug) => {
                let page = self
                    .graph
                    .page(slug)
                    .ok_or_else(|| RenderError::RouteNotFound(slug.clone()))?;
                let template = self.select_template(Some(page), None);
                (context.with_page(Arc::clone(page)), template)
            }
            Route::Listing {
                section,
                page_number,
            } => {
                let not_found = || RenderError::RouteNotFound(format!("{section} page {page_number}"));
                let listing = self.settings.listing(section).ok_or_else(not_found)?;
                let (section, view) = self
                    .listing_view(listing, *page_number)?
                    .filter(|(_, view)| view.page_number() == *page_number)
                    .ok_or_else(not_found)?;
                let index = section.index();
                let template = self.select_template(index.map(Arc::as_ref), Some(listing));
                let context = match index {
                    Some(page) => context.with_page(Arc::clone(page)),
                    None => context,
                };
                (context.with_pagination(view), template)
            }
        };

        tracing::debug!(url = context.current_url(), template = %template, "Rendering route");
        self.templates.render(&template, &context)
    }

    /// Resolve and render a live request path.
    ///
    /// A resolvable path without a trailing slash redirects to its slash
    /// form, keeping the query string. Slugs may contain dots, so
    /// `/notes.v2` redirects like any other page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if rendering a resolved route fails.
    pub fn resolve_live(
        &self,
        url_path: &str,
        query: Option<&str>,
    ) -> Result<LiveOutcome, RenderError> {
        let Some(route) = self.resolve(url_path) else {
            return Ok(LiveOutcome::NotFound);
        };

        if !url_path.ends_with('/') {
            let mut location = format!("{url_path}/");
            if let Some(query) = query.filter(|q| !q.is_empty()) {
                location.push('?');
                location.push_str(query);
            }
            return Ok(LiveOutcome::Redirect(location));
        }

        match self.render(&route) {
            Ok(html) => Ok(LiveOutcome::Render(html)),
            Err(RenderError::RouteNotFound(_)) => Ok(LiveOutcome::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Pick the template for a page, a listing, or both.
    ///
    /// Order: the page's `template` metadata, the listing's template,
    /// `{type}.html` when it exists, `section.html` for section indexes or
    /// `list.html` for listings without one, then `page.html`.
    fn select_template(
        &self,
        page: Option<&ContentPage>,
        listing: Option<&ListingSettings>,
    ) -> String {
        if let Some(template) = page.and_then(|p| p.meta().template()) {
            return template;
        }
        if let Some(template) = listing.and_then(|l| l.template.clone()) {
            return template;
        }
        if let Some(page_type) = page.and_then(ContentPage::page_type) {
            let name = format!("{page_type}.html");
            if self.templates.has_template(&name) {
                return name;
            }
        }
        let fallback = match page {
            Some(p) if p.is_section_index() => Some(SECTION_TEMPLATE),
            None if listing.is_some() => Some(LIST_TEMPLATE),
            _ => None,
        };
        fallback
            .filter(|name| self.templates.has_template(name))
            .unwrap_or(DEFAULT_TEMPLATE)
            .to_owned()
    }

    /// Listing rendered at a section index page's URL, if configured.
    fn listing_for(&self, page: &ContentPage) -> Option<&ListingSettings> {
        if !page.is_section_index() {
            return None;
        }
        self.settings
            .listing(page.slug())
            .filter(|listing| matches!(self.listing_view(listing, 1), Ok(Some(_))))
    }

    /// Section and page `page_number` of a listing; `None` if the section
    /// doesn't exist.
    fn listing_view(
        &self,
        listing: &ListingSettings,
        page_number: usize,
    ) -> Result<Option<(&Arc<Section>, PaginatedView<ContentPage>)>, InvalidArgument> {
        let Some(section) = self.graph.section(&listing.section) else {
            return Ok(None);
        };
        let view = self.paginator.paginate(
            &section.regular_pages(),
            page_number,
            listing.per_page,
            section.url_path(),
        )?;
        Ok(Some((section, view)))
    }

    fn target(&self, route: Route, url_path: &str) -> RouteTarget {
        RouteTarget {
            route,
            url_path: url_path.to_owned(),
            output_path: self.output_path(url_path),
        }
    }

    /// Output file for a URL: `<url without base path>/index.html`.
    fn output_path(&self, url_path: &str) -> PathBuf {
        let base = self.settings.base_path.trim_end_matches('/');
        let relative = url_path
            .strip_prefix(base)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(url_path);
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            PathBuf::from(OUTPUT_FILE)
        } else {
            PathBuf::from(relative).join(OUTPUT_FILE)
        }
    }
}
