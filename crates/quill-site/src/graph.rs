//! Site graph construction and lookups.
//!
//! # Architecture
//!
//! The graph is built in one pass from a [`Discovery`] and is immutable
//! afterwards:
//!
//! 1. Every document becomes a [`ContentPage`]; malformed front matter aborts.
//! 2. Slugs are checked for case-folded uniqueness, drafts included.
//! 3. Draft pages are dropped unless drafts are included.
//! 4. Each directory whose subtree holds a visible page becomes a [`Section`];
//!    pages in the content root are root pages.
//! 5. Assets attach to the nearest enclosing page bundle or section directory.
//! 6. Taxonomies are indexed from page metadata.
//!
//! Lookups by slug, URL path and section key are O(1) through case-folded
//! key maps.

use std::cmp::{Ordering, Reverse};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use quill_storage::{Discovery, Storage};

use crate::asset::ContentAsset;
use crate::collection::Collection;
use crate::error::{ContentParseError, SiteError};
use crate::markup::Markup;
use crate::ordering::{compare_pages, sort_pages};
use crate::page::{ContentPage, PageFactory};
use crate::path;
use crate::section::Section;
use crate::taxonomy::Taxonomy;

/// Options controlling graph construction.
#[derive(Clone, Debug, Default)]
pub struct GraphOptions {
    /// URL prefix for every page (e.g., "/docs" or "").
    pub base_path: String,
    /// Keep draft pages in listings.
    pub include_drafts: bool,
    /// Front-matter keys indexed as taxonomies.
    pub taxonomies: Vec<String>,
}

/// The immutable content graph.
#[derive(Debug)]
pub struct SiteGraph {
    pages: Vec<Arc<ContentPage>>,
    slug_index: HashMap<String, usize>,
    url_index: HashMap<String, usize>,
    root_pages: Vec<Arc<ContentPage>>,
    sections: Vec<Arc<Section>>,
    section_index: HashMap<String, Arc<Section>>,
    taxonomies: Vec<Taxonomy>,
    assets: Vec<Arc<ContentAsset>>,
    root_assets: Vec<Arc<ContentAsset>>,
    drafts_included: bool,
}

impl SiteGraph {
    /// Discover content through `storage` and build the graph.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if discovery fails or the content is invalid.
    pub fn load(
        storage: &dyn Storage,
        options: &GraphOptions,
        markup: Arc<dyn Markup>,
    ) -> Result<Self, SiteError> {
        let discovery = storage.discover()?;
        Self::build(&discovery, options, markup).map_err(SiteError::from)
    }

    /// Build the graph from discovery records.
    ///
    /// # Errors
    ///
    /// Returns [`ContentParseError`] on malformed front matter or duplicate
    /// slugs.
    pub fn build(
        discovery: &Discovery,
        options: &GraphOptions,
        markup: Arc<dyn Markup>,
    ) -> Result<Self, ContentParseError> {
        let started = Instant::now();
        let factory = PageFactory::new(&options.base_path, markup);

        let mut pages = discovery
            .documents
            .iter()
            .map(|record| factory.page(record))
            .collect::<Result<Vec<_>, _>>()?;
        check_duplicate_slugs(&pages)?;
        check_section_case(&section_keys(&pages))?;
        pages.retain(|p| options.include_drafts || !p.is_draft());

        let assets: Vec<Arc<ContentAsset>> = discovery
            .assets
            .iter()
            .map(|record| Arc::new(factory.asset(record)))
            .collect();

        let section_keys = section_keys(&pages);
        let bundles = assign_assets(&pages, &section_keys, &assets);

        let pages: Vec<Arc<ContentPage>> = pages
            .into_iter()
            .zip(bundles.page_assets)
            .map(|(mut page, assets)| {
                page.assets = assets;
                Arc::new(page)
            })
            .collect();

        let mut by_section: HashMap<String, Vec<Arc<ContentPage>>> = HashMap::new();
        let mut root_pages = Vec::new();
        for page in &pages {
            match page.section() {
                Some(key) => by_section
                    .entry(key.to_owned())
                    .or_default()
                    .push(Arc::clone(page)),
                None => root_pages.push(Arc::clone(page)),
            }
        }
        sort_pages(&mut root_pages);

        let (sections, section_index) = build_sections(
            &section_keys,
            by_section,
            bundles.section_assets,
            &options.base_path,
        );

        let mut ordered = root_pages.clone();
        for section in &sections {
            ordered.extend(section.all_pages().iter().cloned());
        }
        let slug_index = ordered
            .iter()
            .enumerate()
            .map(|(i, p)| (path::lookup_key(p.slug()), i))
            .collect();
        let url_index = ordered
            .iter()
            .enumerate()
            .map(|(i, p)| (path::lookup_key(p.url_path()), i))
            .collect();

        let taxonomies = options
            .taxonomies
            .iter()
            .map(|name| Taxonomy::build(name, &ordered))
            .collect();

        let graph = Self {
            pages: ordered,
            slug_index,
            url_index,
            root_pages,
            sections,
            section_index,
            taxonomies,
            assets,
            root_assets: bundles.root_assets,
            drafts_included: options.include_drafts,
        };

        tracing::info!(
            pages = graph.pages.len(),
            sections = graph.section_index.len(),
            assets = graph.assets.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Site graph built"
        );

        Ok(graph)
    }

    /// Every visible page in site-wide reading order: root pages, then each
    /// top-level section's pages depth-first.
    #[must_use]
    pub fn all_pages(&self) -> Collection<ContentPage> {
        Collection::new(self.pages.clone())
    }

    /// Every visible page in reading order, borrowed.
    #[must_use]
    pub fn reading_order(&self) -> &[Arc<ContentPage>] {
        &self.pages
    }

    /// Pages living directly in the content root.
    #[must_use]
    pub fn root_pages(&self) -> Collection<ContentPage> {
        Collection::new(self.root_pages.clone())
    }

    /// Non-index, non-draft pages in reading order.
    #[must_use]
    pub fn regular_pages(&self) -> Collection<ContentPage> {
        self.pages
            .iter()
            .filter(|p| !p.is_section_index() && !p.is_draft())
            .cloned()
            .collect()
    }

    /// Top-level sections in order.
    #[must_use]
    pub fn sections(&self) -> &[Arc<Section>] {
        &self.sections
    }

    /// Section by key (case-insensitive, any depth).
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&Arc<Section>> {
        self.section_index.get(&path::lookup_key(key))
    }

    /// Page by slug (case-insensitive).
    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Arc<ContentPage>> {
        self.slug_index
            .get(&path::lookup_key(slug))
            .map(|&i| &self.pages[i])
    }

    /// Page by public URL path (case-insensitive, slashes optional).
    #[must_use]
    pub fn page_by_url(&self, url_path: &str) -> Option<&Arc<ContentPage>> {
        self.url_index
            .get(&path::lookup_key(url_path))
            .map(|&i| &self.pages[i])
    }

    /// Position of a page in reading order.
    #[must_use]
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.slug_index.get(&path::lookup_key(slug)).copied()
    }

    /// The ordered listing containing a page: its section's pages, or the
    /// root pages.
    #[must_use]
    pub fn siblings(&self, page: &ContentPage) -> Collection<ContentPage> {
        match page.section().and_then(|key| self.section(key)) {
            Some(section) => section.pages(),
            None => self.root_pages(),
        }
    }

    /// Taxonomy by name.
    #[must_use]
    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.taxonomies.iter().find(|t| t.name() == name)
    }

    /// Configured taxonomies in configuration order.
    #[must_use]
    pub fn taxonomies(&self) -> &[Taxonomy] {
        &self.taxonomies
    }

    /// Pages declaring `term` under `taxonomy`; empty when either is unknown.
    #[must_use]
    pub fn taxonomy_term(&self, taxonomy: &str, term: &str) -> Collection<ContentPage> {
        self.taxonomy(taxonomy)
            .map(|t| t.pages(term))
            .unwrap_or_default()
    }

    /// All content assets in path order.
    #[must_use]
    pub fn assets(&self) -> Collection<ContentAsset> {
        Collection::new(self.assets.clone())
    }

    /// Assets under a directory key (`""` for every asset).
    #[must_use]
    pub fn assets_under(&self, root: &str) -> Collection<ContentAsset> {
        let root = path::normalize(root);
        self.assets
            .iter()
            .filter(|a| path::is_within(&a.relative_path, &root))
            .cloned()
            .collect()
    }

    /// Assets not claimed by any page bundle or section.
    #[must_use]
    pub fn root_assets(&self) -> Collection<ContentAsset> {
        Collection::new(self.root_assets.clone())
    }

    /// Bundle assets of a page.
    ///
    /// Section index pages share their section's direct assets and the root
    /// index page shares the root assets.
    #[must_use]
    pub fn bundle_assets(&self, page: &ContentPage) -> Collection<ContentAsset> {
        if page.is_section_index() {
            return self
                .section(page.slug())
                .map(|s| s.assets())
                .unwrap_or_default();
        }
        if page.is_index() {
            return self.root_assets();
        }
        Collection::new(page.assets().to_vec())
    }

    /// Whether drafts were kept during construction.
    #[must_use]
    pub fn drafts_included(&self) -> bool {
        self.drafts_included
    }
}

fn check_duplicate_slugs(pages: &[ContentPage]) -> Result<(), ContentParseError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for page in pages {
        match seen.entry(path::lookup_key(page.slug())) {
            Entry::Occupied(first) => {
                return Err(ContentParseError::DuplicateSlug {
                    slug: page.slug().to_owned(),
                    first: PathBuf::from(*first.get()),
                    second: PathBuf::from(page.source_path()),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(page.source_path());
            }
        }
    }
    Ok(())
}

/// Reject directory keys that collide once case-folded.
fn check_section_case(keys: &BTreeSet<String>) -> Result<(), ContentParseError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for key in keys {
        if let Some(first) = seen.insert(path::lookup_key(key), key) {
            return Err(ContentParseError::SectionCaseConflict {
                first: first.to_owned(),
                second: key.clone(),
            });
        }
    }
    Ok(())
}

/// Every directory holding a visible page, plus all its ancestors.
fn section_keys(pages: &[ContentPage]) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for page in pages {
        let mut dir = page.section();
        while let Some(key) = dir {
            if !keys.insert(key.to_owned()) {
                break;
            }
            dir = path::parent(key).filter(|p| !p.is_empty());
        }
    }
    keys
}

struct AssetAssignment {
    page_assets: Vec<Vec<Arc<ContentAsset>>>,
    section_assets: HashMap<String, Vec<Arc<ContentAsset>>>,
    root_assets: Vec<Arc<ContentAsset>>,
}

/// Attach each asset to the nearest enclosing bundle.
///
/// Walking up from the asset's directory, the first directory that is a page
/// bundle (`blog/post-a/` for `blog/post-a.md`) or a section claims the
/// asset. A page bundle wins over a section at the same level.
fn assign_assets(
    pages: &[ContentPage],
    section_keys: &BTreeSet<String>,
    assets: &[Arc<ContentAsset>],
) -> AssetAssignment {
    let bundle_dirs: HashMap<&str, usize> = pages
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_index())
        .map(|(i, p)| (p.slug(), i))
        .collect();

    let mut assignment = AssetAssignment {
        page_assets: vec![Vec::new(); pages.len()],
        section_assets: HashMap::new(),
        root_assets: Vec::new(),
    };

    for asset in assets {
        let mut dir = asset.directory();
        loop {
            if let Some(&i) = bundle_dirs.get(dir) {
                assignment.page_assets[i].push(Arc::clone(asset));
                break;
            }
            if section_keys.contains(dir) {
                assignment
                    .section_assets
                    .entry(dir.to_owned())
                    .or_default()
                    .push(Arc::clone(asset));
                break;
            }
            match path::parent(dir) {
                Some(parent) => dir = parent,
                None => {
                    assignment.root_assets.push(Arc::clone(asset));
                    break;
                }
            }
        }
    }

    assignment
}

fn compare_sections(a: &Section, b: &Section) -> Ordering {
    match (&a.index, &b.index) {
        (Some(x), Some(y)) => compare_pages(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.key.cmp(&b.key))
}

/// Build sections bottom-up so children exist before their parents.
fn build_sections(
    keys: &BTreeSet<String>,
    mut by_section: HashMap<String, Vec<Arc<ContentPage>>>,
    mut section_assets: HashMap<String, Vec<Arc<ContentAsset>>>,
    base_path: &str,
) -> (Vec<Arc<Section>>, HashMap<String, Arc<Section>>) {
    let mut ordered: Vec<&String> = keys.iter().collect();
    ordered.sort_by_key(|key| Reverse(key.matches('/').count()));

    let mut children_of: HashMap<String, Vec<Arc<Section>>> = HashMap::new();
    let mut index = HashMap::new();
    let mut top_level = Vec::new();

    for key in ordered {
        let mut pages = by_section.remove(key.as_str()).unwrap_or_default();
        sort_pages(&mut pages);
        let index_page = pages.iter().find(|p| p.is_section_index()).cloned();

        let mut children = children_of.remove(key.as_str()).unwrap_or_default();
        children.sort_by(|a, b| compare_sections(a, b));

        let label = index_page.as_ref().map_or_else(
            || path::title_case(path::file_name(key)),
            |p| p.navigation_title(),
        );
        let url_path = index_page.as_ref().map_or_else(
            || path::url_path(base_path, key),
            |p| p.url_path().to_owned(),
        );
        let parent = path::parent(key)
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        let section = Arc::new(Section {
            key: key.clone(),
            label,
            url_path,
            parent: parent.clone(),
            index: index_page,
            pages,
            children,
            assets: section_assets.remove(key.as_str()).unwrap_or_default(),
        });

        match parent {
            Some(parent) => children_of
                .entry(parent)
                .or_default()
                .push(Arc::clone(&section)),
            None => top_level.push(Arc::clone(&section)),
        }
        index.insert(path::lookup_key(key), section);
    }

    top_level.sort_by(|a, b| compare_sections(a, b));
    (top_level, index)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_storage::MockStorage;

    use super::*;
    use crate::markup::MarkdownMarkup;

    fn options() -> GraphOptions {
        GraphOptions {
            base_path: String::new(),
            include_drafts: false,
            taxonomies: vec!["tags".to_owned()],
        }
    }

    fn load(storage: &MockStorage, options: &GraphOptions) -> Result<SiteGraph, SiteError> {
        SiteGraph::load(storage, options, Arc::new(MarkdownMarkup))
    }

    fn slugs(pages: &Collection<ContentPage>) -> Vec<String> {
        pages.iter().map(|p| p.slug().to_owned()).collect()
    }

    fn blog_storage() -> MockStorage {
        MockStorage::new()
            .with_document("index.md", "---\ntitle: Home\n---\nWelcome")
            .with_document("about.md", "---\nweight: 2\n---\nAbout")
            .with_document("blog/index.dj", "---\ntitle: The Blog\nweight: 1\n---\n")
            .with_document("blog/post-a.dj", "---\nweight: 1\ntags: [rust, web]\n---\nA")
            .with_document(
                "blog/post-b.dj",
                "---\nweight: 2\ndraft: true\ntags: rust\n---\nB",
            )
            .with_document("blog/2024/recap.md", "---\ndate: 2024-12-31\n---\nRecap")
            .with_document("docs/guide.md", "Guide")
            .with_asset("blog/post-a/cover.jpg", b"jpg".to_vec())
            .with_asset("blog/banner.png", b"png".to_vec())
            .with_asset("blog/2024/img/chart.svg", b"svg".to_vec())
            .with_asset("favicon.ico", b"ico".to_vec())
            .with_asset("misc/notes.txt", b"txt".to_vec())
    }

    #[test]
    fn test_root_pages_and_sections() {
        let graph = load(&blog_storage(), &options()).unwrap();

        assert_eq!(slugs(&graph.root_pages()), vec!["about", ""]);
        let keys: Vec<_> = graph.sections().iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec!["blog", "docs"]);
    }

    #[test]
    fn test_section_members_exclude_drafts() {
        let graph = load(&blog_storage(), &options()).unwrap();

        let blog = graph.section("blog").unwrap();

        assert_eq!(slugs(&blog.pages()), vec!["blog", "blog/post-a"]);
        assert_eq!(blog.label(), "The Blog");
        assert_eq!(blog.url_path(), "/blog/");
        assert_eq!(blog.index().map(|p| p.slug()), Some("blog"));
        assert_eq!(slugs(&blog.regular_pages()), vec!["blog/post-a"]);
    }

    #[test]
    fn test_drafts_included_when_requested() {
        let options = GraphOptions {
            include_drafts: true,
            ..options()
        };

        let graph = load(&blog_storage(), &options).unwrap();

        assert!(graph.page("blog/post-b").is_some());
        assert!(graph.drafts_included());
        assert_eq!(graph.section("blog").unwrap().count(), 3);
    }

    #[test]
    fn test_nested_section_without_index() {
        let graph = load(&blog_storage(), &options()).unwrap();

        let recap = graph.section("blog/2024").unwrap();

        assert_eq!(recap.label(), "2024");
        assert_eq!(recap.url_path(), "/blog/2024/");
        assert_eq!(recap.parent(), Some("blog"));
        assert_eq!(
            slugs(&graph.section("blog").unwrap().all_pages()),
            vec!["blog", "blog/post-a", "blog/2024/recap"]
        );
    }

    #[test]
    fn test_every_page_appears_exactly_once() {
        let graph = load(&blog_storage(), &options()).unwrap();

        let mut seen = slugs(&graph.root_pages());
        for section in graph.sections() {
            seen.extend(slugs(&section.all_pages()));
        }
        seen.sort();

        let mut expected = slugs(&graph.all_pages());
        expected.sort();
        assert_eq!(seen, expected);
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_asset_bundles() {
        let graph = load(&blog_storage(), &options()).unwrap();

        let post = graph.page("blog/post-a").unwrap();
        let blog_index = graph.page("blog").unwrap();
        let home = graph.page("").unwrap();

        let post_assets: Vec<_> = post.assets().iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(post_assets, vec!["cover.jpg"]);
        let blog_assets: Vec<_> = graph
            .bundle_assets(blog_index)
            .iter()
            .map(|a| a.filename.clone())
            .collect();
        assert_eq!(blog_assets, vec!["banner.png"]);
        let chart = graph.section("blog/2024").unwrap().assets();
        assert_eq!(chart.first().map(|a| a.filename.as_str()), Some("chart.svg"));
        let root: Vec<_> = graph
            .bundle_assets(home)
            .iter()
            .map(|a| a.relative_path.clone())
            .collect();
        assert_eq!(root, vec!["favicon.ico", "misc/notes.txt"]);
    }

    #[test]
    fn test_all_assets_is_depth_first() {
        let graph = load(&blog_storage(), &options()).unwrap();

        let all: Vec<_> = graph
            .section("blog")
            .unwrap()
            .all_assets()
            .iter()
            .map(|a| a.filename.clone())
            .collect();

        assert_eq!(all, vec!["banner.png", "cover.jpg", "chart.svg"]);
    }

    #[test]
    fn test_page_bundle_wins_over_section_at_same_level() {
        let storage = MockStorage::new()
            .with_document("guide.md", "Guide")
            .with_document("guide/step.md", "Step")
            .with_asset("guide/diagram.png", b"png".to_vec());

        let graph = load(&storage, &options()).unwrap();

        assert_eq!(graph.page("guide").unwrap().assets().len(), 1);
        assert!(graph.section("guide").unwrap().assets().is_empty());
    }

    #[test]
    fn test_duplicate_slug_is_fatal() {
        let storage = MockStorage::new()
            .with_document("blog.md", "A")
            .with_document("Blog/index.md", "B");

        let err = load(&storage, &options()).unwrap_err();

        assert!(matches!(
            err,
            SiteError::Content(ContentParseError::DuplicateSlug { .. })
        ));
    }

    #[test]
    fn test_case_variant_sections_are_fatal() {
        let storage = MockStorage::new()
            .with_document("Blog/a.md", "A")
            .with_document("blog/b.md", "B");

        let err = load(&storage, &options()).unwrap_err();

        assert!(matches!(
            err,
            SiteError::Content(ContentParseError::SectionCaseConflict { ref first, ref second })
                if first == "Blog" && second == "blog"
        ));
    }

    #[test]
    fn test_nested_case_variant_sections_are_fatal() {
        let storage = MockStorage::new()
            .with_document("docs/Guide/a.md", "A")
            .with_document("docs/guide/b.md", "B");

        assert!(load(&storage, &options()).is_err());
    }

    #[test]
    fn test_duplicate_slug_counts_drafts() {
        let storage = MockStorage::new()
            .with_document("a.md", "A")
            .with_document("a.dj", "---\ndraft: true\n---\nB");

        assert!(load(&storage, &options()).is_err());
    }

    #[test]
    fn test_malformed_front_matter_aborts() {
        let storage = MockStorage::new()
            .with_document("good.md", "Good")
            .with_document("bad.md", "---\ntitle: [oops\n---\n");

        let err = load(&storage, &options()).unwrap_err();

        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_discovery_error_propagates() {
        let storage = MockStorage::new().with_unreadable("secret.md");

        let err = load(&storage, &options()).unwrap_err();

        assert!(matches!(err, SiteError::Discovery(_)));
    }

    #[test]
    fn test_taxonomy_terms() {
        let graph = load(&blog_storage(), &options()).unwrap();

        assert_eq!(
            slugs(&graph.taxonomy_term("tags", "rust")),
            vec!["blog/post-a"]
        );
        assert!(graph.taxonomy_term("tags", "python").is_empty());
        assert!(graph.taxonomy_term("categories", "rust").is_empty());
        let terms: Vec<_> = graph
            .taxonomy("tags")
            .unwrap()
            .terms()
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(terms, vec!["rust", "web"]);
    }

    #[test]
    fn test_drafts_never_in_taxonomies() {
        let options = GraphOptions {
            include_drafts: true,
            ..options()
        };

        let graph = load(&blog_storage(), &options).unwrap();

        assert_eq!(graph.taxonomy_term("tags", "rust").count(), 1);
    }

    #[test]
    fn test_lookup_by_url_is_case_insensitive() {
        let graph = load(&blog_storage(), &options()).unwrap();

        assert_eq!(
            graph.page_by_url("/Blog/Post-A").map(|p| p.slug()),
            Some("blog/post-a")
        );
        assert_eq!(graph.page_by_url("/").map(|p| p.slug()), Some(""));
        assert!(graph.page_by_url("/missing/").is_none());
    }

    #[test]
    fn test_regular_pages_exclude_section_indexes() {
        let graph = load(&blog_storage(), &options()).unwrap();

        assert_eq!(
            slugs(&graph.regular_pages()),
            vec!["about", "", "blog/post-a", "blog/2024/recap", "docs/guide"]
        );
    }

    #[test]
    fn test_assets_under() {
        let graph = load(&blog_storage(), &options()).unwrap();

        assert_eq!(graph.assets_under("blog").count(), 3);
        assert_eq!(graph.assets_under("/blog/post-a/").count(), 1);
        assert_eq!(graph.assets_under("").count(), 5);
    }

    static_assertions::assert_impl_all!(SiteGraph: Send, Sync);
}
