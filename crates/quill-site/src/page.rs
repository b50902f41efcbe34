//! Content pages and the page factory.
//!
//! A [`ContentPage`] is built once from a discovery record and is immutable
//! afterwards, except for its HTML content which is produced lazily by the
//! [`Markup`] collaborator on first access and memoized.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDateTime;
use quill_storage::{AssetRecord, DocumentRecord};
use serde_json::Value;

use crate::asset::ContentAsset;
use crate::error::ContentParseError;
use crate::markup::{Markup, Rendered, TocEntry};
use crate::metadata::Meta;
use crate::path;

/// Title used for the content root's index page without a `title`.
const ROOT_TITLE: &str = "Home";

/// One authored document.
pub struct ContentPage {
    pub(crate) source_path: String,
    pub(crate) slug: String,
    pub(crate) url_path: String,
    pub(crate) title: String,
    pub(crate) meta: Meta,
    pub(crate) body: String,
    pub(crate) section: Option<String>,
    pub(crate) is_index: bool,
    pub(crate) weight: Option<i64>,
    pub(crate) date: Option<NaiveDateTime>,
    pub(crate) draft: bool,
    pub(crate) assets: Vec<Arc<ContentAsset>>,
    markup: Arc<dyn Markup>,
    rendered: OnceLock<Rendered>,
}

impl std::fmt::Debug for ContentPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPage")
            .field("slug", &self.slug)
            .field("url_path", &self.url_path)
            .field("title", &self.title)
            .field("section", &self.section)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

impl ContentPage {
    /// Unique path-derived key (e.g., "blog/post-a", "" for the root index).
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Public URL path including the base path (e.g., "/blog/post-a/").
    #[must_use]
    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    /// Source path relative to the content root.
    #[must_use]
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title for navigation, falling back to [`title`](Self::title).
    #[must_use]
    pub fn navigation_title(&self) -> String {
        self.meta
            .navigation_title()
            .unwrap_or_else(|| self.title.clone())
    }

    /// Front-matter metadata.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Metadata value for `key`, or `default` when absent.
    #[must_use]
    pub fn meta_value(&self, key: &str, default: Value) -> Value {
        self.meta.meta(key, default)
    }

    /// Page type from metadata.
    #[must_use]
    pub fn page_type(&self) -> Option<String> {
        self.meta.page_type()
    }

    /// Ordering weight.
    #[must_use]
    pub fn weight(&self) -> Option<i64> {
        self.weight
    }

    /// Publication date.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }

    /// Whether the page is marked as a draft.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.draft
    }

    /// Key of the owning section; `None` for root pages.
    #[must_use]
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Whether the page comes from an `index` document.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.is_index
    }

    /// Whether the page is the index page of a (non-root) section.
    #[must_use]
    pub fn is_section_index(&self) -> bool {
        self.is_index && !self.slug.is_empty()
    }

    /// Raw body after the front-matter block.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Assets in the page's bundle directory.
    ///
    /// Empty for index pages, which share their section's assets.
    #[must_use]
    pub fn assets(&self) -> &[Arc<ContentAsset>] {
        &self.assets
    }

    /// HTML content, converted on first access.
    pub fn content(&self) -> &str {
        &self.rendered().html
    }

    /// Table of contents, produced with the content.
    pub fn toc(&self) -> &[TocEntry] {
        &self.rendered().toc
    }

    fn rendered(&self) -> &Rendered {
        self.rendered.get_or_init(|| {
            tracing::debug!(slug = %self.slug, "Converting page body");
            self.markup.render(&self.body)
        })
    }
}

/// Builds pages and assets from discovery records.
pub struct PageFactory {
    base_path: String,
    markup: Arc<dyn Markup>,
}

impl PageFactory {
    /// Create a factory.
    ///
    /// # Arguments
    ///
    /// * `base_path` - URL prefix applied to every page (e.g., "/docs" or "")
    /// * `markup` - Body converter shared by all pages
    #[must_use]
    pub fn new(base_path: &str, markup: Arc<dyn Markup>) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_owned(),
            markup,
        }
    }

    /// Convert a document record into a page.
    ///
    /// # Errors
    ///
    /// Returns [`ContentParseError::FrontMatter`] if the front matter is
    /// malformed.
    pub fn page(&self, record: &DocumentRecord) -> Result<ContentPage, ContentParseError> {
        let source_path = path::normalize(&record.path);
        let meta = Meta::decode(&record.front_matter, Path::new(&source_path))?;

        let slug = path::slug_from_path(&source_path);
        let is_index = path::is_index_file(&source_path);
        let section = path::parent(&source_path)
            .filter(|dir| !dir.is_empty())
            .map(str::to_owned);
        let title = meta.title().unwrap_or_else(|| default_title(&slug, is_index));

        Ok(ContentPage {
            url_path: path::url_path(&self.base_path, &slug),
            weight: meta.weight(),
            date: meta.date(),
            draft: meta.draft(),
            source_path,
            slug,
            title,
            meta,
            body: record.body.clone(),
            section,
            is_index,
            assets: Vec::new(),
            markup: Arc::clone(&self.markup),
            rendered: OnceLock::new(),
        })
    }

    /// Convert an asset record into an asset.
    #[must_use]
    pub fn asset(&self, record: &AssetRecord) -> ContentAsset {
        ContentAsset::from_record(record)
    }
}

fn default_title(slug: &str, is_index: bool) -> String {
    if is_index && slug.is_empty() {
        return ROOT_TITLE.to_owned();
    }
    path::title_case(path::file_name(slug))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_storage::{RawFrontMatter, front_matter};

    use super::*;
    use crate::markup::MarkdownMarkup;

    fn factory() -> PageFactory {
        PageFactory::new("", Arc::new(MarkdownMarkup))
    }

    fn record(path: &str, source: &str) -> DocumentRecord {
        let (front_matter, body) = front_matter::split(source);
        DocumentRecord {
            path: path.to_owned(),
            front_matter,
            body: body.to_owned(),
        }
    }

    #[test]
    fn test_page_from_record() {
        let page = factory()
            .page(&record(
                "blog/post-a.dj",
                "---\ntitle: First Post\nweight: 1\ndate: 2024-01-02\n---\n# Hi\n",
            ))
            .unwrap();

        assert_eq!(page.slug(), "blog/post-a");
        assert_eq!(page.url_path(), "/blog/post-a/");
        assert_eq!(page.title(), "First Post");
        assert_eq!(page.weight(), Some(1));
        assert!(page.date().is_some());
        assert_eq!(page.section(), Some("blog"));
        assert!(!page.is_index());
        assert!(!page.is_draft());
    }

    #[test]
    fn test_index_flattening_and_titles() {
        let factory = factory();

        let root = factory.page(&record("index.md", "Welcome")).unwrap();
        let blog = factory.page(&record("blog/index.dj", "Blog")).unwrap();
        let post = factory.page(&record("blog/getting-started.md", "")).unwrap();

        assert_eq!(root.slug(), "");
        assert_eq!(root.url_path(), "/");
        assert_eq!(root.title(), "Home");
        assert_eq!(root.section(), None);
        assert!(!root.is_section_index());
        assert_eq!(blog.slug(), "blog");
        assert_eq!(blog.title(), "Blog");
        assert_eq!(blog.section(), Some("blog"));
        assert!(blog.is_section_index());
        assert_eq!(post.title(), "Getting Started");
    }

    #[test]
    fn test_base_path_applied_to_url() {
        let factory = PageFactory::new("/docs/", Arc::new(MarkdownMarkup));

        let page = factory.page(&record("guide.md", "")).unwrap();

        assert_eq!(page.url_path(), "/docs/guide/");
    }

    #[test]
    fn test_malformed_front_matter_is_fatal() {
        let result = factory().page(&DocumentRecord {
            path: "bad.md".to_owned(),
            front_matter: RawFrontMatter::Block("title: [oops".to_owned()),
            body: String::new(),
        });

        assert!(matches!(
            result,
            Err(ContentParseError::FrontMatter { .. })
        ));
    }

    #[test]
    fn test_content_is_lazy_and_memoized() {
        let page = factory()
            .page(&record("a.md", "## Section\n\nText"))
            .unwrap();

        assert!(page.rendered.get().is_none());
        let first = page.content().as_ptr();

        assert!(page.content().contains(r#"<h2 id="section">"#));
        assert_eq!(page.content().as_ptr(), first);
        assert_eq!(page.toc().len(), 1);
    }

    #[test]
    fn test_navigation_title_falls_back_to_title() {
        let factory = factory();

        let plain = factory.page(&record("a.md", "---\ntitle: A\n---\n")).unwrap();
        let nav = factory
            .page(&record("b.md", "---\ntitle: B\nnavigationTitle: Bee\n---\n"))
            .unwrap();

        assert_eq!(plain.navigation_title(), "A");
        assert_eq!(nav.navigation_title(), "Bee");
    }
}
