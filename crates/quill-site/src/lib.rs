//! Content graph, site query API and render orchestration for Quill.
//!
//! This crate provides:
//! - [`SiteGraph`]: pages, sections, assets and taxonomies built from storage
//! - [`SiteContext`]: the query API bound to one render
//! - [`Site`]: route enumeration, template selection and rendering
//! - [`AssetResolver`]: traversal-safe mapping of request paths to files
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use quill_site::{MarkdownMarkup, MiniJinjaEngine, Route, Site, SiteSettings};
//! use quill_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! let templates = Arc::new(MiniJinjaEngine::from_dir("templates"));
//! let site = Site::load(
//!     &storage,
//!     SiteSettings::default(),
//!     Arc::new(MarkdownMarkup),
//!     templates,
//! )?;
//!
//! // Every page and listing page the site publishes
//! for target in site.routes() {
//!     println!("{}", target.url_path);
//! }
//!
//! // Render a single page
//! let html = site.render(&Route::Page("blog/post-a".to_owned()))?;
//! # Ok(())
//! # }
//! ```

mod asset;
mod collection;
mod context;
mod error;
mod graph;
mod markup;
mod metadata;
mod ordering;
mod page;
mod pagination;
pub mod path;
mod resolver;
mod section;
mod settings;
mod site;
mod taxonomy;
mod template;
mod transform;

pub use asset::ContentAsset;
pub use collection::Collection;
pub use context::SiteContext;
pub use error::{ContentParseError, InvalidArgument, RenderError, SiteError};
pub use graph::{GraphOptions, SiteGraph};
pub use markup::{MarkdownMarkup, Markup, Rendered, TocEntry, slugify};
pub use metadata::{Meta, parse_date};
pub use ordering::{compare_pages, sort_pages};
pub use page::{ContentPage, PageFactory};
pub use pagination::{PaginatedView, Paginator, page_url};
pub use resolver::AssetResolver;
pub use section::Section;
pub use settings::{ListingSettings, SiteSettings};
pub use site::{LiveOutcome, Route, RouteTarget, Site};
pub use taxonomy::{Taxonomy, Term};
pub use template::{MiniJinjaEngine, TemplateEngine};
pub use transform::{Fit, ImageFormat, ImageTransformer, TransformError, TransformParams};
