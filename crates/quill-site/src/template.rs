//! Template engine seam and the `minijinja` adapter.
//!
//! # Architecture
//!
//! Rendering goes through the [`TemplateEngine`] trait so the orchestrator
//! never depends on a concrete engine. [`MiniJinjaEngine`] exposes the bound
//! [`SiteContext`] to templates as dynamic objects:
//!
//! | Variable    | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | `site`      | query API: `site.url(..)`, `site.section(..)`, ...     |
//! | `page`      | current page, `none` for listings without an index     |
//! | `paginator` | paginated view on listing routes, otherwise `none`     |
//! | `config`    | serialized site settings                               |
//! | `content`   | current page HTML, marked safe                         |
//!
//! Objects are views over `Arc`ed graph nodes, so exposing a page or a
//! section to a template never copies it.

use std::path::Path;
use std::sync::Arc;

use minijinja::value::{Enumerator, Object, from_args};
use minijinja::{Environment, Error, ErrorKind, State, Value, context};

use crate::asset::ContentAsset;
use crate::collection::Collection;
use crate::context::SiteContext;
use crate::error::RenderError;
use crate::page::ContentPage;
use crate::pagination::PaginatedView;
use crate::section::Section;

/// Renders a named template against a bound context.
pub trait TemplateEngine: Send + Sync {
    /// Check whether a template exists.
    fn has_template(&self, name: &str) -> bool;

    /// Render a template.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TemplateNotFound`] for unknown templates and
    /// [`RenderError::Template`] when evaluation fails.
    fn render(&self, name: &str, context: &SiteContext) -> Result<String, RenderError>;
}

/// `minijinja` adapter.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl std::fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaEngine").finish_non_exhaustive()
    }
}

impl MiniJinjaEngine {
    /// Load templates lazily from a directory.
    #[must_use]
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir));
        Self { env }
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if a template fails to parse.
    pub fn from_templates<I, N, S>(templates: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = Environment::new();
        for (name, source) in templates {
            let name = name.into();
            env.add_template_owned(name.clone(), source.into())
                .map_err(|e| template_error(&name, &e))?;
        }
        Ok(Self { env })
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn has_template(&self, name: &str) -> bool {
        match self.env.get_template(name) {
            Ok(_) => true,
            // Syntax errors surface when rendering.
            Err(e) => e.kind() != ErrorKind::TemplateNotFound,
        }
    }

    fn render(&self, name: &str, context: &SiteContext) -> Result<String, RenderError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| template_error(name, &e))?;

        let page = context.current_page().cloned();
        let content = page
            .as_ref()
            .map_or_else(String::new, |p| p.content().to_owned());
        let vars = context! {
            site => Value::from_object(SiteObject(context.clone())),
            page => Value::from(page.map(page_value)),
            paginator => Value::from(context.pagination().cloned().map(paginator_value)),
            config => Value::from_serialize(context.settings()),
            content => Value::from_safe_string(content),
        };

        template.render(vars).map_err(|e| template_error(name, &e))
    }
}

fn template_error(name: &str, err: &Error) -> RenderError {
    if err.kind() == ErrorKind::TemplateNotFound {
        return RenderError::TemplateNotFound(name.to_owned());
    }
    RenderError::Template {
        name: name.to_owned(),
        message: err.to_string(),
    }
}

fn unknown_method(kind: &str, method: &str) -> Error {
    Error::new(
        ErrorKind::UnknownMethod,
        format!("{kind} has no method named {method}"),
    )
}

fn page_value(page: Arc<ContentPage>) -> Value {
    Value::from_object(PageObject(page))
}

fn section_value(section: Arc<Section>) -> Value {
    Value::from_object(SectionObject(section))
}

fn paginator_value(view: PaginatedView<ContentPage>) -> Value {
    Value::from_object(PaginatorObject(view))
}

fn pages_value(pages: &Collection<ContentPage>) -> Value {
    pages.iter().cloned().map(page_value).collect()
}

fn assets_value(assets: &Collection<ContentAsset>) -> Value {
    assets
        .iter()
        .map(|a| Value::from_serialize(a.as_ref()))
        .collect()
}

/// Recover a page collection from a template sequence of page objects.
fn pages_from_value(value: &Value) -> Result<Collection<ContentPage>, Error> {
    let mut pages = Vec::new();
    for item in value.try_iter()? {
        let page = item.downcast_object_ref::<PageObject>().ok_or_else(|| {
            Error::new(ErrorKind::InvalidOperation, "expected a sequence of pages")
        })?;
        pages.push(Arc::clone(&page.0));
    }
    Ok(Collection::new(pages))
}

/// `site` template variable.
#[derive(Debug)]
struct SiteObject(SiteContext);

impl Object for SiteObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let ctx = &self.0;
        let settings = ctx.settings();
        let value = match key.as_str()? {
            "title" => Value::from(settings.title.clone()),
            "base_url" => Value::from(settings.base_url.clone()),
            "base_path" => Value::from(settings.base_path.clone()),
            "version" => Value::from(ctx.version()),
            "current_url" => Value::from(ctx.current_url()),
            "root_pages" => pages_value(&ctx.root_pages()),
            "regular_pages" => pages_value(&ctx.regular_pages()),
            "sections" => ctx.sections().iter().cloned().map(section_value).collect(),
            "taxonomies" => settings
                .taxonomies
                .iter()
                .map(|t| Value::from(t.as_str()))
                .collect(),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "title",
            "base_url",
            "base_path",
            "version",
            "current_url",
            "root_pages",
            "regular_pages",
            "sections",
            "taxonomies",
        ])
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let ctx = &self.0;
        match method {
            "url" => {
                let (path, absolute): (&str, Option<bool>) = from_args(args)?;
                Ok(Value::from(ctx.url(path, absolute.unwrap_or(false))))
            }
            "is_current" => {
                let (path,): (&str,) = from_args(args)?;
                Ok(Value::from(ctx.is_current(path)))
            }
            "page" => {
                let (slug,): (&str,) = from_args(args)?;
                Ok(Value::from(ctx.page(slug).cloned().map(page_value)))
            }
            "section" => {
                let (name,): (&str,) = from_args(args)?;
                Ok(Value::from(ctx.section(name).cloned().map(section_value)))
            }
            "taxonomy" => {
                let (name,): (&str,) = from_args(args)?;
                let terms = ctx.taxonomy(name).map_or_else(Vec::new, |t| {
                    t.terms()
                        .iter()
                        .map(|term| {
                            let pages = term.pages();
                            context! {
                                name => term.name(),
                                count => pages.count(),
                                pages => pages_value(&pages),
                            }
                        })
                        .collect()
                });
                Ok(Value::from(terms))
            }
            "taxonomy_term" => {
                let (taxonomy, term): (&str, &str) = from_args(args)?;
                Ok(pages_value(&ctx.taxonomy_term(taxonomy, term)))
            }
            "previous" => Ok(Value::from(ctx.previous().map(page_value))),
            "next" => Ok(Value::from(ctx.next().map(page_value))),
            "previous_in_section" => Ok(Value::from(ctx.previous_in_section().map(page_value))),
            "next_in_section" => Ok(Value::from(ctx.next_in_section().map(page_value))),
            "assets" => {
                let (root,): (Option<&str>,) = from_args(args)?;
                Ok(assets_value(&ctx.assets(root.unwrap_or(""))))
            }
            "page_assets" => {
                let (slug,): (&str,) = from_args(args)?;
                Ok(assets_value(&ctx.page_assets(slug)))
            }
            "assets_for" => {
                let (slug, key): (&str, &str) = from_args(args)?;
                let assets = ctx
                    .page(slug)
                    .map(|page| ctx.assets_for(page, key))
                    .unwrap_or_default();
                Ok(assets_value(&assets))
            }
            "paginate" => {
                let (items, per_page): (Value, Option<usize>) = from_args(args)?;
                let pages = pages_from_value(&items)?;
                let per_page = per_page.unwrap_or(ctx.settings().per_page);
                let view = ctx
                    .paginate(&pages, per_page)
                    .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
                Ok(paginator_value(view))
            }
            _ => Err(unknown_method("site", method)),
        }
    }
}

/// `page` template variable and every page in collections.
#[derive(Debug)]
struct PageObject(Arc<ContentPage>);

impl Object for PageObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let page = &self.0;
        let value = match key.as_str()? {
            "title" => Value::from(page.title()),
            "navigation_title" => Value::from(page.navigation_title()),
            "slug" => Value::from(page.slug()),
            "url" | "url_path" => Value::from(page.url_path()),
            "source_path" => Value::from(page.source_path()),
            "section" => Value::from(page.section()),
            "type" => Value::from(page.page_type()),
            "weight" => Value::from(page.weight()),
            "date" => Value::from(
                page.date()
                    .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ),
            "draft" => Value::from(page.is_draft()),
            "is_index" => Value::from(page.is_index()),
            "is_section_index" => Value::from(page.is_section_index()),
            "meta" => Value::from_serialize(page.meta().as_map()),
            "content" => Value::from_safe_string(page.content().to_owned()),
            "toc" => Value::from_serialize(page.toc()),
            "assets" => page
                .assets()
                .iter()
                .map(|a| Value::from_serialize(a.as_ref()))
                .collect(),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "title",
            "navigation_title",
            "slug",
            "url",
            "source_path",
            "section",
            "type",
            "weight",
            "date",
            "draft",
            "is_index",
            "is_section_index",
            "meta",
            "toc",
            "assets",
        ])
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "meta" => {
                let (key, default): (&str, Option<Value>) = from_args(args)?;
                Ok(self
                    .0
                    .meta()
                    .get(key)
                    .map_or_else(|| default.unwrap_or_default(), Value::from_serialize))
            }
            _ => Err(unknown_method("page", method)),
        }
    }
}

/// Section objects reachable through `site.sections` and `site.section(..)`.
#[derive(Debug)]
struct SectionObject(Arc<Section>);

impl Object for SectionObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let section = &self.0;
        let value = match key.as_str()? {
            "key" => Value::from(section.key()),
            "label" => Value::from(section.label()),
            "url" | "url_path" => Value::from(section.url_path()),
            "parent" => Value::from(section.parent()),
            "index" => Value::from(section.index().cloned().map(page_value)),
            "pages" => pages_value(&section.pages()),
            "regular_pages" => pages_value(&section.regular_pages()),
            "all_pages" => pages_value(&section.all_pages()),
            "count" => Value::from(section.count()),
            "children" => section.children().iter().cloned().map(section_value).collect(),
            "assets" => assets_value(&section.assets()),
            "all_assets" => assets_value(&section.all_assets()),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "key",
            "label",
            "url",
            "parent",
            "index",
            "pages",
            "regular_pages",
            "all_pages",
            "count",
            "children",
            "assets",
            "all_assets",
        ])
    }
}

/// `paginator` template variable.
#[derive(Debug)]
struct PaginatorObject(PaginatedView<ContentPage>);

impl Object for PaginatorObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let view = &self.0;
        let value = match key.as_str()? {
            "page_number" => Value::from(view.page_number()),
            "per_page" => Value::from(view.per_page()),
            "total_pages" => Value::from(view.total_pages()),
            "total_items" => Value::from(view.total_items()),
            "items" => pages_value(view.items()),
            "current_url" => Value::from(view.current_url()),
            "has_previous" => Value::from(view.has_previous()),
            "has_next" => Value::from(view.has_next()),
            "previous_url" => Value::from(view.previous_url()),
            "next_url" => Value::from(view.next_url()),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "page_number",
            "per_page",
            "total_pages",
            "total_items",
            "items",
            "current_url",
            "has_previous",
            "has_next",
            "previous_url",
            "next_url",
        ])
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "url" => {
                let (n,): (usize,) = from_args(args)?;
                Ok(Value::from(self.0.url(n)))
            }
            _ => Err(unknown_method("paginator", method)),
        }
    }
}
