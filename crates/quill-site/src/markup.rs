//! Markup conversion seam.
//!
//! Page bodies are converted to HTML by a [`Markup`] implementation. The
//! default [`MarkdownMarkup`] adapter uses `pulldown-cmark` and assigns unique
//! anchor IDs to headings while collecting the table of contents.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Anchor ID for linking.
    pub id: String,
    /// Heading text.
    pub text: String,
}

/// Result of converting a page body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    /// HTML fragment.
    pub html: String,
    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// Converts a document body into an HTML fragment.
pub trait Markup: Send + Sync {
    /// Convert a body. Conversion never fails; malformed markup degrades to text.
    fn render(&self, body: &str) -> Rendered;
}

/// `CommonMark` adapter with GFM tables, footnotes, strikethrough and task lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownMarkup;

impl MarkdownMarkup {
    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
    }
}

impl Markup for MarkdownMarkup {
    fn render(&self, body: &str) -> Rendered {
        let mut ids = HeadingIds::default();
        let mut toc = Vec::new();
        let mut events: Vec<Event<'_>> = Vec::new();
        // Buffered heading: start tag pieces, inner events, plain text.
        let mut heading: Option<(Tag<'_>, Vec<Event<'_>>, String)> = None;

        for event in Parser::new_ext(body, Self::options()) {
            match event {
                Event::Start(tag @ Tag::Heading { .. }) => {
                    heading = Some((tag, Vec::new(), String::new()));
                }
                Event::End(TagEnd::Heading(level)) => {
                    let Some((Tag::Heading { id, classes, attrs, .. }, inner, text)) =
                        heading.take()
                    else {
                        continue;
                    };
                    let text = text.trim().to_owned();
                    let id = match id {
                        Some(explicit) => ids.reserve(&explicit),
                        None => ids.generate(&text),
                    };
                    toc.push(TocEntry {
                        level: heading_level(level),
                        id: id.clone(),
                        text,
                    });
                    events.push(Event::Start(Tag::Heading {
                        level,
                        id: Some(CowStr::from(id)),
                        classes,
                        attrs,
                    }));
                    events.extend(inner);
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                event => match heading.as_mut() {
                    Some((_, inner, text)) => {
                        if let Event::Text(t) | Event::Code(t) = &event {
                            text.push_str(t);
                        }
                        inner.push(event);
                    }
                    None => events.push(event),
                },
            }
        }

        let mut output = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        Rendered { html: output, toc }
    }
}

fn heading_level(level: pulldown_cmark::HeadingLevel) -> u8 {
    use pulldown_cmark::HeadingLevel;
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Unique heading ID allocator.
#[derive(Default)]
struct HeadingIds {
    counts: HashMap<String, usize>,
}

impl HeadingIds {
    fn generate(&mut self, text: &str) -> String {
        let base = match slugify(text) {
            s if s.is_empty() => "section".to_owned(),
            s => s,
        };
        self.reserve(&base)
    }

    fn reserve(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_owned()).or_default();
        let id = match *count {
            0 => base.to_owned(),
            n => format!("{base}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Convert text to a URL-safe anchor.
///
/// Lowercases, collapses whitespace, dashes and underscores into single dashes,
/// and drops other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}
