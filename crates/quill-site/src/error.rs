//! Error types for graph construction and rendering.
//!
//! Construction-phase errors ([`SiteError`]) are fatal: a structurally invalid
//! content graph never produces partial output. Render-phase errors
//! ([`RenderError`]) are scoped to a single route.

use std::path::PathBuf;

use quill_storage::DiscoveryError;

/// Malformed content detected while building pages or the graph.
#[derive(Debug, thiserror::Error)]
pub enum ContentParseError {
    /// Front matter could not be decoded into a mapping.
    #[error("Invalid front matter in {}: {message}", .path.display())]
    FrontMatter {
        /// Relative path of the offending document.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
    /// Two documents resolve to the same slug.
    #[error(
        "Duplicate slug '{slug}': {} and {} publish to the same URL",
        .first.display(),
        .second.display()
    )]
    DuplicateSlug {
        /// The colliding slug.
        slug: String,
        /// Document seen first (path order).
        first: PathBuf,
        /// Document seen second.
        second: PathBuf,
    },
    /// Two content directories differ only by letter case.
    #[error("Section directories '{first}' and '{second}' differ only by case")]
    SectionCaseConflict {
        /// Directory key seen first (sorted order).
        first: String,
        /// Conflicting directory key.
        second: String,
    },
}

/// Caller supplied an argument outside the accepted domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid argument: {0}")]
pub struct InvalidArgument(pub String);

/// Error building a site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Content root couldn't be read.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// Content is structurally invalid.
    #[error(transparent)]
    Content(#[from] ContentParseError),
    /// Site settings are invalid (e.g., a pagination pattern without `{n}`).
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

/// Error rendering a single route.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No route answers the requested path.
    #[error("Route not found: {0}")]
    RouteNotFound(String),
    /// The resolved template doesn't exist.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    /// The template engine failed.
    #[error("Template error in {name}: {message}")]
    Template {
        /// Template identifier.
        name: String,
        /// Engine message, including the source location when known.
        message: String,
    },
    /// Pagination was requested with invalid parameters.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_slug_names_both_files() {
        let err = ContentParseError::DuplicateSlug {
            slug: "blog".to_owned(),
            first: PathBuf::from("blog.md"),
            second: PathBuf::from("blog/index.md"),
        };

        let msg = err.to_string();

        assert!(msg.contains("blog.md"));
        assert!(msg.contains("blog/index.md"));
    }

    #[test]
    fn test_site_error_is_transparent() {
        let err = SiteError::from(ContentParseError::FrontMatter {
            path: PathBuf::from("a.md"),
            message: "bad".to_owned(),
        });

        assert_eq!(err.to_string(), "Invalid front matter in a.md: bad");
    }
}
