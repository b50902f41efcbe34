//! CLI command implementations.
//!
//! Also the composition root: project configuration is turned into the
//! settings and collaborators the library crates take.

pub(crate) mod build;
pub(crate) mod serve;

pub(crate) use build::BuildArgs;
pub(crate) use serve::ServeArgs;

use quill_config::Config;
use quill_site::{ListingSettings, SiteSettings};
use quill_storage_fs::FsStorage;

/// Site settings for a loaded configuration.
pub(crate) fn site_settings(config: &Config, version: &str) -> SiteSettings {
    let listings = config
        .listings
        .iter()
        .map(|listing| ListingSettings {
            section: listing.section.clone(),
            per_page: config.listing_per_page(listing),
            template: listing.template.clone(),
        })
        .collect();

    SiteSettings {
        title: config.site.title.clone(),
        base_url: Some(config.site.base_url.clone()).filter(|url| !url.is_empty()),
        base_path: config.base_path(),
        version: version.to_owned(),
        drafts: config.content_resolved.drafts,
        taxonomies: config.taxonomies.clone(),
        pagination_pattern: config.pagination.pattern.clone(),
        per_page: config.pagination.per_page,
        listings,
        image_presets: config.image_presets.clone(),
    }
}

/// Filesystem storage for the configured content directory.
pub(crate) fn content_storage(config: &Config) -> FsStorage {
    let content = &config.content_resolved;
    FsStorage::new(content.source_dir.clone())
        .with_extensions(&content.extensions)
        .with_ignore_patterns(&content.ignore)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn load(toml: &str) -> (tempfile::TempDir, Config) {
        let dir = create_test_dir();
        let path = dir.path().join("quill.toml");
        fs::write(&path, toml).unwrap();
        let config = Config::load(Some(&path), None).unwrap();
        (dir, config)
    }

    #[test]
    fn test_site_settings_from_config() {
        let (_dir, config) = load(
            r#"
taxonomies = ["tags"]

[site]
title = "Notes"
base_url = "https://example.org"
base_path = "/docs/"

[pagination]
per_page = 5

[[listings]]
section = "blog"

[[listings]]
section = "news"
per_page = 2
template = "news.html"
"#,
        );

        let settings = site_settings(&config, "1.0.0");

        assert_eq!(settings.title, "Notes");
        assert_eq!(settings.base_url.as_deref(), Some("https://example.org"));
        assert_eq!(settings.base_path, "/docs");
        assert_eq!(settings.version, "1.0.0");
        assert_eq!(settings.taxonomies, vec!["tags"]);
        assert_eq!(settings.listings.len(), 2);
        assert_eq!(settings.listings[0].per_page, 5);
        assert_eq!(settings.listings[1].per_page, 2);
        assert_eq!(settings.listings[1].template.as_deref(), Some("news.html"));
    }

    #[test]
    fn test_empty_base_url_is_none() {
        let (_dir, config) = load("[site]\ntitle = \"Notes\"\n");

        let settings = site_settings(&config, "");

        assert!(settings.base_url.is_none());
        assert_eq!(settings.base_path, "");
    }

    #[test]
    fn test_content_storage_uses_resolved_source_dir() {
        let (dir, config) = load("[content]\nsource_dir = \"pages\"\n");

        let storage = content_storage(&config);

        assert_eq!(storage.source_dir(), dir.path().join("pages"));
    }
}
