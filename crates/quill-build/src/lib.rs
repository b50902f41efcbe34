//! Static site output for Quill.
//!
//! Renders every route of a [`Site`] on a bounded worker pool and writes the
//! results under the output directory, then copies content assets and static
//! directories next to them.
//!
//! # Failure policy
//!
//! A route that fails to render is recorded in the [`BuildReport`] and does
//! not stop other routes. Failing to write output is fatal.
//!
//! # Example
//!
//! ```ignore
//! let report = quill_build::build(&site, &storage, &BuildOptions::new("public"))?;
//! if !report.is_success() {
//!     for failure in &report.failures {
//!         eprintln!("{failure}");
//!     }
//! }
//! ```

mod error;
mod output;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use quill_site::{RouteTarget, Site};
use quill_storage::Storage;
use rayon::prelude::*;

pub use error::{BuildError, PageFailure};

/// Where and how to write a build.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Directory receiving the rendered site.
    pub output_dir: PathBuf,
    /// Directories copied verbatim into the output root.
    pub static_dirs: Vec<PathBuf>,
    /// Worker threads; 0 uses one per CPU.
    pub jobs: usize,
}

impl BuildOptions {
    /// Options writing to `output_dir` with defaults otherwise.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            static_dirs: Vec::new(),
            jobs: 0,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages_written: usize,
    pub assets_copied: usize,
    pub static_files_copied: usize,
    /// Routes that failed to render, in route order.
    pub failures: Vec<PageFailure>,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Check whether every route rendered.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render and write the whole site.
///
/// # Arguments
///
/// * `site` - Site to render
/// * `storage` - Storage the site was discovered from, used to copy assets
/// * `options` - Output location and parallelism
///
/// # Errors
///
/// Returns [`BuildError`] if the worker pool can't be created or output
/// can't be written. Render failures are reported in [`BuildReport`].
pub fn build(
    site: &Site,
    storage: &dyn Storage,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()?;

    let routes = site.routes();
    tracing::info!(
        routes = routes.len(),
        threads = pool.current_num_threads(),
        output = %options.output_dir.display(),
        "Building site"
    );

    let results = pool.install(|| {
        routes
            .par_iter()
            .map(|target| render_route(site, target, options))
            .collect::<Result<Vec<_>, BuildError>>()
    })?;

    let mut report = BuildReport::default();
    for result in results {
        match result {
            Ok(()) => report.pages_written += 1,
            Err(failure) => {
                tracing::warn!(url = %failure.url_path, error = %failure.error, "Page failed to render");
                report.failures.push(failure);
            }
        }
    }

    report.assets_copied = copy_assets(site, storage, options)?;
    for dir in &options.static_dirs {
        report.static_files_copied += output::copy_tree(dir, &options.output_dir)?;
    }
    report.elapsed = started.elapsed();

    tracing::info!(
        pages = report.pages_written,
        failed = report.failures.len(),
        assets = report.assets_copied,
        static_files = report.static_files_copied,
        elapsed_ms = report.elapsed.as_millis(),
        "Build finished"
    );

    Ok(report)
}

/// Render one route; the outer error is fatal, the inner one is per-page.
fn render_route(
    site: &Site,
    target: &RouteTarget,
    options: &BuildOptions,
) -> Result<Result<(), PageFailure>, BuildError> {
    let html = match site.render(&target.route) {
        Ok(html) => html,
        Err(error) => {
            return Ok(Err(PageFailure {
                url_path: target.url_path.clone(),
                error,
            }));
        }
    };
    let path = options.output_dir.join(&target.output_path);
    output::write_atomic(&path, html.as_bytes())?;
    tracing::debug!(url = %target.url_path, path = %path.display(), "Page written");
    Ok(Ok(()))
}

fn copy_assets(
    site: &Site,
    storage: &dyn Storage,
    options: &BuildOptions,
) -> Result<usize, BuildError> {
    let assets = site.graph().assets();
    for asset in &assets {
        let bytes = storage.read_asset(&asset.relative_path)?;
        let path = options.output_dir.join(&asset.relative_path);
        output::write_atomic(&path, &bytes)?;
    }
    Ok(assets.count())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use quill_site::{ListingSettings, MarkdownMarkup, MiniJinjaEngine, SiteSettings};
    use quill_storage::MockStorage;
    use quill_storage_fs::FsStorage;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn site(storage: &dyn Storage, settings: SiteSettings) -> Site {
        let templates = MiniJinjaEngine::from_templates([
            ("page.html", "<h1>{{ page.title }}</h1>{{ content }}"),
            ("list.html", "{% for p in paginator.items %}{{ p.title }} {% endfor %}"),
        ])
        .unwrap();
        Site::load(storage, settings, Arc::new(MarkdownMarkup), Arc::new(templates)).unwrap()
    }

    #[test]
    fn test_build_writes_pages_and_assets() {
        let dir = create_test_dir();
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("blog/post")).unwrap();
        fs::write(content.join("index.md"), "---\ntitle: Home\n---\nHi").unwrap();
        fs::write(content.join("blog/post.md"), "---\ntitle: Post\n---\nBody").unwrap();
        fs::write(content.join("blog/post/cover.jpg"), "jpg").unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/robots.txt"), "ok").unwrap();
        let storage = FsStorage::new(content);
        let site = site(&storage, SiteSettings::default());
        let options = BuildOptions {
            output_dir: dir.path().join("public"),
            static_dirs: vec![dir.path().join("static")],
            jobs: 2,
        };

        let report = build(&site, &storage, &options).unwrap();

        assert!(report.is_success());
        assert_eq!(report.pages_written, 2);
        assert_eq!(report.assets_copied, 1);
        assert_eq!(report.static_files_copied, 1);
        let home = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(home.starts_with("<h1>Home</h1>"));
        assert!(dir.path().join("public/blog/post/index.html").is_file());
        assert!(dir.path().join("public/blog/post/cover.jpg").is_file());
        assert!(dir.path().join("public/robots.txt").is_file());
    }

    #[test]
    fn test_failed_page_does_not_stop_others() {
        let dir = create_test_dir();
        let storage = MockStorage::new()
            .with_document("good.md", "Good")
            .with_document("bad.md", "---\ntemplate: missing.html\n---\n");
        let site = site(&storage, SiteSettings::default());

        let report = build(&site, &storage, &BuildOptions::new(dir.path())).unwrap();

        assert_eq!(report.pages_written, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url_path, "/bad/");
        assert!(dir.path().join("good/index.html").is_file());
        assert!(!dir.path().join("bad/index.html").exists());
    }

    #[test]
    fn test_listing_pages_written() {
        let dir = create_test_dir();
        let mut storage = MockStorage::new();
        for i in 0..5 {
            storage = storage.with_document(format!("news/item-{i}.md"), "");
        }
        let settings = SiteSettings {
            listings: vec![ListingSettings {
                section: "news".to_owned(),
                per_page: 2,
                template: None,
            }],
            ..SiteSettings::default()
        };
        let site = site(&storage, settings);

        let report = build(&site, &storage, &BuildOptions::new(dir.path())).unwrap();

        assert!(report.is_success());
        assert_eq!(
            fs::read_to_string(dir.path().join("news/page/3/index.html")).unwrap(),
            "Item 4 "
        );
        assert!(dir.path().join("news/index.html").is_file());
    }
}
