//! Configuration management for Quill.
//!
//! Parses `quill.toml` project files with serde and provides auto-discovery of
//! the config file in the working directory and its parents. Relative paths
//! are resolved against the directory holding the config file.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.base_url`
//! - `server.host`
//!
//! ## Example
//!
//! ```toml
//! taxonomies = ["tags", "categories"]
//!
//! [site]
//! title = "My Site"
//! base_url = "${SITE_URL:-https://example.com}"
//! base_path = "/docs"
//!
//! [content]
//! source_dir = "content"
//! ignore = ["drafts/**"]
//!
//! [pagination]
//! per_page = 5
//!
//! [[listings]]
//! section = "blog"
//!
//! [images.presets.thumb]
//! w = 320
//! fit = "cover"
//! ```

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content root directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override draft inclusion.
    pub drafts: Option<bool>,
    /// Override render worker count.
    pub jobs: Option<usize>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Default pagination URL pattern.
pub const DEFAULT_PAGINATION_PATTERN: &str = "page/{n}/";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity.
    pub site: SiteConfig,
    /// Content discovery configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Front-matter keys indexed as taxonomies.
    pub taxonomies: Vec<String>,
    /// Default pagination settings.
    pub pagination: PaginationConfig,
    /// Paginated section listings.
    pub listings: Vec<ListingConfig>,
    /// Live server configuration.
    pub server: ServerConfig,
    /// Image transform configuration (values as parsed from TOML).
    images: ImagesConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Named image transform presets, values stringified (set after loading).
    #[serde(skip)]
    pub image_presets: BTreeMap<String, BTreeMap<String, String>>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title exposed to templates.
    pub title: String,
    /// Public origin (e.g., `https://example.com`), used for absolute URLs.
    pub base_url: String,
    /// Path prefix every URL is published under (e.g., `/docs`).
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quill Site".to_owned(),
            base_url: String::new(),
            base_path: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
    extensions: Option<Vec<String>>,
    ignore: Vec<String>,
    drafts: bool,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug)]
pub struct ContentConfig {
    /// Content root directory.
    pub source_dir: PathBuf,
    /// Document extensions without the dot.
    pub extensions: Vec<String>,
    /// Glob patterns excluded from discovery.
    pub ignore: Vec<String>,
    /// Whether draft pages are included in the graph.
    pub drafts: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("content"),
            extensions: default_extensions(),
            ignore: Vec::new(),
            drafts: false,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_owned(), "dj".to_owned()]
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
    templates_dir: Option<String>,
    static_dirs: Option<Vec<String>>,
    jobs: usize,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory rendered pages are written to.
    pub output_dir: PathBuf,
    /// Directory holding template files.
    pub templates_dir: PathBuf,
    /// Directories copied verbatim into the output and served live.
    pub static_dirs: Vec<PathBuf>,
    /// Render worker count (0 = number of CPUs).
    pub jobs: usize,
}

/// Default pagination settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// URL segment pattern for pages after the first; must contain `{n}`.
    pub pattern: String,
    /// Items per page when a listing doesn't override it.
    pub per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PAGINATION_PATTERN.to_owned(),
            per_page: 10,
        }
    }
}

/// A paginated listing of one section's pages.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    /// Section key (e.g., "blog").
    pub section: String,
    /// Items per page, defaults to `pagination.per_page`.
    #[serde(default)]
    pub per_page: Option<usize>,
    /// Template override for the listing pages.
    #[serde(default)]
    pub template: Option<String>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ImagesConfigRaw {
    presets: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn require_pattern(pattern: &str, field: &str) -> Result<(), ConfigError> {
    if !pattern.contains("{n}") {
        return Err(ConfigError::Validation(format!(
            "{field} must contain the {{n}} placeholder"
        )));
    }
    Ok(())
}

fn require_per_page(per_page: usize, field: &str) -> Result<(), ConfigError> {
    if per_page == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be at least 1"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// an environment variable is unset, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Base path normalised to `""` or `/prefix` without a trailing slash.
    #[must_use]
    pub fn base_path(&self) -> String {
        let trimmed = self.site.base_path.trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            trimmed.to_owned()
        }
    }

    /// Items per page for a listing, falling back to the pagination default.
    #[must_use]
    pub fn listing_per_page(&self, listing: &ListingConfig) -> usize {
        listing.per_page.unwrap_or(self.pagination.per_page)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(drafts) = settings.drafts {
            self.content_resolved.drafts = drafts;
        }
        if let Some(jobs) = settings.jobs {
            self.build_resolved.jobs = jobs;
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            content: ContentConfigRaw::default(),
            build: BuildConfigRaw::default(),
            taxonomies: Vec::new(),
            pagination: PaginationConfig::default(),
            listings: Vec::new(),
            server: ServerConfig::default(),
            images: ImagesConfigRaw::default(),
            content_resolved: ContentConfig::default(),
            build_resolved: BuildConfig::default(),
            image_presets: BTreeMap::new(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.resolve_presets();
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_pagination()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        if !self.site.base_url.is_empty() {
            require_http_url(&self.site.base_url, "site.base_url")?;
        }
        if !self.site.base_path.is_empty() && !self.site.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "site.base_path must start with /".to_owned(),
            ));
        }
        if self.content_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_pagination(&self) -> Result<(), ConfigError> {
        require_pattern(&self.pagination.pattern, "pagination.pattern")?;
        require_per_page(self.pagination.per_page, "pagination.per_page")?;
        for listing in &self.listings {
            require_non_empty(&listing.section, "listings.section")?;
            if let Some(per_page) = listing.per_page {
                require_per_page(per_page, "listings.per_page")?;
            }
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.base_url = expand::expand_env(&self.site.base_url, "site.base_url")?;
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            source_dir: resolve(self.content.source_dir.as_deref(), "content"),
            extensions: self
                .content
                .extensions
                .clone()
                .unwrap_or_else(default_extensions),
            ignore: self.content.ignore.clone(),
            drafts: self.content.drafts,
        };

        let static_dirs = match &self.build.static_dirs {
            Some(dirs) => dirs.iter().map(|d| config_dir.join(d)).collect(),
            None => vec![config_dir.join("static")],
        };
        self.build_resolved = BuildConfig {
            output_dir: resolve(self.build.output_dir.as_deref(), "public"),
            templates_dir: resolve(self.build.templates_dir.as_deref(), "templates"),
            static_dirs,
            jobs: self.build.jobs,
        };
    }

    fn resolve_presets(&mut self) {
        self.image_presets = self
            .images
            .presets
            .iter()
            .map(|(name, params)| {
                let params = params
                    .iter()
                    .map(|(key, value)| {
                        let value = match value {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key.clone(), value)
                    })
                    .collect();
                (name.clone(), params)
            })
            .collect();
    }
}
