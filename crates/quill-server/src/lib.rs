//! Live preview server for Quill.
//!
//! Serves a content directory over HTTP without a build step. Every request
//! reloads the content graph, so edits show up on the next refresh.
//!
//! # Request handling
//!
//! - Paths with a file extension are served from the content directory and
//!   the static directories, in that order. Content files are served only
//!   when discovery lists them as assets, so hidden and ignored files stay
//!   private. Image requests may carry transform parameters
//!   (`?w=400&fm=webp`).
//! - Other paths, and extension paths no file matches, are resolved
//!   against the site routes: `200` with the rendered page, `301` to the
//!   trailing-slash form, or `404`.
//! - Responses carry an `ETag`; a matching `If-None-Match` yields `304`.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quill_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         content_dir: PathBuf::from("content"),
//!         templates_dir: PathBuf::from("templates"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use quill_site::{AssetResolver, ImageTransformer, SiteSettings};
use quill_storage_fs::FsStorage;
use state::AppState;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content source directory.
    pub content_dir: PathBuf,
    /// Document extensions, without the dot.
    pub extensions: Vec<String>,
    /// Glob patterns excluded from discovery.
    pub ignore_patterns: Vec<String>,
    /// Template directory.
    pub templates_dir: PathBuf,
    /// Directories served next to content assets.
    pub static_dirs: Vec<PathBuf>,
    pub settings: SiteSettings,
    /// Image transformer; originals are served when `None`.
    pub transformer: Option<Arc<dyn ImageTransformer>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            content_dir: PathBuf::from("content"),
            extensions: vec!["md".to_owned(), "dj".to_owned()],
            ignore_patterns: Vec::new(),
            templates_dir: PathBuf::from("templates"),
            static_dirs: Vec::new(),
            settings: SiteSettings::default(),
            transformer: None,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("content_dir", &self.content_dir)
            .field("templates_dir", &self.templates_dir)
            .field("static_dirs", &self.static_dirs)
            .field("transformer", &self.transformer.is_some())
            .finish_non_exhaustive()
    }
}

/// Run the server until Ctrl-C.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the address is invalid or can't be bound.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    let app = app::create_router(Arc::new(app_state(config)));

    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app_state(config: ServerConfig) -> AppState {
    let content_files = AssetResolver::new(vec![config.content_dir.clone()]);

    let storage = FsStorage::new(config.content_dir)
        .with_extensions(&config.extensions)
        .with_ignore_patterns(&config.ignore_patterns);

    AppState {
        storage,
        extensions: config.extensions,
        templates_dir: config.templates_dir,
        content_files,
        static_files: AssetResolver::new(config.static_dirs),
        settings: config.settings,
        transformer: config.transformer,
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
