//! Content discovery contract for Quill.
//!
//! This crate provides a [`Storage`] trait for abstracting how content files are
//! found and read. Backends return raw records only; decoding front matter and
//! assembling the site graph is left to `quill-site`. This enables:
//!
//! - **Unit testing** of graph construction without touching the filesystem
//! - **Deterministic input**: every backend returns records sorted by path
//! - **Clean separation** between discovery I/O and content semantics
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `discover()` and `read_asset()` methods
//! - [`DocumentRecord`] / [`AssetRecord`] raw discovery records
//! - [`front_matter::split`] for the `---` delimiter convention
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quill_storage::Storage;
//! use quill_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! let discovery = storage.discover()?;
//! for doc in &discovery.documents {
//!     println!("{}", doc.path);
//! }
//! ```

pub mod front_matter;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use front_matter::RawFrontMatter;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{
    AssetRecord, Discovery, DiscoveryError, DiscoveryErrorKind, DocumentRecord, Storage,
};
