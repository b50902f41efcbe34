//! Content assets.

use quill_storage::AssetRecord;
use serde::Serialize;

use crate::path;

/// Extensions treated as images.
const IMAGE_EXTENSIONS: &[&str] = &[
    "avif", "bmp", "gif", "ico", "jpeg", "jpg", "png", "svg", "tif", "tiff", "webp",
];

/// Non-document file colocated with content.
///
/// Built from stat data only; bytes are read on demand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentAsset {
    /// Path relative to the content root (e.g., "blog/post-a/cover.jpg").
    pub relative_path: String,
    /// File name (e.g., "cover.jpg").
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase extension without the dot, empty when absent.
    pub extension: String,
}

impl ContentAsset {
    /// Build an asset from a discovery record.
    #[must_use]
    pub fn from_record(record: &AssetRecord) -> Self {
        let relative_path = path::normalize(&record.path);
        Self {
            filename: path::file_name(&relative_path).to_owned(),
            extension: path::extension(&relative_path).unwrap_or_default(),
            size: record.size,
            relative_path,
        }
    }

    /// Directory key holding the asset (`""` for the content root).
    #[must_use]
    pub fn directory(&self) -> &str {
        path::parent(&self.relative_path).unwrap_or("")
    }

    /// Check if the asset is an image by extension.
    #[must_use]
    pub fn is_image(&self) -> bool {
        IMAGE_EXTENSIONS.contains(&self.extension.as_str())
    }
}
