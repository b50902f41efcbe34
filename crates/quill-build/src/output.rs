//! Output file helpers.

use std::fs;
use std::io::Write;
use std::path::Path;

use ignore::WalkBuilder;
use tempfile::NamedTempFile;

use crate::error::BuildError;

/// Write `contents` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`, so readers never observe a truncated file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| BuildError::io(dir, e))?;
    file.write_all(contents)
        .map_err(|e| BuildError::io(file.path(), e))?;
    file.persist(path)
        .map_err(|e| BuildError::io(path, e.error))?;
    Ok(())
}

/// Copy every file under `source` into `target`, preserving relative paths.
///
/// Returns the number of files copied. A missing source directory copies
/// nothing.
pub(crate) fn copy_tree(source: &Path, target: &Path) -> Result<usize, BuildError> {
    if !source.is_dir() {
        tracing::debug!(dir = %source.display(), "Static directory missing, skipping");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkBuilder::new(source).standard_filters(false).build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let contents = fs::read(entry.path()).map_err(|e| BuildError::io(entry.path(), e))?;
        write_atomic(&target.join(relative), &contents)?;
        copied += 1;
    }
    Ok(copied)
}
