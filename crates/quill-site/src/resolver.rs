//! Request path to file resolution with traversal protection.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Maps request paths onto files under a set of root directories.
///
/// Roots are checked in order; the first existing file wins.
#[derive(Clone, Debug)]
pub struct AssetResolver {
    roots: Vec<PathBuf>,
}

impl AssetResolver {
    /// Create a resolver over `roots`.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve a URL path to a canonical file path.
    ///
    /// Returns `None` if the path is malformed, escapes its root through `..`
    /// segments or symlinks, or names no regular file.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let resolver = AssetResolver::new(vec![PathBuf::from("static")]);
    /// assert!(resolver.resolve("/../secret.txt").is_none());
    /// ```
    #[must_use]
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = sanitize(request_path)?;
        self.roots
            .iter()
            .find_map(|root| resolve_under(root, &relative))
    }

    /// Root-relative key a request path names, with `/` separators.
    ///
    /// `None` for the same malformed or escaping paths [`Self::resolve`]
    /// rejects.
    #[must_use]
    pub fn request_key(request_path: &str) -> Option<String> {
        let relative = sanitize(request_path)?;
        let segments: Vec<_> = relative.iter().map(|s| s.to_string_lossy()).collect();
        Some(segments.join("/"))
    }
}

/// Decode and normalise a request path into safe relative segments.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            // Drive prefixes such as `C:`.
            s if s.contains(':') => return None,
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.iter().collect())
}

fn resolve_under(root: &Path, relative: &Path) -> Option<PathBuf> {
    let canonical = root.join(relative).canonicalize().ok()?;
    let canonical_root = root.canonicalize().ok()?;

    if canonical.starts_with(&canonical_root) && canonical.is_file() {
        Some(canonical)
    } else {
        tracing::debug!(path = %relative.display(), "Asset outside root or not a file");
        None
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content/blog")).unwrap();
        fs::create_dir_all(dir.path().join("static/css")).unwrap();
        fs::write(dir.path().join("content/blog/cover.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("static/css/site.css"), b"css").unwrap();
        fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        dir
    }

    fn resolver(dir: &Path) -> AssetResolver {
        AssetResolver::new(vec![dir.join("content"), dir.join("static")])
    }

    #[test]
    fn test_resolves_across_roots() {
        let dir = create_test_dir();
        let resolver = resolver(dir.path());

        let cover = resolver.resolve("/blog/cover.jpg").unwrap();
        let css = resolver.resolve("/css/site.css").unwrap();

        assert!(cover.ends_with("content/blog/cover.jpg"));
        assert!(css.ends_with("static/css/site.css"));
    }

    #[test]
    fn test_percent_decoding() {
        let dir = create_test_dir();
        fs::write(dir.path().join("static/my file.txt"), b"x").unwrap();

        let found = resolver(dir.path()).resolve("/my%20file.txt");

        assert!(found.is_some());
    }

    #[test]
    fn test_traversal_is_rejected() {
        let dir = create_test_dir();
        let resolver = resolver(dir.path());

        assert!(resolver.resolve("/../secret.txt").is_none());
        assert!(resolver.resolve("/%2e%2e/secret.txt").is_none());
        assert!(resolver.resolve("/blog/../../secret.txt").is_none());
        assert!(resolver.resolve("/..%5csecret.txt").is_none());
    }

    #[test]
    fn test_inner_parent_segments_stay_inside() {
        let dir = create_test_dir();

        let found = resolver(dir.path()).resolve("/blog/../blog/cover.jpg");

        assert!(found.is_some());
    }

    #[test]
    fn test_drive_and_directory_paths_rejected() {
        let dir = create_test_dir();
        let resolver = resolver(dir.path());

        assert!(resolver.resolve("/C:/windows/win.ini").is_none());
        assert!(resolver.resolve("/blog/").is_none());
        assert!(resolver.resolve("/").is_none());
        assert!(resolver.resolve("/missing.png").is_none());
    }

    #[test]
    fn test_request_key() {
        assert_eq!(
            AssetResolver::request_key("/blog/./post%20a/../cover.jpg").as_deref(),
            Some("blog/cover.jpg")
        );
        assert_eq!(
            AssetResolver::request_key("/.private/key.txt").as_deref(),
            Some(".private/key.txt")
        );
        assert_eq!(AssetResolver::request_key("/../secret.txt"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            dir.path().join("static/leak.txt"),
        )
        .unwrap();

        let found = resolver(dir.path()).resolve("/leak.txt");

        assert!(found.is_none());
    }
}
