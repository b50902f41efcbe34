//! Path and key normalisation.
//!
//! Every component compares paths through this module so filesystem paths,
//! slugs and URL paths share one key space:
//!
//! - keys are `/`-separated without leading or trailing slashes
//! - `.` segments are dropped and `..` pops the previous segment
//! - lookup keys are case-folded
//!
//! Examples:
//! - `"/Blog//post-a/"` -> key `"Blog/post-a"`, lookup key `"blog/post-a"`
//! - `"blog/./a/../b"` -> `"blog/b"`

/// Normalise a filesystem or URL path fragment into a key.
///
/// Backslashes are treated as separators. `..` above the root is dropped.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Case-folded key used for lookups and uniqueness checks.
#[must_use]
pub fn lookup_key(path: &str) -> String {
    normalize(path).to_lowercase()
}

/// Derive a slug from a content file's relative path.
///
/// The extension is removed and an `index` document collapses to its parent
/// directory:
/// - `index.md` -> `""`
/// - `blog/index.dj` -> `"blog"`
/// - `blog/post-a.dj` -> `"blog/post-a"`
#[must_use]
pub fn slug_from_path(relative: &str) -> String {
    let key = normalize(relative);
    let without_ext = strip_extension(&key);
    match without_ext.rsplit_once('/') {
        Some((dir, "index")) => dir.to_owned(),
        None if without_ext == "index" => String::new(),
        _ => without_ext.to_owned(),
    }
}

/// Check whether a document path is an index file (`index.<ext>`).
#[must_use]
pub fn is_index_file(relative: &str) -> bool {
    strip_extension(file_name(relative)) == "index"
}

/// Public URL path for a slug, with the base path prefix.
///
/// The result always starts and ends with `/`:
/// - `("", "")` -> `"/"`
/// - `("", "blog")` -> `"/blog/"`
/// - `("/docs", "blog")` -> `"/docs/blog/"`
#[must_use]
pub fn url_path(base_path: &str, slug: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if slug.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{slug}/")
    }
}

/// Parent key of a key; `None` for the root.
#[must_use]
pub fn parent(key: &str) -> Option<&str> {
    if key.is_empty() {
        return None;
    }
    Some(key.rsplit_once('/').map_or("", |(dir, _)| dir))
}

/// Last segment of a key.
#[must_use]
pub fn file_name(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, name)| name)
}

/// Key without the extension of its last segment.
#[must_use]
pub fn strip_extension(key: &str) -> &str {
    let name = file_name(key);
    match name.rfind('.') {
        Some(0) | None => key,
        Some(dot) => &key[..key.len() - (name.len() - dot)],
    }
}

/// Lowercase extension of a key's last segment, without the dot.
#[must_use]
pub fn extension(key: &str) -> Option<String> {
    let name = file_name(key);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(name[dot + 1..].to_ascii_lowercase()),
    }
}

/// Check if the last segment of a URL path carries a file extension.
#[must_use]
pub fn has_extension(url_path: &str) -> bool {
    let trimmed = url_path.trim_end_matches('/');
    if trimmed.len() != url_path.len() {
        return false;
    }
    extension(trimmed).is_some()
}

/// Check whether `key` equals `dir` or lies beneath it.
#[must_use]
pub fn is_within(key: &str, dir: &str) -> bool {
    dir.is_empty()
        || key == dir
        || key
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Convert a file stem or directory name into a display title.
///
/// Replaces `-` and `_` with spaces and capitalizes each word.
#[must_use]
pub fn title_case(stem: &str) -> String {
    let mut result = String::with_capacity(stem.len());
    for word in stem.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/Blog//post-a/"), "Blog/post-a");
        assert_eq!(normalize("blog/./a/../b"), "blog/b");
        assert_eq!(normalize("../../etc"), "etc");
        assert_eq!(normalize("blog\\post.md"), "blog/post.md");
        assert_eq!(normalize("/"), "");
    }

    #[test]
    fn test_lookup_key_case_folds() {
        assert_eq!(lookup_key("/Blog/Post-A/"), "blog/post-a");
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path("index.md"), "");
        assert_eq!(slug_from_path("blog/index.dj"), "blog");
        assert_eq!(slug_from_path("blog/post-a.dj"), "blog/post-a");
        assert_eq!(slug_from_path("a/b/c.md"), "a/b/c");
        assert_eq!(slug_from_path("index/index.md"), "index");
        assert_eq!(slug_from_path("notes.v2.md"), "notes.v2");
    }

    #[test]
    fn test_is_index_file() {
        assert!(is_index_file("index.md"));
        assert!(is_index_file("blog/index.dj"));
        assert!(!is_index_file("blog/indexes.md"));
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("", ""), "/");
        assert_eq!(url_path("", "blog"), "/blog/");
        assert_eq!(url_path("/docs", "blog/post-a"), "/docs/blog/post-a/");
        assert_eq!(url_path("/docs/", ""), "/docs/");
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("blog/post-a"), Some("blog"));
        assert_eq!(parent("blog"), Some(""));
        assert_eq!(parent(""), None);
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(strip_extension("blog/post.md"), "blog/post");
        assert_eq!(strip_extension("blog/.hidden"), "blog/.hidden");
        assert_eq!(extension("img/Photo.JPG"), Some("jpg".to_owned()));
        assert_eq!(extension("blog/post"), None);
        assert!(has_extension("/css/site.css"));
        assert!(!has_extension("/blog"));
        assert!(!has_extension("/v1.2/"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("blog/post-a/cover.jpg", "blog/post-a"));
        assert!(is_within("blog", "blog"));
        assert!(is_within("anything", ""));
        assert!(!is_within("blog/post-ab/cover.jpg", "blog/post-a"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("post-a"), "Post A");
        assert_eq!(title_case("getting_started"), "Getting Started");
        assert_eq!(title_case(""), "");
    }
}
