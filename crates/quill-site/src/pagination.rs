//! Pagination over collections.
//!
//! Page 1 of a listing lives at the listing's base URL; page `n > 1` appends
//! the configured pattern with `{n}` substituted:
//!
//! ```text
//! /blog/          page 1
//! /blog/page/2/   page 2 with pattern "page/{n}/"
//! ```

use crate::collection::Collection;
use crate::error::InvalidArgument;

/// Placeholder substituted with the page number.
pub const PAGE_PLACEHOLDER: &str = "{n}";

/// Splits collections into numbered pages.
#[derive(Clone, Debug)]
pub struct Paginator {
    pattern: String,
}

impl Paginator {
    /// Create a paginator for a URL pattern such as `page/{n}/`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the pattern has no `{n}` placeholder.
    pub fn new(pattern: &str) -> Result<Self, InvalidArgument> {
        if !pattern.contains(PAGE_PLACEHOLDER) {
            return Err(InvalidArgument(format!(
                "pagination pattern '{pattern}' must contain {PAGE_PLACEHOLDER}"
            )));
        }
        Ok(Self {
            pattern: pattern.trim_start_matches('/').to_owned(),
        })
    }

    /// URL pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Produce the view of one page of `items`.
    ///
    /// Out-of-range page numbers are clamped to `[1, total_pages]`.
    ///
    /// # Arguments
    ///
    /// * `items` - Collection to split
    /// * `page_number` - 1-based page number
    /// * `per_page` - Items per page, at least 1
    /// * `base_url` - URL of page 1
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if `per_page` is 0.
    pub fn paginate<T>(
        &self,
        items: &Collection<T>,
        page_number: usize,
        per_page: usize,
        base_url: &str,
    ) -> Result<PaginatedView<T>, InvalidArgument> {
        if per_page == 0 {
            return Err(InvalidArgument("per_page must be at least 1".to_owned()));
        }

        let total_items = items.count();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page_number = page_number.clamp(1, total_pages);
        let start = (page_number - 1) * per_page;

        Ok(PaginatedView {
            page_number,
            per_page,
            total_pages,
            total_items,
            items: items.slice(start, start + per_page),
            base_url: base_url.to_owned(),
            pattern: self.pattern.clone(),
        })
    }
}

/// One page of a paginated collection.
#[derive(Debug)]
pub struct PaginatedView<T> {
    page_number: usize,
    per_page: usize,
    total_pages: usize,
    total_items: usize,
    items: Collection<T>,
    base_url: String,
    pattern: String,
}

impl<T> Clone for PaginatedView<T> {
    fn clone(&self) -> Self {
        Self {
            page_number: self.page_number,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            items: self.items.clone(),
            base_url: self.base_url.clone(),
            pattern: self.pattern.clone(),
        }
    }
}

impl<T> PaginatedView<T> {
    /// Current 1-based page number.
    #[must_use]
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of pages, never less than 1.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Items on the current page.
    #[must_use]
    pub fn items(&self) -> &Collection<T> {
        &self.items
    }

    /// URL of page `n`; page numbers of 1 or less map to the base URL.
    #[must_use]
    pub fn url(&self, n: usize) -> String {
        page_url(&self.base_url, &self.pattern, n)
    }

    /// URL of the current page.
    #[must_use]
    pub fn current_url(&self) -> String {
        self.url(self.page_number)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    #[must_use]
    pub fn previous_url(&self) -> Option<String> {
        self.has_previous().then(|| self.url(self.page_number - 1))
    }

    #[must_use]
    pub fn next_url(&self) -> Option<String> {
        self.has_next().then(|| self.url(self.page_number + 1))
    }
}

/// Build the URL of page `n` under `base_url`.
#[must_use]
pub fn page_url(base_url: &str, pattern: &str, n: usize) -> String {
    if n <= 1 {
        return base_url.to_owned();
    }
    let mut url = base_url.to_owned();
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str(&pattern.replace(PAGE_PLACEHOLDER, &n.to_string()));
    url
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;

    fn numbers(n: usize) -> Collection<usize> {
        (1..=n).map(Arc::new).collect()
    }

    fn paginator() -> Paginator {
        Paginator::new("page/{n}/").unwrap()
    }

    #[test]
    fn test_pattern_requires_placeholder() {
        let result = Paginator::new("page/");

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_per_page_is_rejected() {
        let result = paginator().paginate(&numbers(3), 1, 0, "/blog/");

        assert!(result.is_err());
    }

    #[test]
    fn test_twenty_five_items_by_ten() {
        let items = numbers(25);

        let first = paginator().paginate(&items, 1, 10, "/blog/").unwrap();
        let last = paginator().paginate(&items, 3, 10, "/blog/").unwrap();

        assert_eq!(first.total_pages(), 3);
        assert_eq!(first.items().count(), 10);
        assert_eq!(last.items().count(), 5);
        assert_eq!(last.items().first().map(|v| **v), Some(21));
        assert_eq!(first.url(1), "/blog/");
        assert_eq!(first.url(2), "/blog/page/2/");
        assert_eq!(first.next_url().as_deref(), Some("/blog/page/2/"));
        assert_eq!(first.previous_url(), None);
        assert!(!last.has_next());
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let view = paginator().paginate(&numbers(0), 1, 10, "/tags/").unwrap();

        assert_eq!(view.total_pages(), 1);
        assert!(view.items().is_empty());
        assert!(!view.has_previous());
        assert!(!view.has_next());
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let items = numbers(25);

        let high = paginator().paginate(&items, 99, 10, "/blog/").unwrap();
        let low = paginator().paginate(&items, 0, 10, "/blog/").unwrap();

        assert_eq!(high.page_number(), 3);
        assert_eq!(low.page_number(), 1);
    }

    #[test]
    fn test_pages_partition_items() {
        for count in [0, 1, 9, 10, 11, 37] {
            for per_page in [1, 3, 10] {
                let items = numbers(count);
                let first = paginator().paginate(&items, 1, per_page, "/").unwrap();

                let mut seen = Vec::new();
                for n in 1..=first.total_pages() {
                    let view = paginator().paginate(&items, n, per_page, "/").unwrap();
                    seen.extend(view.items().iter().map(|v| **v));
                }

                assert_eq!(seen, (1..=count).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_page_urls_are_unique() {
        let view = paginator().paginate(&numbers(50), 1, 5, "/blog/").unwrap();

        let urls: HashSet<String> = (1..=view.total_pages()).map(|n| view.url(n)).collect();

        assert_eq!(urls.len(), view.total_pages());
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        assert_eq!(page_url("/blog", "page/{n}/", 2), "/blog/page/2/");
        assert_eq!(page_url("/blog", "page/{n}/", 1), "/blog");
    }
}
