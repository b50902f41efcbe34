//! Listing order.
//!
//! Every listing (root pages, section pages, taxonomy terms) uses the same
//! three-level order:
//!
//! 1. `weight` ascending; pages without a weight come after any weighted page
//! 2. `date` descending; pages without a date come after any dated page
//! 3. `slug` ascending

use std::cmp::Ordering;
use std::sync::Arc;

use crate::page::ContentPage;

/// Compare two pages by listing order.
#[must_use]
pub fn compare_pages(a: &ContentPage, b: &ContentPage) -> Ordering {
    compare_weight(a.weight(), b.weight())
        .then_with(|| match (a.date(), b.date()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.slug().cmp(b.slug()))
}

fn compare_weight(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort pages in place by listing order.
pub fn sort_pages(pages: &mut [Arc<ContentPage>]) {
    pages.sort_by(|a, b| compare_pages(a, b));
}

#[cfg(test)]
mod tests {
    use quill_storage::{DocumentRecord, front_matter};

    use super::*;
    use crate::markup::MarkdownMarkup;
    use crate::page::PageFactory;

    fn page(slug: &str, front_matter: &str) -> Arc<ContentPage> {
        let source = format!("---\n{front_matter}\n---\n");
        let (front_matter, body) = front_matter::split(&source);
        let factory = PageFactory::new("", Arc::new(MarkdownMarkup));
        Arc::new(
            factory
                .page(&DocumentRecord {
                    path: format!("{slug}.md"),
                    front_matter,
                    body: body.to_owned(),
                })
                .unwrap(),
        )
    }

    fn slugs(pages: &[Arc<ContentPage>]) -> Vec<&str> {
        pages.iter().map(|p| p.slug()).collect()
    }

    #[test]
    fn test_weight_beats_date_and_slug() {
        let mut pages = vec![
            page("a", "weight: 2\ndate: 2030-01-01"),
            page("z", "weight: 1\ndate: 2000-01-01"),
        ];

        sort_pages(&mut pages);

        assert_eq!(slugs(&pages), vec!["z", "a"]);
    }

    #[test]
    fn test_missing_weight_sorts_last() {
        let mut pages = vec![page("a", "title: A"), page("b", "weight: 100")];

        sort_pages(&mut pages);

        assert_eq!(slugs(&pages), vec!["b", "a"]);
    }

    #[test]
    fn test_equal_weight_recent_date_first() {
        let mut pages = vec![
            page("old", "weight: 1\ndate: 2020-01-01"),
            page("new", "weight: 1\ndate: 2024-01-01"),
            page("undated", "weight: 1"),
        ];

        sort_pages(&mut pages);

        assert_eq!(slugs(&pages), vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_slug_breaks_ties() {
        let mut pages = vec![
            page("c", "date: 2024-01-01"),
            page("a", "date: 2024-01-01"),
            page("b", "date: 2024-01-01"),
        ];

        sort_pages(&mut pages);

        assert_eq!(slugs(&pages), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_negative_weights_sort_first() {
        let mut pages = vec![page("zero", "weight: 0"), page("neg", "weight: -5")];

        sort_pages(&mut pages);

        assert_eq!(slugs(&pages), vec!["neg", "zero"]);
    }
}
