//! Taxonomy indexes built from page metadata.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::collection::Collection;
use crate::metadata::scalar_to_string;
use crate::ordering::sort_pages;
use crate::page::ContentPage;

/// One term of a taxonomy and the pages declaring it.
#[derive(Debug)]
pub struct Term {
    pub(crate) name: String,
    pub(crate) pages: Vec<Arc<ContentPage>>,
}

impl Term {
    /// Term value, case preserved.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pages declaring the term, in listing order.
    #[must_use]
    pub fn pages(&self) -> Collection<ContentPage> {
        Collection::new(self.pages.clone())
    }
}

/// A named classification axis (e.g., "tags").
#[derive(Debug)]
pub struct Taxonomy {
    name: String,
    terms: Vec<Term>,
    index: HashMap<String, usize>,
}

impl Taxonomy {
    /// Build a taxonomy by scanning page metadata under `name`.
    ///
    /// Values may be scalars or lists; each value is trimmed and empty values
    /// are dropped. Draft pages never contribute terms. Terms are ordered by
    /// case-insensitive name.
    pub(crate) fn build(name: &str, pages: &[Arc<ContentPage>]) -> Self {
        let mut terms: Vec<Term> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for page in pages.iter().filter(|p| !p.is_draft()) {
            let Some(value) = page.meta().get(name) else {
                continue;
            };
            for term in term_values(value) {
                let slot = *index.entry(term.clone()).or_insert_with(|| {
                    terms.push(Term {
                        name: term.clone(),
                        pages: Vec::new(),
                    });
                    terms.len() - 1
                });
                let pages = &mut terms[slot].pages;
                if !pages.iter().any(|p| Arc::ptr_eq(p, page)) {
                    pages.push(Arc::clone(page));
                }
            }
        }

        for term in &mut terms {
            sort_pages(&mut term.pages);
        }
        terms.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        Self {
            name: name.to_owned(),
            terms,
            index,
        }
    }

    /// Taxonomy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terms in order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Pages declaring `term`; empty for unknown terms.
    #[must_use]
    pub fn pages(&self, term: &str) -> Collection<ContentPage> {
        self.index
            .get(term.trim())
            .map(|&i| self.terms[i].pages())
            .unwrap_or_default()
    }
}

fn term_values(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    };
    raw.into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_term_values() {
        assert_eq!(term_values(&json!(" rust ")), vec!["rust"]);
        assert_eq!(
            term_values(&json!(["a", "", "  ", 2024, true])),
            vec!["a", "2024", "true"]
        );
        assert!(term_values(&json!(null)).is_empty());
        assert!(term_values(&json!({"nested": "map"})).is_empty());
    }
}
