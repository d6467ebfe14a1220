//! Catalog of tagged hub content (guides, tools, templates).
//!
//! The catalog is data the filter engine runs over, not part of it: records
//! come from a JSON file and only their facet tags and text are inspected.
//! Within one facet any selected token matches (OR); across facets every
//! filtered facet must match (AND). Records keep file order, the sort mode is
//! passed through to callers untouched.

pub mod cache;
pub mod handlers;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filters::{Facet, FilterState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: BTreeMap<Facet, Vec<String>>,
    #[serde(default)]
    pub published_on: Option<NaiveDate>,
}

impl Record {
    pub fn matches(&self, state: &FilterState) -> bool {
        let facets_match = state.selections().iter().all(|(facet, selected)| {
            self.tags
                .get(facet)
                .is_some_and(|tags| tags.iter().any(|t| selected.contains(t)))
        });
        facets_match && self.matches_search(state.search())
    }

    /// Every whitespace-separated term must appear in the title or summary.
    fn matches_search(&self, search: &str) -> bool {
        let haystack = format!("{} {}", self.title, self.summary).to_lowercase();
        search
            .split_whitespace()
            .all(|term| haystack.contains(&term.to_lowercase()))
    }
}

/// Counts of matching records per facet token.
pub type FacetCounts = BTreeMap<Facet, BTreeMap<String, usize>>;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file '{}'", path.display()))?;
        let records: Vec<Record> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse catalog file '{}'", path.display()))?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filter(&self, state: &FilterState) -> Vec<Record> {
        self.records
            .iter()
            .filter(|r| r.matches(state))
            .cloned()
            .collect()
    }
}

pub fn facet_counts(records: &[Record]) -> FacetCounts {
    let mut counts = FacetCounts::new();
    for record in records {
        for (facet, tags) in &record.tags {
            let per_token = counts.entry(*facet).or_default();
            for tag in tags {
                *per_token.entry(tag.clone()).or_default() += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filters::{TaxonomyRegistry, UrlCodec};

    fn record(slug: &str, title: &str, tags: &[(Facet, &str)]) -> Record {
        let mut map: BTreeMap<Facet, Vec<String>> = BTreeMap::new();
        for (facet, tag) in tags {
            map.entry(*facet).or_default().push(tag.to_string());
        }
        Record {
            slug: slug.to_string(),
            title: title.to_string(),
            summary: String::new(),
            tags: map,
            published_on: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            record(
                "forklift-guide",
                "Forklift operator: first job guide",
                &[
                    (Facet::Industry, "industrial"),
                    (Facet::ExperienceLevel, "no-experience"),
                    (Facet::Format, "guide"),
                ],
            ),
            record(
                "waiter-cv",
                "CV template for waiters",
                &[
                    (Facet::Industry, "hospitality"),
                    (Facet::DocumentType, "cv"),
                    (Facet::Format, "template"),
                ],
            ),
            record(
                "student-jobs",
                "Part-time work while studying",
                &[
                    (Facet::UserSituation, "student"),
                    (Facet::Industry, "hospitality"),
                    (Facet::Industry, "retail"),
                ],
            ),
        ])
    }

    fn slugs(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.slug.as_str()).collect()
    }

    #[test]
    fn test_default_state_matches_everything() {
        let c = catalog();
        assert_eq!(c.filter(&FilterState::default()).len(), c.len());
    }

    #[test]
    fn test_or_within_facet_and_across_facets() {
        let registry = TaxonomyRegistry::standard().unwrap();
        let codec = UrlCodec::new(&registry);
        let c = catalog();

        let any_industry = codec.decode_str("?industry=industrial&industry=retail");
        assert_eq!(slugs(&c.filter(&any_industry)), vec!["forklift-guide", "student-jobs"]);

        let both = codec.decode_str("?industry=hospitality&situation=student");
        assert_eq!(slugs(&c.filter(&both)), vec!["student-jobs"]);
    }

    #[test]
    fn test_search_is_case_insensitive_per_term() {
        let registry = TaxonomyRegistry::standard().unwrap();
        let codec = UrlCodec::new(&registry);
        let c = catalog();
        assert_eq!(slugs(&c.filter(&codec.decode_str("?q=FORKLIFT"))), vec!["forklift-guide"]);
        assert_eq!(slugs(&c.filter(&codec.decode_str("?q=cv+waiters"))), vec!["waiter-cv"]);
        assert!(c.filter(&codec.decode_str("?q=cv+forklift")).is_empty());
        assert_eq!(c.filter(&codec.decode_str("?q=+")).len(), 3);
    }

    #[test]
    fn test_facet_counts() {
        let counts = facet_counts(&catalog().records);
        assert_eq!(counts[&Facet::Industry]["hospitality"], 2);
        assert_eq!(counts[&Facet::Industry]["industrial"], 1);
        assert!(!counts.contains_key(&Facet::Language));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"slug": "a", "title": "A", "tags": {{"language": ["pl"]}}, "published_on": "2024-03-01"}}]"#
        )
        .unwrap();
        let c = Catalog::load_file(file.path()).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.records[0].published_on, NaiveDate::from_ymd_opt(2024, 3, 1));

        let missing = Catalog::load_file(Path::new("/definitely/not/here.json"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_shipped_catalog_uses_registered_tokens() {
        let registry = TaxonomyRegistry::standard().unwrap();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/catalog.json");
        let c = Catalog::load_file(&path).unwrap();
        assert!(!c.is_empty());
        for record in &c.records {
            for (facet, tags) in &record.tags {
                for tag in tags {
                    assert!(registry.accepts(*facet, tag), "{}: {tag}", record.slug);
                }
            }
        }
    }
}
