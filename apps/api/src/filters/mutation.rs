#![allow(dead_code)]

//! Filter mutation API.
//!
//! Every operation reads the current URL, decodes it, applies one delta and
//! replaces the URL with the canonical encoding of the result. The URL is the
//! only persisted state; the controller keeps no copy of its own.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::filters::codec::UrlCodec;
use crate::filters::state::{FilterState, SortMode};
use crate::filters::taxonomy::Facet;

/// A single requested change to the filter state.
///
/// Tokens are accepted permissively: a value outside the registry's token set
/// is stored and round-tripped like any other. Blank tokens are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterMutation {
    Toggle { category: Facet, value: String },
    SetCategory { category: Facet, values: Vec<String> },
    SetSearch { text: String },
    SetSort { mode: SortMode },
    ClearCategory { category: Facet },
    ClearAll,
    RemoveValue { category: Facet, value: String },
}

/// Merges `mutation` into `state`, producing a new state.
pub fn apply(state: FilterState, mutation: FilterMutation) -> FilterState {
    let (mut selections, mut search, mut sort) = state.into_parts();

    match mutation {
        FilterMutation::Toggle { category, value } => {
            let tokens = selections.entry(category).or_default();
            if !tokens.remove(&value) {
                tokens.insert(value);
            }
        }
        FilterMutation::SetCategory { category, values } => {
            selections.insert(category, values.into_iter().collect());
        }
        FilterMutation::SetSearch { text } => search = text,
        FilterMutation::SetSort { mode } => sort = mode,
        FilterMutation::ClearCategory { category } => {
            selections.remove(&category);
        }
        FilterMutation::ClearAll => return FilterState::default(),
        FilterMutation::RemoveValue { category, value } => {
            if let Some(tokens) = selections.get_mut(&category) {
                tokens.remove(&value);
            }
        }
    }

    FilterState::from_parts(selections, search, sort)
}

#[derive(Debug, Error)]
#[error("navigation failed: {0}")]
pub struct NavigationError(pub String);

/// The routing collaborator holding the current URL.
pub trait Location {
    fn path(&self) -> &str;

    /// Current query string, with or without the leading `?`.
    fn query(&self) -> &str;

    /// Replaces the current history entry. Never pushes a new one.
    fn replace(&mut self, url: &str) -> Result<(), NavigationError>;
}

/// In-memory location that records every replacement.
#[derive(Debug, Clone, Default)]
pub struct RecordingLocation {
    path: String,
    query: String,
    replacements: Vec<String>,
}

impl RecordingLocation {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
            replacements: Vec::new(),
        }
    }

    /// Splits `url` at the first `?`.
    pub fn from_url(url: &str) -> Self {
        let (path, query) = split_url(url);
        Self::new(path, query)
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.path, self.query)
    }

    pub fn replacements(&self) -> &[String] {
        &self.replacements
    }
}

impl Location for RecordingLocation {
    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn replace(&mut self, url: &str) -> Result<(), NavigationError> {
        let (path, query) = split_url(url);
        self.path = path.to_string();
        self.query = query.to_string();
        self.replacements.push(url.to_string());
        Ok(())
    }
}

fn split_url(url: &str) -> (&str, &str) {
    match url.find('?') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    }
}

/// Applies mutations against the URL held by a `Location`.
pub struct FilterController<'r, L> {
    codec: UrlCodec<'r>,
    location: L,
}

impl<'r, L: Location> FilterController<'r, L> {
    pub fn new(codec: UrlCodec<'r>, location: L) -> Self {
        Self { codec, location }
    }

    /// Decoded view of the current URL.
    pub fn active_filters(&self) -> FilterState {
        self.codec.decode_str(self.location.query())
    }

    pub fn active_count(&self) -> usize {
        self.active_filters().active_count()
    }

    /// Applies one mutation and performs exactly one URL replacement.
    ///
    /// A failed replacement is logged and otherwise ignored: the returned state
    /// and the displayed URL diverge until the next navigation.
    pub fn dispatch(&mut self, mutation: FilterMutation) -> FilterState {
        let next = apply(self.active_filters(), mutation);
        let url = self.codec.to_url(self.location.path(), &next);
        if let Err(e) = self.location.replace(&url) {
            warn!(url = %url, error = %e, "URL replacement failed");
        }
        next
    }

    pub fn toggle(&mut self, category: Facet, value: impl Into<String>) -> FilterState {
        self.dispatch(FilterMutation::Toggle {
            category,
            value: value.into(),
        })
    }

    pub fn set_category<I, T>(&mut self, category: Facet, values: I) -> FilterState
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.dispatch(FilterMutation::SetCategory {
            category,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn set_search(&mut self, text: impl Into<String>) -> FilterState {
        self.dispatch(FilterMutation::SetSearch { text: text.into() })
    }

    pub fn set_sort(&mut self, mode: SortMode) -> FilterState {
        self.dispatch(FilterMutation::SetSort { mode })
    }

    pub fn clear_category(&mut self, category: Facet) -> FilterState {
        self.dispatch(FilterMutation::ClearCategory { category })
    }

    pub fn clear_all(&mut self) -> FilterState {
        self.dispatch(FilterMutation::ClearAll)
    }

    pub fn remove_value(&mut self, category: Facet, value: impl Into<String>) -> FilterState {
        self.dispatch(FilterMutation::RemoveValue {
            category,
            value: value.into(),
        })
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn into_location(self) -> L {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filters::taxonomy::TaxonomyRegistry;

    fn registry() -> TaxonomyRegistry {
        TaxonomyRegistry::standard().unwrap()
    }

    fn decode(registry: &TaxonomyRegistry, q: &str) -> FilterState {
        UrlCodec::new(registry).decode_str(q)
    }

    struct BrokenLocation {
        attempts: usize,
    }

    impl Location for BrokenLocation {
        fn path(&self) -> &str {
            "/career-hub"
        }

        fn query(&self) -> &str {
            "?industry=retail"
        }

        fn replace(&mut self, _url: &str) -> Result<(), NavigationError> {
            self.attempts += 1;
            Err(NavigationError("router unavailable".into()))
        }
    }

    #[test]
    fn test_scenario_toggle_toggle_search() {
        let registry = registry();
        let mut c = FilterController::new(
            UrlCodec::new(&registry),
            RecordingLocation::new("/career-hub/jobs", ""),
        );
        c.toggle(Facet::Industry, "industrial");
        c.toggle(Facet::ExperienceLevel, "no-experience");
        c.set_search("forklift");

        assert_eq!(c.location().query(), "?industry=industrial&level=no-experience&q=forklift");
        assert_eq!(c.active_count(), 3);
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let registry = registry();
        let starts = [
            "",
            "?industry=industrial&lang=pl&q=cv&sort=newest",
            "?industry=retail",
            "?industry=unlisted-token",
        ];
        for q in starts {
            let s = decode(&registry, q);
            for (facet, token) in [
                (Facet::Industry, "retail"),
                (Facet::Language, "pl"),
                (Facet::Industry, "unlisted-token"),
                (Facet::Format, ""),
            ] {
                let toggle = FilterMutation::Toggle {
                    category: facet,
                    value: token.into(),
                };
                let twice = apply(apply(s.clone(), toggle.clone()), toggle);
                assert_eq!(twice, s, "{q} {token}");
            }
        }
    }

    #[test]
    fn test_remove_value_is_idempotent() {
        let registry = registry();
        let s = decode(&registry, "?industry=retail&industry=it&level=junior");
        let remove = FilterMutation::RemoveValue {
            category: Facet::Industry,
            value: "retail".into(),
        };
        let once = apply(s.clone(), remove.clone());
        let twice = apply(once.clone(), remove);
        assert_eq!(once, twice);
        assert!(!once.contains(Facet::Industry, "retail"));
        assert!(once.contains(Facet::Industry, "it"));

        let absent = FilterMutation::RemoveValue {
            category: Facet::Language,
            value: "de".into(),
        };
        assert_eq!(apply(s.clone(), absent), s);
    }

    #[test]
    fn test_set_and_clear_category() {
        let registry = registry();
        let s = decode(&registry, "?industry=retail&level=junior");
        let set = apply(
            s.clone(),
            FilterMutation::SetCategory {
                category: Facet::Industry,
                values: vec!["it".into(), "office".into(), "it".into()],
            },
        );
        assert_eq!(set.selected(Facet::Industry).collect::<Vec<_>>(), vec!["it", "office"]);

        let cleared = apply(
            set.clone(),
            FilterMutation::ClearCategory {
                category: Facet::Industry,
            },
        );
        let emptied = apply(
            set,
            FilterMutation::SetCategory {
                category: Facet::Industry,
                values: Vec::new(),
            },
        );
        assert_eq!(cleared, emptied);
        assert_eq!(cleared, decode(&registry, "?level=junior"));
    }

    #[test]
    fn test_clear_all_produces_empty_query() {
        let registry = registry();
        let mut c = FilterController::new(
            UrlCodec::new(&registry),
            RecordingLocation::from_url("/career-hub?industry=retail&q=x&sort=popular"),
        );
        let s = c.clear_all();
        assert!(s.is_default());
        assert_eq!(c.location().url(), "/career-hub");
    }

    #[test]
    fn test_every_operation_replaces_exactly_once() {
        let registry = registry();
        let mut c = FilterController::new(
            UrlCodec::new(&registry),
            RecordingLocation::new("/career-hub", ""),
        );
        c.toggle(Facet::Industry, "retail");
        c.set_category(Facet::Language, ["pl", "uk"]);
        c.set_search("cashier");
        c.set_sort(SortMode::Newest);
        c.remove_value(Facet::Language, "uk");
        c.remove_value(Facet::Language, "uk");
        c.clear_category(Facet::Language);
        c.clear_all();

        let urls = c.location().replacements();
        assert_eq!(urls.len(), 8);
        assert_eq!(urls[3], "/career-hub?industry=retail&lang=pl&lang=uk&q=cashier&sort=newest");
        assert_eq!(urls[4], urls[5]);
        assert_eq!(urls[7], "/career-hub");
    }

    #[test]
    fn test_mutations_apply_in_call_order() {
        let registry = registry();
        let mut c = FilterController::new(
            UrlCodec::new(&registry),
            RecordingLocation::new("/career-hub", ""),
        );
        c.set_search("first");
        c.set_search("second");
        assert_eq!(c.active_filters().search(), "second");
    }

    #[test]
    fn test_failed_replacement_is_not_fatal() {
        let registry = registry();
        let mut c = FilterController::new(UrlCodec::new(&registry), BrokenLocation { attempts: 0 });
        let s = c.toggle(Facet::Industry, "it");
        assert!(s.contains(Facet::Industry, "it"));
        assert!(s.contains(Facet::Industry, "retail"));
        assert_eq!(c.into_location().attempts, 1);
    }

    #[test]
    fn test_mutation_deserializes_from_json() {
        let m: FilterMutation = serde_json::from_str(
            r#"{"op":"toggle","category":"experienceLevel","value":"no-experience"}"#,
        )
        .unwrap();
        assert_eq!(
            m,
            FilterMutation::Toggle {
                category: Facet::ExperienceLevel,
                value: "no-experience".into()
            }
        );
        let m: FilterMutation = serde_json::from_str(r#"{"op":"clear_all"}"#).unwrap();
        assert_eq!(m, FilterMutation::ClearAll);
    }
}
