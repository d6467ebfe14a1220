//! URL codec — the only place that knows how a `FilterState` looks in a query string.
//!
//! Canonical form:
//! - facets in registry declaration order, one `param=token` pair per selected token,
//!   tokens in ascending byte order;
//! - then `q` when the search is non-empty;
//! - then `sort` when it is not `relevance`.
//!
//! Decoding is permissive: unknown parameters are ignored, unknown tokens of a
//! known facet are kept, duplicates collapse. For `q` and `sort` the first usable
//! occurrence wins: the first non-blank search and the first recognized sort mode,
//! with `relevance` when there is none.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::filters::state::{FilterState, SortMode};
use crate::filters::taxonomy::{Facet, TaxonomyRegistry, SEARCH_PARAM, SORT_PARAM};

/// A query string as an ordered list of `(param, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRepresentation(Vec<(String, String)>);

impl QueryRepresentation {
    /// Parses a raw query string, with or without the leading `?`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self(pairs)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes to `?a=1&b=2`, or to an empty string when there are no pairs.
    pub fn to_query_string(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish();
        format!("?{encoded}")
    }
}

impl FromIterator<(String, String)> for QueryRepresentation {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UrlCodec<'a> {
    registry: &'a TaxonomyRegistry,
}

impl<'a> UrlCodec<'a> {
    pub fn new(registry: &'a TaxonomyRegistry) -> Self {
        Self { registry }
    }

    pub fn decode(&self, query: &QueryRepresentation) -> FilterState {
        let mut selections: BTreeMap<Facet, Vec<String>> = BTreeMap::new();
        let mut search: Option<String> = None;
        let mut sort: Option<SortMode> = None;

        for (param, value) in query.pairs() {
            match param.as_str() {
                SEARCH_PARAM => {
                    if search.is_none() && !value.trim().is_empty() {
                        search = Some(value.clone());
                    }
                }
                SORT_PARAM => {
                    if sort.is_none() {
                        sort = SortMode::parse(value);
                    }
                }
                other => match self.registry.by_param(other) {
                    Some(spec) => {
                        if !spec.accepts(value) {
                            tracing::debug!(param = other, token = %value, "keeping unregistered token");
                        }
                        selections.entry(spec.facet).or_default().push(value.clone());
                    }
                    None => tracing::debug!(param = other, "ignoring unknown query parameter"),
                },
            }
        }

        FilterState::from_parts(
            selections,
            search.unwrap_or_default(),
            sort.unwrap_or_default(),
        )
    }

    pub fn decode_str(&self, raw: &str) -> FilterState {
        self.decode(&QueryRepresentation::parse(raw))
    }

    pub fn encode(&self, state: &FilterState) -> QueryRepresentation {
        let mut pairs = Vec::with_capacity(state.active_count() + 1);

        for spec in self.registry.iter() {
            pairs.extend(
                state
                    .selected(spec.facet)
                    .map(|token| (spec.param_key.to_string(), token.to_string())),
            );
        }
        if !state.search().is_empty() {
            pairs.push((SEARCH_PARAM.to_string(), state.search().to_string()));
        }
        if state.sort() != SortMode::Relevance {
            pairs.push((SORT_PARAM.to_string(), state.sort().as_str().to_string()));
        }

        QueryRepresentation(pairs)
    }

    /// Canonical query string for a state, e.g. `?industry=retail&q=cashier`.
    pub fn query_string(&self, state: &FilterState) -> String {
        self.encode(state).to_query_string()
    }

    /// Joins a base path with the canonical query string of `state`.
    /// Any query or fragment already on `base_path` is dropped.
    pub fn to_url(&self, base_path: &str, state: &FilterState) -> String {
        let path = base_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        format!("{path}{}", self.query_string(state))
    }

    /// Rewrites any query string into its canonical form.
    pub fn canonicalize(&self, raw: &str) -> String {
        self.query_string(&self.decode_str(raw))
    }
}
