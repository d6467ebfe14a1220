use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::filters::taxonomy::Facet;

/// Result ordering requested by the visitor. Only a label: the engine never ranks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Newest,
    Popular,
    Alphabetical,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Relevance,
        SortMode::Newest,
        SortMode::Popular,
        SortMode::Alphabetical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Newest => "newest",
            SortMode::Popular => "popular",
            SortMode::Alphabetical => "alphabetical",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(s: &str) -> Option<SortMode> {
        SortMode::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

/// What is currently selected, independent of how it travels in a URL.
///
/// Selections are sets, so insertion order never matters. Facets with no
/// selected tokens are not stored at all and blank tokens are dropped, which
/// makes the derived equality semantic equality. Values are never changed in
/// place; see `filters::mutation` for producing new states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    selections: BTreeMap<Facet, BTreeSet<String>>,
    search: String,
    sort: SortMode,
}

impl FilterState {
    /// Builds a normalized state from raw parts.
    ///
    /// Blank values carry no filter: whitespace-only tokens are dropped and a
    /// whitespace-only search becomes empty. Non-blank search text is kept verbatim.
    pub(crate) fn from_parts<I, T>(selections: I, search: String, sort: SortMode) -> Self
    where
        I: IntoIterator<Item = (Facet, T)>,
        T: IntoIterator<Item = String>,
    {
        let mut normalized: BTreeMap<Facet, BTreeSet<String>> = BTreeMap::new();
        for (facet, tokens) in selections {
            normalized
                .entry(facet)
                .or_default()
                .extend(tokens.into_iter().filter(|t| !t.trim().is_empty()));
        }
        normalized.retain(|_, tokens| !tokens.is_empty());

        let search = if search.trim().is_empty() {
            String::new()
        } else {
            search
        };

        Self {
            selections: normalized,
            search,
            sort,
        }
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<Facet, BTreeSet<String>>, String, SortMode) {
        (self.selections, self.search, self.sort)
    }

    /// Non-empty selections, ordered by facet then token.
    pub fn selections(&self) -> &BTreeMap<Facet, BTreeSet<String>> {
        &self.selections
    }

    pub fn selected(&self, facet: Facet) -> impl Iterator<Item = &str> {
        self.selections
            .get(&facet)
            .into_iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
    }

    pub fn contains(&self, facet: Facet, token: &str) -> bool {
        self.selections
            .get(&facet)
            .is_some_and(|tokens| tokens.contains(token))
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Number of selected tokens across all facets, plus one for a non-empty search.
    pub fn active_count(&self) -> usize {
        let selected: usize = self.selections.values().map(BTreeSet::len).sum();
        selected + usize::from(!self.search.is_empty())
    }

    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }
}
