//! Taxonomy registry — the fixed vocabulary of filterable facets.
//!
//! Every facet has exactly one query parameter key and every parameter key
//! belongs to exactly one facet. The bijection is checked once when the
//! registry is built, so the rest of the engine can translate in either
//! direction without re-validating.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::filters::error::FilterError;

/// Query parameter carrying the free-text search.
pub const SEARCH_PARAM: &str = "q";
/// Query parameter carrying the sort mode.
pub const SORT_PARAM: &str = "sort";

const RESERVED_PARAMS: &[&str] = &[SEARCH_PARAM, SORT_PARAM];

/// Identifier of a filterable category. Serialized as its category key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Industry,
    ExperienceLevel,
    UserSituation,
    Intent,
    Format,
    DocumentType,
    Language,
}

impl Facet {
    pub const COUNT: usize = 7;

    pub const ALL: [Facet; Facet::COUNT] = [
        Facet::Industry,
        Facet::ExperienceLevel,
        Facet::UserSituation,
        Facet::Intent,
        Facet::Format,
        Facet::DocumentType,
        Facet::Language,
    ];

    /// Stable key used in code and JSON payloads.
    pub fn category_key(self) -> &'static str {
        match self {
            Facet::Industry => "industry",
            Facet::ExperienceLevel => "experienceLevel",
            Facet::UserSituation => "userSituation",
            Facet::Intent => "intent",
            Facet::Format => "format",
            Facet::DocumentType => "documentType",
            Facet::Language => "language",
        }
    }

    pub fn from_category_key(key: &str) -> Result<Facet, FilterError> {
        Facet::ALL
            .into_iter()
            .find(|f| f.category_key() == key)
            .ok_or_else(|| FilterError::UnknownFacet(key.to_string()))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Registration of one facet: its URL parameter, display label and accepted tokens.
#[derive(Debug, Clone, Serialize)]
pub struct FacetSpec {
    #[serde(rename = "category")]
    pub facet: Facet,
    pub param_key: &'static str,
    pub label: &'static str,
    pub tokens: &'static [&'static str],
}

impl FacetSpec {
    pub fn accepts(&self, token: &str) -> bool {
        self.tokens.contains(&token)
    }
}

/// Validated facet registry. Declaration order is the canonical encode order.
#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    specs: Vec<FacetSpec>,
    positions: [usize; Facet::COUNT],
}

impl TaxonomyRegistry {
    /// Builds a registry, rejecting anything that breaks the facet ↔ parameter bijection.
    pub fn new(specs: Vec<FacetSpec>) -> Result<Self, FilterError> {
        let mut slots: [Option<usize>; Facet::COUNT] = [None; Facet::COUNT];
        let mut seen_params = HashSet::new();

        for (i, spec) in specs.iter().enumerate() {
            if spec.param_key.is_empty() || RESERVED_PARAMS.contains(&spec.param_key) {
                return Err(FilterError::ReservedParamKey(spec.param_key.to_string()));
            }
            if !seen_params.insert(spec.param_key) {
                return Err(FilterError::DuplicateParamKey(spec.param_key.to_string()));
            }
            let slot = &mut slots[spec.facet.index()];
            if slot.is_some() {
                return Err(FilterError::DuplicateFacet(spec.facet.category_key()));
            }
            *slot = Some(i);
        }

        let mut positions = [0; Facet::COUNT];
        for facet in Facet::ALL {
            positions[facet.index()] =
                slots[facet.index()].ok_or(FilterError::MissingFacet(facet.category_key()))?;
        }

        Ok(Self { specs, positions })
    }

    /// The career hub vocabulary.
    pub fn standard() -> Result<Self, FilterError> {
        Self::new(standard_specs())
    }

    /// Specs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FacetSpec> {
        self.specs.iter()
    }

    pub fn spec(&self, facet: Facet) -> &FacetSpec {
        // positions is total over Facet after `new`
        &self.specs[self.positions[facet.index()]]
    }

    pub fn param_key(&self, facet: Facet) -> &'static str {
        self.spec(facet).param_key
    }

    /// Looks up a facet by its category key. Unknown keys are a configuration error.
    pub fn lookup(&self, category_key: &str) -> Result<&FacetSpec, FilterError> {
        Facet::from_category_key(category_key).map(|facet| self.spec(facet))
    }

    /// Reverse lookup from a URL parameter name. `None` for unknown parameters.
    pub fn by_param(&self, param: &str) -> Option<&FacetSpec> {
        self.specs.iter().find(|s| s.param_key == param)
    }

    pub fn accepts(&self, facet: Facet, token: &str) -> bool {
        self.spec(facet).accepts(token)
    }
}

fn standard_specs() -> Vec<FacetSpec> {
    vec![
        FacetSpec {
            facet: Facet::Industry,
            param_key: "industry",
            label: "Industry",
            tokens: &[
                "industrial",
                "hospitality",
                "retail",
                "logistics",
                "construction",
                "healthcare",
                "office",
                "it",
                "beauty",
                "education",
            ],
        },
        FacetSpec {
            facet: Facet::ExperienceLevel,
            param_key: "level",
            label: "Experience level",
            tokens: &["no-experience", "junior", "mid", "senior"],
        },
        FacetSpec {
            facet: Facet::UserSituation,
            param_key: "situation",
            label: "Your situation",
            tokens: &[
                "student",
                "graduate",
                "career-changer",
                "returning-parent",
                "unemployed",
                "foreigner",
                "senior-worker",
            ],
        },
        FacetSpec {
            facet: Facet::Intent,
            param_key: "intent",
            label: "Goal",
            tokens: &[
                "find-job",
                "change-career",
                "write-cv",
                "prepare-interview",
                "negotiate-salary",
                "learn-skills",
            ],
        },
        FacetSpec {
            facet: Facet::Format,
            param_key: "format",
            label: "Format",
            tokens: &["guide", "checklist", "template", "tool", "quiz"],
        },
        FacetSpec {
            facet: Facet::DocumentType,
            param_key: "type",
            label: "Document type",
            tokens: &[
                "cv",
                "cover-letter",
                "reference-letter",
                "certificate",
                "portfolio",
            ],
        },
        FacetSpec {
            facet: Facet::Language,
            param_key: "lang",
            label: "Language",
            tokens: &["en", "pl", "uk", "de"],
        },
    ]
}
