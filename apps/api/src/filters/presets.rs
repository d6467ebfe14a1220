//! Preset resolver — named partial filter states for persona and landing pages.
//!
//! Presets are never stored as URLs. They are merged onto the default state
//! through the mutation API and compiled by the same codec as everything else,
//! so a renamed parameter key can't leave a stale preset link behind.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::filters::codec::UrlCodec;
use crate::filters::error::FilterError;
use crate::filters::mutation::{apply, FilterMutation};
use crate::filters::state::FilterState;
use crate::filters::taxonomy::{Facet, TaxonomyRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub slug: String,
    pub label: String,
    pub filters: BTreeMap<Facet, Vec<String>>,
}

impl Preset {
    fn new(slug: &str, label: &str) -> Self {
        Self {
            slug: slug.to_string(),
            label: label.to_string(),
            filters: BTreeMap::new(),
        }
    }

    fn with(mut self, facet: Facet, tokens: &[&str]) -> Self {
        self.filters
            .insert(facet, tokens.iter().map(|t| t.to_string()).collect());
        self
    }

    /// The full state this preset selects: default state plus one `SetCategory` per facet.
    pub fn to_state(&self) -> FilterState {
        self.filters
            .iter()
            .fold(FilterState::default(), |state, (facet, values)| {
                apply(
                    state,
                    FilterMutation::SetCategory {
                        category: *facet,
                        values: values.clone(),
                    },
                )
            })
    }
}

/// Read-only table of presets keyed by slug, in definition order.
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    pub fn from_presets(presets: Vec<Preset>) -> Result<Self, FilterError> {
        let mut seen = HashSet::new();
        for preset in &presets {
            if !seen.insert(preset.slug.as_str()) {
                return Err(FilterError::DuplicatePreset(preset.slug.clone()));
            }
        }
        Ok(Self { presets })
    }

    /// Persona presets shipped with the hub.
    pub fn builtin() -> Self {
        Self {
            presets: builtin_presets(),
        }
    }

    /// Reads a JSON array of presets.
    pub fn load_file(path: &Path) -> Result<Vec<Preset>, FilterError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FilterError::InvalidPresetFile(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| FilterError::InvalidPresetFile(format!("{}: {e}", path.display())))
    }

    /// Adds presets, replacing existing ones that share a slug.
    pub fn merge(self, extra: Vec<Preset>) -> Result<Self, FilterError> {
        let extra = Self::from_presets(extra)?;
        let mut presets = self.presets;
        for preset in extra.presets {
            match presets.iter_mut().find(|p| p.slug == preset.slug) {
                Some(existing) => {
                    info!(slug = %preset.slug, "overriding built-in preset");
                    *existing = preset;
                }
                None => presets.push(preset),
            }
        }
        Ok(Self { presets })
    }

    /// Checks every preset against the registry. Meant to run once at boot.
    pub fn validate(&self, registry: &TaxonomyRegistry) -> Result<(), FilterError> {
        for preset in &self.presets {
            for (facet, values) in &preset.filters {
                for value in values {
                    if !registry.accepts(*facet, value) {
                        return Err(FilterError::UnknownPresetFacetValue {
                            slug: preset.slug.clone(),
                            facet: facet.category_key(),
                            value: value.clone(),
                        });
                    }
                }
            }
            if preset.to_state().is_default() {
                return Err(FilterError::EmptyPreset(preset.slug.clone()));
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, slug: &str) -> Result<&Preset, FilterError> {
        self.presets
            .iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| FilterError::PresetNotFound(slug.to_string()))
    }

    /// Compiles a preset into `base_path` plus its canonical query string.
    pub fn resolve(
        &self,
        codec: &UrlCodec<'_>,
        slug: &str,
        base_path: &str,
    ) -> Result<String, FilterError> {
        let preset = self.get(slug)?;
        Ok(codec.to_url(base_path, &preset.to_state()))
    }

    /// Like `resolve`, but an unknown slug yields the unfiltered base path.
    pub fn resolve_or_base(&self, codec: &UrlCodec<'_>, slug: &str, base_path: &str) -> String {
        match self.resolve(codec, slug, base_path) {
            Ok(url) => url,
            Err(e) => {
                warn!(slug, error = %e, "falling back to unfiltered page");
                base_path.to_string()
            }
        }
    }
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new("for-students", "For students").with(Facet::UserSituation, &["student"]),
        Preset::new("for-graduates", "For graduates").with(Facet::UserSituation, &["graduate"]),
        Preset::new("for-career-changers", "Changing careers")
            .with(Facet::UserSituation, &["career-changer"])
            .with(Facet::Intent, &["change-career"]),
        Preset::new("returning-to-work", "Returning to work")
            .with(Facet::UserSituation, &["returning-parent"]),
        Preset::new("for-foreigners", "Working abroad")
            .with(Facet::UserSituation, &["foreigner"])
            .with(Facet::Language, &["en", "uk"]),
        Preset::new("no-experience", "No experience needed")
            .with(Facet::ExperienceLevel, &["no-experience"]),
        Preset::new("hospitality-jobs", "Hospitality jobs")
            .with(Facet::Industry, &["hospitality"])
            .with(Facet::Intent, &["find-job"]),
        Preset::new("industrial-jobs", "Warehouse and production")
            .with(Facet::Industry, &["industrial", "logistics"]),
        Preset::new("cv-templates", "CV templates")
            .with(Facet::Format, &["template"])
            .with(Facet::DocumentType, &["cv"]),
        Preset::new("interview-prep", "Interview preparation")
            .with(Facet::Intent, &["prepare-interview"])
            .with(Facet::Format, &["guide", "checklist"]),
    ]
}
