use thiserror::Error;

/// Errors raised by the filter engine.
///
/// Two kinds exist. Configuration errors are code-time inconsistencies in the
/// registry or preset table and should be caught by tests or at boot. The
/// not-found kind is a runtime lookup miss for a preset slug and is surfaced
/// to the caller so it can fall back to an unfiltered page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown facet category key '{0}'")]
    UnknownFacet(String),

    #[error("facet '{0}' is registered more than once")]
    DuplicateFacet(&'static str),

    #[error("facet '{0}' has no registered parameter key")]
    MissingFacet(&'static str),

    #[error("parameter key '{0}' is used by more than one facet")]
    DuplicateParamKey(String),

    #[error("parameter key '{0}' is reserved")]
    ReservedParamKey(String),

    #[error("preset '{slug}' references unknown value '{value}' for facet '{facet}'")]
    UnknownPresetFacetValue {
        slug: String,
        facet: &'static str,
        value: String,
    },

    #[error("preset '{0}' selects no filters")]
    EmptyPreset(String),

    #[error("preset '{0}' is defined more than once")]
    DuplicatePreset(String),

    #[error("invalid preset file: {0}")]
    InvalidPresetFile(String),

    #[error("preset '{0}' not found")]
    PresetNotFound(String),
}

impl FilterError {
    /// True for the code-time inconsistency kind, false for runtime lookup misses.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, FilterError::PresetNotFound(_))
    }
}
