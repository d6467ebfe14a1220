// Taxonomy-driven filter engine.
// The URL query string is the single source of truth: state is decoded from it,
// mutated as a value, and written back in canonical form.

pub mod codec;
pub mod error;
pub mod handlers;
pub mod mutation;
pub mod presets;
pub mod state;
pub mod taxonomy;

pub use codec::UrlCodec;
pub use error::FilterError;
pub use mutation::{FilterController, FilterMutation, RecordingLocation};
pub use presets::PresetTable;
pub use state::{FilterState, SortMode};
pub use taxonomy::{Facet, FacetSpec, TaxonomyRegistry};
