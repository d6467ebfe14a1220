use std::sync::Arc;

use crate::catalog::cache::ResultsCache;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::filters::{PresetTable, TaxonomyRegistry, UrlCodec};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Validated once at boot; read-only afterwards.
    pub registry: Arc<TaxonomyRegistry>,
    pub presets: Arc<PresetTable>,
    pub catalog: Arc<Catalog>,
    pub results: Arc<ResultsCache>,
}

impl AppState {
    pub fn codec(&self) -> UrlCodec<'_> {
        UrlCodec::new(&self.registry)
    }
}
