mod catalog;
mod config;
mod errors;
mod filters;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::cache::ResultsCache;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::filters::{PresetTable, TaxonomyRegistry};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Hub API v{}", env!("CARGO_PKG_VERSION"));

    // Registry and presets are validated once; a bad table aborts boot
    let registry = TaxonomyRegistry::standard().context("Taxonomy registry is inconsistent")?;
    info!("Taxonomy registry validated ({} facets)", registry.iter().count());

    let presets = load_presets(&config, &registry)?;
    info!("Preset table loaded ({} presets)", presets.len());

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load_file(path)?,
        None => {
            warn!("CATALOG_PATH not set; serving an empty catalog");
            Catalog::default()
        }
    };
    info!("Catalog loaded ({} records)", catalog.len());

    let state = AppState {
        results: Arc::new(ResultsCache::new(config.results_cache_capacity)),
        config: config.clone(),
        registry: Arc::new(registry),
        presets: Arc::new(presets),
        catalog: Arc::new(catalog),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Built-in presets merged with the optional preset file, checked against the registry.
fn load_presets(config: &Config, registry: &TaxonomyRegistry) -> Result<PresetTable> {
    let mut table = PresetTable::builtin();
    if let Some(path) = &config.presets_path {
        let extra = PresetTable::load_file(path)?;
        info!("Merging {} presets from {}", extra.len(), path.display());
        table = table.merge(extra)?;
    }
    table
        .validate(registry)
        .context("Preset table references values outside the taxonomy")?;
    Ok(table)
}
