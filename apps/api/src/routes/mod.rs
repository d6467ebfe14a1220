pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog;
use crate::filters::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Taxonomy
        .route("/api/v1/taxonomy", get(handlers::handle_taxonomy))
        .route("/api/v1/taxonomy/:category", get(handlers::handle_taxonomy_facet))
        // Filter state
        .route("/api/v1/filters", get(handlers::handle_decode))
        .route("/api/v1/filters/mutate", post(handlers::handle_mutate))
        // Presets
        .route("/api/v1/presets", get(handlers::handle_list_presets))
        .route("/api/v1/presets/:slug", get(handlers::handle_resolve_preset))
        .route("/go/:slug", get(handlers::handle_preset_redirect))
        // Catalog
        .route("/api/v1/catalog", get(catalog::handlers::handle_catalog))
        .with_state(state)
}
