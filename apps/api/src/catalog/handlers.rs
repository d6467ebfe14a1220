use axum::{
    extract::{RawQuery, State},
    Json,
};
use serde::Serialize;

use crate::catalog::cache::CatalogPage;
use crate::catalog::facet_counts;
use crate::filters::{FilterState, SortMode};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CatalogResponse {
    #[serde(flatten)]
    pub page: CatalogPage,
    pub active_filters: FilterState,
    pub active_count: usize,
    pub query: String,
    pub sort: SortMode,
}

/// GET /api/v1/catalog
pub async fn handle_catalog(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<CatalogResponse> {
    let codec = state.codec();
    let filters = codec.decode_str(raw.as_deref().unwrap_or_default());
    let query = codec.query_string(&filters);

    let page = state.results.get_or_insert_with(&query, || {
        let items = state.catalog.filter(&filters);
        CatalogPage {
            total: items.len(),
            facet_counts: facet_counts(&items),
            items,
        }
    });

    Json(CatalogResponse {
        page: (*page).clone(),
        active_count: filters.active_count(),
        sort: filters.sort(),
        active_filters: filters,
        query,
    })
}
