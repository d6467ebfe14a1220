use axum::{
    extract::{Path, Query, RawQuery, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::checked_base_path;
use crate::errors::AppError;
use crate::filters::{FacetSpec, FilterController, FilterMutation, FilterState, RecordingLocation};
use crate::state::AppState;

#[derive(Serialize)]
pub struct FiltersResponse {
    pub active_filters: FilterState,
    pub active_count: usize,
    pub query: String,
}

/// GET /api/v1/taxonomy
pub async fn handle_taxonomy(State(state): State<AppState>) -> Json<Vec<FacetSpec>> {
    Json(state.registry.iter().cloned().collect())
}

/// GET /api/v1/taxonomy/:category
pub async fn handle_taxonomy_facet(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<FacetSpec>, AppError> {
    Ok(Json(state.registry.lookup(&category)?.clone()))
}

/// GET /api/v1/filters
/// Decodes whatever query string the caller sends and echoes it in canonical form.
pub async fn handle_decode(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<FiltersResponse> {
    let codec = state.codec();
    let filters = codec.decode_str(raw.as_deref().unwrap_or_default());
    Json(FiltersResponse {
        active_count: filters.active_count(),
        query: codec.query_string(&filters),
        active_filters: filters,
    })
}

#[derive(Deserialize)]
pub struct MutateRequest {
    /// Page path; defaults to the hub base path.
    pub path: Option<String>,
    /// Current query string, with or without the leading `?`.
    #[serde(default)]
    pub query: String,
    pub mutation: serde_json::Value,
}

#[derive(Serialize)]
pub struct MutateResponse {
    pub active_filters: FilterState,
    pub active_count: usize,
    pub url: String,
}

/// POST /api/v1/filters/mutate
pub async fn handle_mutate(
    State(state): State<AppState>,
    Json(req): Json<MutateRequest>,
) -> Result<Json<MutateResponse>, AppError> {
    // Only ops that carry a category get it checked; stray fields are ignored.
    let mutation = FilterMutation::deserialize(&req.mutation).map_err(|e| {
        let category = req.mutation.get("category").and_then(|v| v.as_str());
        match category.map(|c| state.registry.lookup(c)) {
            Some(Err(unknown)) => AppError::from(unknown),
            _ => AppError::Validation(format!("Invalid mutation: {e}")),
        }
    })?;

    let path = base_path_or_default(req.path.as_deref(), &state);

    let mut controller =
        FilterController::new(state.codec(), RecordingLocation::new(path, req.query));
    let filters = controller.dispatch(mutation);

    Ok(Json(MutateResponse {
        active_count: filters.active_count(),
        active_filters: filters,
        url: controller.location().url(),
    }))
}

#[derive(Deserialize)]
pub struct BasePathQuery {
    pub base_path: Option<String>,
}

impl BasePathQuery {
    fn resolve(&self, state: &AppState) -> String {
        base_path_or_default(self.base_path.as_deref(), state)
    }
}

/// Caller-supplied path if it stays on this site, else the configured hub base path.
fn base_path_or_default(raw: Option<&str>, state: &AppState) -> String {
    match raw {
        None => state.config.hub_base_path.clone(),
        Some(raw) => checked_base_path(raw).unwrap_or_else(|| {
            warn!(base_path = %raw.escape_debug(), "rejecting off-site base path");
            state.config.hub_base_path.clone()
        }),
    }
}

#[derive(Serialize)]
pub struct PresetLink {
    pub slug: String,
    pub label: String,
    pub url: String,
}

/// GET /api/v1/presets
pub async fn handle_list_presets(
    State(state): State<AppState>,
    Query(params): Query<BasePathQuery>,
) -> Result<Json<Vec<PresetLink>>, AppError> {
    let codec = state.codec();
    let base_path = params.resolve(&state);
    let links = state
        .presets
        .iter()
        .map(|p| -> Result<PresetLink, AppError> {
            Ok(PresetLink {
                slug: p.slug.clone(),
                label: p.label.clone(),
                url: state.presets.resolve(&codec, &p.slug, &base_path)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(links))
}

/// GET /api/v1/presets/:slug
pub async fn handle_resolve_preset(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<BasePathQuery>,
) -> Result<Json<PresetLink>, AppError> {
    let preset = state.presets.get(&slug)?;
    let url = state
        .presets
        .resolve(&state.codec(), &slug, &params.resolve(&state))?;
    Ok(Json(PresetLink {
        slug,
        label: preset.label.clone(),
        url,
    }))
}

/// GET /go/:slug
/// Landing-page shortcut. Unknown presets land on the unfiltered base path.
pub async fn handle_preset_redirect(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<BasePathQuery>,
) -> Redirect {
    let url = state
        .presets
        .resolve_or_base(&state.codec(), &slug, &params.resolve(&state));
    Redirect::temporary(&url)
}
