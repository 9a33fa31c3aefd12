//! Globals and Hall of Fame endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use super::{no_cache_headers, LimitParams};
use crate::api::websocket::state::AppState;

/// GET /api/globals - Newest globals first
pub async fn list_globals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let globals = state.store.read().newest_first(params.normalized_limit());
    (no_cache_headers(), Json(globals))
}

/// GET /api/hofs - Newest Hall of Fame globals first
pub async fn list_hofs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let hofs = state.store.read().hofs_newest_first(params.normalized_limit());
    (no_cache_headers(), Json(hofs))
}
