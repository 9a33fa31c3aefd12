//! Stats endpoint

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};

use super::no_cache_headers;
use crate::api::websocket::state::AppState;

/// GET /api/stats - Stats over the store's filtered view
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.store.read().stats();
    (no_cache_headers(), Json(stats))
}
