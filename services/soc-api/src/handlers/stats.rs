//! Global statistics handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use tile_index::GlobalStats;

use crate::state::AppState;

/// GET /stats - statistics computed once at startup
pub async fn stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<GlobalStats> {
    state.metrics.record_stats_query();
    Json(*state.service.stats())
}
