//! Tile listing for operators.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;
use soc_common::{BoundingBox, Crs};
use tile_index::{MeanPolicy, Tile, TileStats};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TileInfo {
    pub identifier: String,
    pub crs: Crs,
    pub bounds: BoundingBox,
    pub width: usize,
    pub height: usize,
    pub nodata: Option<f64>,
    /// Absent when the tile has no valid pixels.
    pub stats: Option<TileStats>,
}

impl From<&Tile> for TileInfo {
    fn from(tile: &Tile) -> Self {
        let (width, height) = tile.dimensions();
        Self {
            identifier: tile.identifier().to_string(),
            crs: tile.crs(),
            bounds: tile.bounds(),
            width,
            height,
            nodata: tile.nodata(),
            stats: tile.stats().copied(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TilesResponse {
    pub reference_crs: Crs,
    pub mean_policy: MeanPolicy,
    pub count: usize,
    /// In resolution order.
    pub tiles: Vec<TileInfo>,
}

/// GET /tiles
pub async fn tiles_handler(Extension(state): Extension<Arc<AppState>>) -> Json<TilesResponse> {
    let tiles: Vec<TileInfo> = state.service.tiles().iter().map(TileInfo::from).collect();
    Json(TilesResponse {
        reference_crs: state.service.reference_crs(),
        mean_policy: state.service.mean_policy(),
        count: tiles.len(),
        tiles,
    })
}
