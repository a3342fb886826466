//! Point query handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::ExceptionResponse;
use crate::metrics::Timer;
use crate::state::AppState;

/// Query parameters for `/soc-stock`. Kept as strings so that missing and
/// malformed values produce our own error body.
#[derive(Debug, Deserialize)]
pub struct SocStockParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SocStockResponse {
    pub soc_stock: f64,
    /// Tile the value was read from.
    pub filename: String,
}

/// GET /soc-stock?lat=..&lon=..
pub async fn soc_stock_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SocStockParams>,
) -> Response {
    let timer = Timer::start();

    let (lat, lon) = match (
        parse_coordinate("lat", params.lat.as_deref()),
        parse_coordinate("lon", params.lon.as_deref()),
    ) {
        (Ok(lat), Ok(lon)) => (lat, lon),
        (Err(exc), _) | (_, Err(exc)) => {
            state
                .metrics
                .record_point_query("InvalidParameterValue", timer.elapsed_us());
            return exc.into_response();
        }
    };

    match state.service.point_query(lat, lon) {
        Ok(measurement) => {
            state.metrics.record_point_query("ok", timer.elapsed_us());
            Json(SocStockResponse {
                soc_stock: measurement.value,
                filename: measurement.source,
            })
            .into_response()
        }
        Err(e) => {
            state
                .metrics
                .record_point_query(e.error_code(), timer.elapsed_us());
            if e.is_client_error() {
                tracing::debug!(lat, lon, error = %e, "point query rejected");
            } else {
                tracing::error!(lat, lon, error = %e, "point query failed");
            }
            ExceptionResponse::from_error(&e).into_response()
        }
    }
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, ExceptionResponse> {
    let raw = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => {
            return Err(ExceptionResponse::bad_request(format!(
                "Missing required parameter: {}",
                name
            )))
        }
    };

    raw.parse::<f64>().map_err(|_| {
        ExceptionResponse::bad_request(format!("Invalid value for {}: '{}'", name, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("lat", Some(" 12.5 ")).unwrap(), 12.5);
        assert_eq!(parse_coordinate("lon", Some("-180")).unwrap(), -180.0);

        let err = parse_coordinate("lat", None).unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.detail.contains("lat"));

        assert!(parse_coordinate("lat", Some("")).is_err());
        assert!(parse_coordinate("lon", Some("east")).is_err());
    }
}
