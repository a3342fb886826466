//! Application state shared by all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use tile_index::SocService;

use crate::metrics::QueryMetrics;

pub struct AppState {
    /// Loaded tiles and startup statistics. Read-only while serving.
    pub service: SocService,

    pub metrics: QueryMetrics,

    /// Renders `/metrics`; absent when no recorder was installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: SocService) -> Self {
        Self {
            service,
            metrics: QueryMetrics::new(),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Consume the state and close every tile.
    pub fn shutdown(mut self) -> usize {
        self.service.shutdown()
    }
}
