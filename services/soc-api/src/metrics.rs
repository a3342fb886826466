//! Query metrics.
//!
//! Every recording goes to the `metrics` facade (exported by the
//! Prometheus recorder when one is installed) and to in-process atomic
//! counters, which back `/metrics` when no recorder exists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{counter, histogram};

#[derive(Debug, Default)]
pub struct QueryMetrics {
    pub point_queries: AtomicU64,
    pub point_query_failures: AtomicU64,
    pub stats_queries: AtomicU64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a point query. `outcome` is `ok` or an error code.
    pub fn record_point_query(&self, outcome: &'static str, duration_us: u64) {
        self.point_queries.fetch_add(1, Ordering::Relaxed);
        if outcome != "ok" {
            self.point_query_failures.fetch_add(1, Ordering::Relaxed);
        }
        counter!("soc_point_queries_total", "outcome" => outcome).increment(1);
        histogram!("soc_point_query_duration_ms").record(duration_us as f64 / 1000.0);
    }

    pub fn record_stats_query(&self) {
        self.stats_queries.fetch_add(1, Ordering::Relaxed);
        counter!("soc_stats_queries_total").increment(1);
    }

    /// Prometheus text exposition of the atomic counters.
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "# HELP soc_point_queries_total Total point queries\n# TYPE soc_point_queries_total counter\nsoc_point_queries_total {}\n",
            self.point_queries.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP soc_point_query_failures_total Point queries that returned an error\n# TYPE soc_point_query_failures_total counter\nsoc_point_query_failures_total {}\n",
            self.point_query_failures.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "# HELP soc_stats_queries_total Total statistics queries\n# TYPE soc_stats_queries_total counter\nsoc_stats_queries_total {}\n",
            self.stats_queries.load(Ordering::Relaxed)
        ));
        output
    }
}

/// Simple timer for measuring durations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = QueryMetrics::new();
        metrics.record_point_query("ok", 120);
        metrics.record_point_query("OutOfBounds", 80);
        metrics.record_stats_query();

        assert_eq!(metrics.point_queries.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.point_query_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.stats_queries.load(Ordering::Relaxed), 1);

        let text = metrics.render();
        assert!(text.contains("soc_point_queries_total 2\n"));
        assert!(text.contains("soc_point_query_failures_total 1\n"));
        assert!(text.contains("soc_stats_queries_total 1\n"));
    }
}
