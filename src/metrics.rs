use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Session counters for searches and log sink health.
#[derive(Clone)]
pub struct Metrics {
    pub searches_total: IntCounter,
    pub searches_failed: IntCounter,
    pub doc_store_failures: IntCounter,
    pub audit_failures: IntCounter,
    pub sink_timeouts: IntCounter,
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(name: &str, help: &str) -> IntCounter {
    IntCounter::with_opts(Opts::new(name, help)).expect("counter options are static and valid")
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let searches_total = counter("searches_total", "Number of catalog searches executed");
        let searches_failed = counter(
            "searches_failed",
            "Number of catalog searches that returned an error",
        );
        let doc_store_failures = counter(
            "doc_store_failures",
            "Number of log entries the document store did not accept",
        );
        let audit_failures = counter(
            "audit_failures",
            "Number of log entries the audit file did not accept",
        );
        let sink_timeouts = counter("sink_timeouts", "Number of log sink writes that timed out");

        registry.register(Box::new(searches_total.clone())).ok();
        registry.register(Box::new(searches_failed.clone())).ok();
        registry.register(Box::new(doc_store_failures.clone())).ok();
        registry.register(Box::new(audit_failures.clone())).ok();
        registry.register(Box::new(sink_timeouts.clone())).ok();

        Metrics {
            searches_total,
            searches_failed,
            doc_store_failures,
            audit_failures,
            sink_timeouts,
            registry: Arc::new(registry),
        }
    }

    /// Prometheus text exposition of every registered counter.
    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
