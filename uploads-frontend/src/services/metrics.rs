//! Domain counters for the host. Rendering goes through service-core's
//! Prometheus recorder.

pub fn record_forwarded(outcome: &'static str) {
    metrics::counter!("uploads_forwarded_total", "outcome" => outcome).increment(1);
}

pub fn record_removal(outcome: &'static str) {
    metrics::counter!("upload_removals_total", "outcome" => outcome).increment(1);
}
