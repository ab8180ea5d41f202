//! Upload-domain metrics recorded through the `metrics` facade.

use crate::models::FileCategory;

pub fn record_upload(category: FileCategory, size: u64) {
    metrics::counter!("uploads_total", "category" => category.as_str()).increment(1);
    metrics::histogram!("upload_bytes", "category" => category.as_str()).record(size as f64);
}

pub fn record_delete() {
    metrics::counter!("upload_deletes_total").increment(1);
}

pub fn record_failure(operation: &'static str) {
    metrics::counter!("upload_failures_total", "operation" => operation).increment(1);
}
