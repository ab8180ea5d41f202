pub mod health;
pub mod uploads;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use uploads::{delete_file, upload_file};
