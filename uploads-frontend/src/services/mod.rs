pub mod metrics;
pub mod store;
pub mod upload_client;
