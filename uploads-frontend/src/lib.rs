pub mod components;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use services::{store::UploadStore, upload_client::UploadClient};
use std::sync::Arc;

/// Shared application state: the upload-service client and the host's own
/// record store.
#[derive(Clone)]
pub struct AppState {
    pub upload_client: Arc<UploadClient>,
    pub store: Arc<UploadStore>,
}

impl AppState {
    pub fn new(upload_client: Arc<UploadClient>, store: Arc<UploadStore>) -> Self {
        Self {
            upload_client,
            store,
        }
    }
}
