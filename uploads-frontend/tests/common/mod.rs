#![allow(dead_code)]

use service_core::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use upload_service::config::{StorageConfig, UploadConfig};
use upload_service::startup::Application;
use uploads_frontend::config::UploadServiceSettings;
use uploads_frontend::models::{FileCategory, UploadStatus, UploadedFileRecord};
use uploads_frontend::services::{store::UploadStore, upload_client::UploadClient};
use uploads_frontend::startup::build_router;
use uploads_frontend::AppState;
use uuid::Uuid;

pub struct TestBackend {
    pub address: String,
    pub upload_root: PathBuf,
    pub working_dir: PathBuf,
}

impl TestBackend {
    pub async fn spawn() -> Self {
        let working_dir = std::env::current_dir().expect("Failed to read working directory");
        let config = UploadConfig {
            common: Config {
                port: 0,
                ..Default::default()
            },
            storage: StorageConfig::new(
                format!("target/frontend-uploads-{}", Uuid::new_v4()),
                working_dir.clone(),
            ),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build upload-service");
        let port = app.port();
        let upload_root = app.storage().root().to_path_buf();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestBackend {
            address: format!("http://127.0.0.1:{}", port),
            upload_root,
            working_dir,
        }
    }

    pub fn resolve(&self, storage_path: &str) -> PathBuf {
        self.working_dir.join(storage_path)
    }

    pub fn cleanup(&self) {
        let _ = std::fs::remove_dir_all(&self.upload_root);
    }
}

pub struct TestFrontend {
    pub address: String,
    pub store: Arc<UploadStore>,
    /// Does not follow redirects so handlers' 303s can be asserted.
    pub client: reqwest::Client,
}

impl TestFrontend {
    pub async fn spawn(upload_service_url: &str) -> Self {
        let settings = UploadServiceSettings {
            url: upload_service_url.to_string(),
            timeout_seconds: 5,
        };
        let store = Arc::new(UploadStore::new());
        let state = AppState::new(Arc::new(UploadClient::new(settings)), store.clone());
        let router = build_router(state, 10 * 1024 * 1024);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        TestFrontend {
            address: format!("http://127.0.0.1:{}", port),
            store,
            client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
        }
    }

    pub async fn upload(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/uploads", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute upload request")
    }

    pub async fn remove(&self, id: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/uploads/remove", self.address))
            .form(&[("id", id)])
            .send()
            .await
            .expect("Failed to execute remove request")
    }

    pub async fn list(&self) -> Vec<serde_json::Value> {
        self.client
            .get(format!("{}/api/uploads", self.address))
            .send()
            .await
            .expect("Failed to list uploads")
            .json()
            .await
            .expect("List response was not JSON")
    }

    pub async fn page(&self) -> String {
        let response = self
            .client
            .get(&self.address)
            .send()
            .await
            .expect("Failed to load page");
        assert_eq!(response.status(), 200);
        response.text().await.unwrap()
    }
}

pub fn file_part(name: &str, mime: &str, data: &[u8]) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(data.to_vec())
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap()
}

pub fn sample_record(id: &str, name: &str) -> UploadedFileRecord {
    UploadedFileRecord {
        id: id.to_string(),
        original_name: name.to_string(),
        mime_type: "text/plain".to_string(),
        size: 2048,
        storage_path: format!("shared_uploads/{}-{}", id, name),
        uploaded_at: "2026-01-05T10:00:00.000Z".to_string(),
        category: FileCategory::Document,
        status: UploadStatus::Uploaded,
        summary: None,
        transcript: None,
        error: None,
    }
}
