#![allow(dead_code)]

use std::path::{Path, PathBuf};
use upload_service::config::{StorageConfig, UploadConfig};
use upload_service::startup::Application;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub upload_root: PathBuf,
    pub working_dir: PathBuf,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a fresh upload root under `target/`, letting the caller
    /// tweak the config before the app is built.
    pub async fn spawn_with(customize: impl FnOnce(&mut UploadConfig)) -> Self {
        let working_dir = std::env::current_dir().expect("Failed to read working directory");

        let mut config = UploadConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.storage = StorageConfig::new(
            format!("target/test-uploads-{}", Uuid::new_v4()),
            working_dir.clone(),
        );
        customize(&mut config);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let upload_root = app.storage().root().to_path_buf();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            upload_root,
            working_dir,
            client: reqwest::Client::new(),
        }
    }

    pub async fn upload(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/api/uploads", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute upload request")
    }

    /// Upload `data` under `file_name` and return the `file` record.
    pub async fn upload_file(
        &self,
        file_name: &str,
        mime: &str,
        data: Vec<u8>,
    ) -> serde_json::Value {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Invalid mime type");
        let response = self
            .upload(reqwest::multipart::Form::new().part("file", part))
            .await;
        assert_eq!(response.status().as_u16(), 200);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["ok"], true);
        body["file"].clone()
    }

    pub async fn delete_raw(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .delete(format!("{}/api/uploads", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute delete request")
    }

    pub async fn delete(&self, body: serde_json::Value) -> reqwest::Response {
        self.delete_raw(body.to_string()).await
    }

    /// Absolute location of a returned storage path.
    pub fn resolve(&self, storage_path: &str) -> PathBuf {
        self.working_dir.join(storage_path)
    }

    pub fn stored_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.upload_root) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn relative_root(&self) -> &Path {
        self.upload_root
            .strip_prefix(&self.working_dir)
            .expect("Upload root is outside the working directory")
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_root).await;
    }
}
