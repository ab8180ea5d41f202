//! upload-service client for the uploads host.
//!
//! Plain HTTP with request id and trace context propagated on every call.

use crate::config::UploadServiceSettings;
use crate::models::UploadedFileRecord;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;

#[derive(Deserialize)]
struct UploadResponse {
    file: UploadedFileRecord,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct UploadClient {
    client: Client,
    pub settings: UploadServiceSettings,
}

impl UploadClient {
    pub fn new(settings: UploadServiceSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn uploads_url(&self) -> String {
        format!("{}/api/uploads", self.settings.url.trim_end_matches('/'))
    }

    /// Forward one file. The returned record has status `uploaded`.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
        request_id: Option<&str>,
    ) -> Result<UploadedFileRecord, AppError> {
        let mut part = multipart::Part::bytes(data).file_name(file_name.to_string());
        if let Some(content_type) = content_type {
            part = part.mime_str(content_type).map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!(
                    "Invalid content type {}: {}",
                    content_type,
                    e
                ))
            })?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .traced_post(&self.uploads_url())
            .request_id(request_id)
            .multipart(form)
            .timeout(self.settings.timeout())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, file_name, "upload-service request failed");
                AppError::BadGateway(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Unreadable upload-service response");
            AppError::BadGateway(format!("Invalid upload response: {}", e))
        })?;

        Ok(body.file)
    }

    pub async fn delete(&self, storage_path: &str, request_id: Option<&str>) -> Result<(), AppError> {
        let response = self
            .client
            .traced_delete(&self.uploads_url())
            .request_id(request_id)
            .json(&json!({ "storagePath": storage_path }))
            .timeout(self.settings.timeout())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, storage_path, "upload-service request failed");
                AppError::BadGateway(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}

async fn error_from_response(response: reqwest::Response) -> AppError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    tracing::warn!(status = %status, error = %message, "upload-service rejected request");

    match status {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(anyhow::anyhow!(message)),
        status if status.is_client_error() => AppError::BadRequest(anyhow::anyhow!(message)),
        _ => AppError::BadGateway(message),
    }
}
