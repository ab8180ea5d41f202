use crate::models::{FileCategory, UploadedFile};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileResponse {
    pub id: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub storage_path: String,
    pub uploaded_at: String,
    pub category: FileCategory,
}

impl From<UploadedFile> for UploadedFileResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            id: file.id.to_string(),
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            storage_path: file.storage_path,
            uploaded_at: file.uploaded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            category: file.category,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub file: UploadedFileResponse,
}

impl From<UploadedFile> for UploadResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            ok: true,
            file: file.into(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteUploadRequest {
    #[serde(rename = "storagePath")]
    #[validate(length(min = 1, message = "storagePath is required"))]
    pub storage_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}
