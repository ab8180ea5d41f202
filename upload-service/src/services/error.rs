use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Missing file")]
    MissingFile,

    #[error("File too large")]
    TooLarge,

    #[error("storagePath is required")]
    StoragePathRequired,

    #[error("Invalid storage path")]
    InvalidStoragePath,

    #[error("Upload failed: {0}")]
    Upload(anyhow::Error),

    #[error("Delete failed: {0}")]
    Delete(anyhow::Error),
}

impl UploadError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, UploadError::Upload(_) | UploadError::Delete(_))
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge
        } else {
            UploadError::Upload(anyhow::anyhow!("Failed to read multipart body: {}", err))
        }
    }
}

impl From<MultipartRejection> for UploadError {
    fn from(err: MultipartRejection) -> Self {
        UploadError::Upload(anyhow::anyhow!("Request is not a multipart form: {}", err))
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile
            | UploadError::StoragePathRequired
            | UploadError::InvalidStoragePath => AppError::BadRequest(anyhow::anyhow!(err)),
            UploadError::TooLarge => AppError::PayloadTooLarge(anyhow::anyhow!(err)),
            UploadError::Upload(source) => AppError::OperationFailed {
                message: "Upload failed",
                source,
            },
            UploadError::Delete(source) => AppError::OperationFailed {
                message: "Delete failed",
                source,
            },
        }
    }
}
