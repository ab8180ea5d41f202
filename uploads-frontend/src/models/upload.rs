use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Audio,
    Unknown,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Audio => "audio",
            FileCategory::Unknown => "unknown",
        }
    }
}

/// Processing state set by the downstream pipeline. New uploads start as
/// `uploaded`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Uploaded,
    Processing,
    Ready,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::Processing => "processing",
            UploadStatus::Ready => "ready",
            UploadStatus::Error => "error",
        }
    }

    /// CSS class of the status badge.
    pub fn badge_class(&self) -> &'static str {
        match self {
            UploadStatus::Uploaded => "badge badge-neutral",
            UploadStatus::Processing => "badge badge-info",
            UploadStatus::Ready => "badge badge-success",
            UploadStatus::Error => "badge badge-danger",
        }
    }
}

/// A stored file as returned by upload-service, plus the pipeline fields
/// the host tracks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileRecord {
    pub id: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub storage_path: String,
    pub uploaded_at: String,
    pub category: FileCategory,
    #[serde(default)]
    pub status: UploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `PUT /api/uploads/:id`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUploadRequest {
    pub status: Option<UploadStatus>,
    #[validate(length(max = 20000))]
    pub summary: Option<String>,
    pub transcript: Option<String>,
    #[validate(length(max = 2000))]
    pub error: Option<String>,
}

impl UpdateUploadRequest {
    pub fn apply(self, record: &mut UploadedFileRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(summary) = self.summary {
            record.summary = Some(summary);
        }
        if let Some(transcript) = self.transcript {
            record.transcript = Some(transcript);
        }
        if let Some(error) = self.error {
            record.error = Some(error);
        }
    }
}
