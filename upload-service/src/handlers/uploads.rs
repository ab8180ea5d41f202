use crate::dtos::{DeleteUploadRequest, OkResponse, UploadResponse};
use crate::models::{FileCategory, UploadedFile};
use crate::services::{metrics, UploadError};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

const FILE_FIELD: &str = "file";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

struct IncomingFile {
    name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// The first `file` field decides: a part without a filename is a plain
/// text field, not a file.
async fn read_file_field(multipart: &mut Multipart) -> Result<IncomingFile, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(name) = field.file_name().map(str::to_string) else {
            return Err(UploadError::MissingFile);
        };
        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .map(str::to_string);
        let data = field.bytes().await?;

        return Ok(IncomingFile {
            name,
            content_type,
            data,
        });
    }

    Err(UploadError::MissingFile)
}

async fn store_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<u8>, UploadError> {
    let mut multipart = multipart?;
    let file = read_file_field(&mut multipart).await?;

    let id = Uuid::new_v4();
    let size = file.data.len() as u64;
    let stored = state.storage.store(&id, &file.name, file.data).await?;

    let mime_type = file
        .content_type
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
    let category = FileCategory::detect(&mime_type, &stored.stored_name);
    let original_name = if file.name.is_empty() {
        stored.stored_name.clone()
    } else {
        file.name
    };

    let upload = UploadedFile {
        id,
        original_name,
        mime_type,
        size,
        storage_path: stored.storage_path.clone(),
        uploaded_at: Utc::now(),
        category,
    };

    tracing::info!(
        upload_id = %upload.id,
        filename = %upload.original_name,
        storage_path = %upload.storage_path,
        size = upload.size,
        category = %upload.category,
        "Upload stored"
    );
    let (category, size) = (upload.category, upload.size);

    // Until the body exists the file is still owned by `stored`.
    let body = serde_json::to_vec(&UploadResponse::from(upload))
        .map_err(|e| UploadError::Upload(anyhow::anyhow!("Failed to encode response: {}", e)))?;
    stored.commit();
    metrics::record_upload(category, size);

    Ok(body)
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = store_upload(&state, multipart).await.map_err(|e| {
        if e.is_server_error() {
            tracing::error!(error = %e, "Failed to save upload");
            metrics::record_failure("upload");
        } else {
            tracing::warn!(error = %e, "Rejected upload");
        }
        e
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

pub async fn delete_file(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request: DeleteUploadRequest = serde_json::from_slice(&body).map_err(|e| {
        if e.is_data() {
            UploadError::StoragePathRequired
        } else {
            tracing::error!(error = %e, "Unreadable delete request body");
            metrics::record_failure("delete");
            UploadError::Delete(anyhow::anyhow!("Failed to parse delete request: {}", e))
        }
    })?;
    request
        .validate()
        .map_err(|_| UploadError::StoragePathRequired)?;

    let removed = state
        .storage
        .remove(&request.storage_path)
        .await
        .map_err(|e| {
            if e.is_server_error() {
                tracing::error!(
                    storage_path = %request.storage_path,
                    error = %e,
                    "Failed to delete upload"
                );
                metrics::record_failure("delete");
            } else {
                tracing::warn!(
                    storage_path = %request.storage_path,
                    "Rejected delete outside upload root"
                );
            }
            e
        })?;

    tracing::info!(path = %removed.display(), "Upload deleted");
    metrics::record_delete();

    Ok(Json(OkResponse::default()))
}
