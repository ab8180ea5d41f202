use crate::models::{UpdateUploadRequest, UploadedFileRecord};
use crate::services::metrics::{record_forwarded, record_removal};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Json, Redirect},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::extract_request_id;
use validator::Validate;

/// Shown on a row whose removal failed.
pub const DELETE_FAILED_MESSAGE: &str = "Delete failed";

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveUploadForm {
    #[validate(length(min = 1))]
    pub id: String,
}

fn form_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(anyhow::anyhow!("File too large"))
    } else {
        AppError::BadRequest(anyhow::anyhow!("Invalid upload form: {}", err.body_text()))
    }
}

/// Forward every file in the form to upload-service, one at a time.
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let request_id = extract_request_id(&headers);
    let _in_flight = state.store.begin_upload();

    let mut uploaded_count = 0;
    let mut failed_count = 0;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        // Text fields are not files.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(form_error)?;

        // An empty picker still submits one nameless, empty part.
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        match state
            .upload_client
            .upload(
                &file_name,
                content_type.as_deref(),
                data.to_vec(),
                request_id.as_deref(),
            )
            .await
        {
            Ok(record) => {
                tracing::info!(
                    upload_id = %record.id,
                    file_name = %file_name,
                    category = record.category.as_str(),
                    "File uploaded"
                );
                record_forwarded("ok");
                state.store.insert(record);
                uploaded_count += 1;
            }
            Err(e) => {
                tracing::error!(file_name = %file_name, error = %e, "File upload failed");
                record_forwarded("error");
                failed_count += 1;
            }
        }
    }

    tracing::info!(uploaded_count, failed_count, "Upload batch finished");

    Ok(Redirect::to("/"))
}

pub async fn remove_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RemoveUploadForm>,
) -> Result<Redirect, AppError> {
    form.validate()?;

    let record = state
        .store
        .get(&form.id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Upload not found")))?;

    let Some(_busy) = state.store.mark_busy(&record.id) else {
        tracing::debug!(upload_id = %record.id, "Removal already in progress");
        return Ok(Redirect::to("/"));
    };

    let request_id = extract_request_id(&headers);
    match state
        .upload_client
        .delete(&record.storage_path, request_id.as_deref())
        .await
    {
        Ok(()) => {
            state.store.remove(&record.id);
            record_removal("ok");
            tracing::info!(upload_id = %record.id, "Upload removed");
        }
        Err(e) => {
            state.store.set_error(&record.id, DELETE_FAILED_MESSAGE);
            record_removal("error");
            tracing::error!(upload_id = %record.id, error = %e, "Upload removal failed");
        }
    }

    Ok(Redirect::to("/"))
}

pub async fn list_uploads(State(state): State<AppState>) -> Json<Vec<UploadedFileRecord>> {
    Json(state.store.list())
}

/// Pipeline callback: set status, summary, transcript or error of a record.
pub async fn update_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUploadRequest>,
) -> Result<Json<UploadedFileRecord>, AppError> {
    payload.validate()?;

    let record = state
        .store
        .update(&id, payload)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Upload not found")))?;

    tracing::info!(upload_id = %id, status = record.status.as_str(), "Upload updated");

    Ok(Json(record))
}
