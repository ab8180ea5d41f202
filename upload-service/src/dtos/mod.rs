pub mod uploads;

pub use uploads::{DeleteUploadRequest, OkResponse, UploadResponse, UploadedFileResponse};
