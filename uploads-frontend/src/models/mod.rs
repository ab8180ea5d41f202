pub mod upload;

pub use upload::{FileCategory, UpdateUploadRequest, UploadStatus, UploadedFileRecord};
