pub mod error;
pub mod metrics;
pub mod storage;

pub use error::UploadError;
pub use storage::{sanitize_file_name, LocalStorage, StoredFile};
