pub mod upload;

pub use upload::{FileCategory, UploadedFile};
