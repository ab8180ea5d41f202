use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};

use crate::services::storage::normalize_path;

pub const DEFAULT_UPLOAD_DIR: &str = "shared_uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Absolute, normalized upload root.
    pub upload_root: PathBuf,
    /// Directory that returned storage paths are relative to.
    pub working_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl StorageConfig {
    /// Resolve `upload_dir` against `working_dir`. Absolute directories are
    /// used as-is.
    pub fn new(upload_dir: impl AsRef<Path>, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = normalize_path(&working_dir.into());
        Self {
            upload_root: normalize_path(&working_dir.join(upload_dir)),
            working_dir,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;

        let working_dir = env::current_dir().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to determine working directory: {}",
                e
            ))
        })?;

        let upload_dir = env::var("SHARED_UPLOAD_DIR")
            .ok()
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());

        let mut storage = StorageConfig::new(upload_dir, working_dir);
        if let Ok(raw) = env::var("UPLOAD_MAX_BYTES") {
            storage.max_upload_bytes = raw.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid UPLOAD_MAX_BYTES '{}': {}", raw, e))
            })?;
        }

        Ok(UploadConfig { common, storage })
    }
}
