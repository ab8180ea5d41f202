use crate::config::StorageConfig;
use crate::services::UploadError;
use axum::body::Bytes;
use service_core::error::AppError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Stored names keep at most this many characters of the sanitized original.
pub const MAX_SANITIZED_NAME_CHARS: usize = 180;

/// Used when the client sends no file name.
pub const FALLBACK_FILE_NAME: &str = "upload";

/// Replace every character outside `[a-zA-Z0-9.\-_]` with `_` and keep the
/// trailing [`MAX_SANITIZED_NAME_CHARS`] characters so long names keep their
/// extension.
pub fn sanitize_file_name(name: &str) -> String {
    if name.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }

    let sanitized: Vec<char> = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let start = sanitized.len().saturating_sub(MAX_SANITIZED_NAME_CHARS);
    sanitized[start..].iter().collect()
}

/// Lexically resolve `.` and `..` without touching the filesystem.
/// `..` at the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Express `target` relative to `base`. Both must be absolute and normalized.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base_components: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();

    let shared = base_components
        .iter()
        .zip(&target_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..base_components.len() {
        relative.push("..");
    }
    for component in &target_components[shared..] {
        relative.push(component.as_os_str());
    }
    relative
}

/// Flat local directory holding `{id}-{sanitizedName}` files.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    working_dir: PathBuf,
}

impl LocalStorage {
    pub async fn new(config: &StorageConfig) -> Result<Self, AppError> {
        let root = normalize_path(&config.upload_root);
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            working_dir: normalize_path(&config.working_dir),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` as `{id}-{sanitized original_name}` under the root.
    ///
    /// The returned [`StoredFile`] removes the file again when dropped
    /// without [`StoredFile::commit`]. The write runs on its own task, so a
    /// caller that goes away mid-write still gets the file cleaned up once
    /// the write settles.
    pub async fn store(
        &self,
        id: &Uuid,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredFile, UploadError> {
        let stored_name = format!("{}-{}", id, sanitize_file_name(original_name));
        let storage = self.clone();

        tokio::spawn(async move { storage.write_stored(stored_name, data).await })
            .await
            .map_err(|e| UploadError::Upload(anyhow::anyhow!("Upload write task failed: {}", e)))?
    }

    async fn write_stored(&self, stored_name: String, data: Bytes) -> Result<StoredFile, UploadError> {
        // The root may have been removed since startup.
        fs::create_dir_all(&self.root).await.map_err(|e| {
            UploadError::Upload(anyhow::anyhow!(
                "Failed to create upload root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let absolute_path = self.root.join(&stored_name);
        let write_error = |e: std::io::Error| {
            UploadError::Upload(anyhow::anyhow!(
                "Failed to write {}: {}",
                absolute_path.display(),
                e
            ))
        };

        let mut file = fs::File::create(&absolute_path).await.map_err(write_error)?;
        let guard = PendingFile::new(absolute_path.clone());
        file.write_all(&data).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        drop(file);

        let storage_path = relative_path(&self.working_dir, &absolute_path)
            .to_string_lossy()
            .into_owned();

        Ok(StoredFile {
            stored_name,
            storage_path,
            absolute_path,
            guard,
        })
    }

    /// Resolve a caller-supplied storage path, refusing anything that is not
    /// strictly inside the root.
    pub fn resolve(&self, storage_path: &str) -> Result<PathBuf, UploadError> {
        let resolved = normalize_path(&self.working_dir.join(storage_path));
        if resolved == self.root || !resolved.starts_with(&self.root) {
            return Err(UploadError::InvalidStoragePath);
        }
        Ok(resolved)
    }

    /// Remove a stored file. Removing a file that is already gone succeeds.
    pub async fn remove(&self, storage_path: &str) -> Result<PathBuf, UploadError> {
        let resolved = self.resolve(storage_path)?;

        match fs::remove_file(&resolved).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %resolved.display(), "Upload already absent");
            }
            Err(e) => {
                return Err(UploadError::Delete(anyhow::anyhow!(
                    "Failed to remove {}: {}",
                    resolved.display(),
                    e
                )))
            }
        }

        Ok(resolved)
    }

    pub async fn is_ready(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}

/// A file written to the upload root that has not been handed to the
/// caller yet.
#[derive(Debug)]
pub struct StoredFile {
    pub stored_name: String,
    pub storage_path: String,
    pub absolute_path: PathBuf,
    guard: PendingFile,
}

impl StoredFile {
    /// Keep the file on disk.
    pub fn commit(mut self) {
        self.guard.committed = true;
    }
}

#[derive(Debug)]
struct PendingFile {
    path: PathBuf,
    committed: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::warn!(path = %self.path.display(), "Removed uncommitted upload");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove uncommitted upload"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_safe(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_file_name("My Report (final).PDF"), "My_Report__final_.PDF");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("résumé.txt"), "r_sum_.txt");
    }

    #[test]
    fn sanitize_replaces_each_character_once() {
        // One `_` per char, including chars outside the basic plane.
        assert_eq!(sanitize_file_name("\u{1F600}.txt"), "_.txt");
        assert_eq!(sanitize_file_name("日本.md"), "__.md");
    }

    #[test]
    fn sanitize_output_is_never_empty_and_only_safe() {
        for name in ["", " ", "///", "a b\tc\n", "日本語.md", "ok-name_1.wav"] {
            let sanitized = sanitize_file_name(name);
            assert!(!sanitized.is_empty(), "{name:?}");
            assert!(sanitized.chars().all(is_safe), "{name:?} -> {sanitized:?}");
        }
        assert_eq!(sanitize_file_name(""), FALLBACK_FILE_NAME);
    }

    #[test]
    fn sanitize_keeps_last_180_characters() {
        let name = format!("{}{}", "a".repeat(150), "b".repeat(100)) + ".mp3";
        let sanitized = sanitize_file_name(&name);
        assert_eq!(sanitized.chars().count(), MAX_SANITIZED_NAME_CHARS);
        assert_eq!(sanitized.as_str(), &name[name.len() - MAX_SANITIZED_NAME_CHARS..]);
        assert!(sanitized.ends_with(".mp3"));

        let short = "c".repeat(MAX_SANITIZED_NAME_CHARS);
        assert_eq!(sanitize_file_name(&short), short);
    }

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(
            normalize_path(Path::new("/srv/app/./uploads/../uploads/a")),
            PathBuf::from("/srv/app/uploads/a")
        );
        assert_eq!(
            normalize_path(Path::new("/srv/../../../etc")),
            PathBuf::from("/etc")
        );
    }

    #[test]
    fn relative_path_walks_up_when_needed() {
        assert_eq!(
            relative_path(Path::new("/srv/app"), Path::new("/srv/app/shared_uploads/x")),
            PathBuf::from("shared_uploads/x")
        );
        assert_eq!(
            relative_path(Path::new("/srv/app"), Path::new("/var/uploads/x")),
            PathBuf::from("../../var/uploads/x")
        );
    }

    fn storage() -> LocalStorage {
        LocalStorage {
            root: PathBuf::from("/srv/app/shared_uploads"),
            working_dir: PathBuf::from("/srv/app"),
        }
    }

    #[test]
    fn resolve_accepts_paths_inside_root() {
        assert_eq!(
            storage().resolve("shared_uploads/abc-file.txt").unwrap(),
            PathBuf::from("/srv/app/shared_uploads/abc-file.txt")
        );
        assert!(storage()
            .resolve("/srv/app/shared_uploads/abc-file.txt")
            .is_ok());
    }

    #[test]
    fn resolve_rejects_escapes() {
        for path in [
            "../../etc/passwd",
            "shared_uploads/../../etc/passwd",
            "/etc/passwd",
            "shared_uploads_evil/file",
            "shared_uploads",
            "shared_uploads/.",
            "other/file",
        ] {
            assert!(
                matches!(
                    storage().resolve(path),
                    Err(UploadError::InvalidStoragePath)
                ),
                "{path}"
            );
        }
    }

    fn temp_config() -> StorageConfig {
        StorageConfig::new(
            format!("target/unit-uploads-{}", Uuid::new_v4()),
            std::env::current_dir().unwrap(),
        )
    }

    #[tokio::test]
    async fn dropped_stored_file_is_removed() {
        let config = temp_config();
        let storage = LocalStorage::new(&config).await.unwrap();

        let stored = storage
            .store(&Uuid::new_v4(), "draft.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let path = stored.absolute_path.clone();
        assert!(path.exists());

        drop(stored);
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn committed_file_survives_and_removes_idempotently() {
        let config = temp_config();
        let storage = LocalStorage::new(&config).await.unwrap();

        let stored = storage
            .store(&Uuid::new_v4(), "", Bytes::from_static(b"\x00\x01"))
            .await
            .unwrap();
        assert!(stored.stored_name.ends_with("-upload"));
        let storage_path = stored.storage_path.clone();
        let path = stored.absolute_path.clone();
        stored.commit();
        assert!(path.exists());

        storage.remove(&storage_path).await.unwrap();
        assert!(!path.exists());
        storage.remove(&storage_path).await.unwrap();

        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn cancelled_store_leaves_no_file() {
        let config = temp_config();
        let storage = LocalStorage::new(&config).await.unwrap();

        let data = Bytes::from(vec![7u8; 4 * 1024 * 1024]);
        let cancelled = tokio::time::timeout(
            std::time::Duration::ZERO,
            storage.store(&Uuid::new_v4(), "big.bin", data),
        )
        .await;
        assert!(cancelled.is_err(), "store should still be pending");

        // Let the detached write settle before looking.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        let mut leftovers = usize::MAX;
        for _ in 0..200 {
            leftovers = std::fs::read_dir(storage.root()).unwrap().count();
            if leftovers == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(leftovers, 0);

        let _ = std::fs::remove_dir_all(storage.root());
    }
}
