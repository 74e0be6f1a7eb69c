use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::{
    entities::project::ImageUpload,
    errors::AppError,
    repositories::image_store::ImageStore,
    utils::file_name::{is_safe_file_name, unique_file_name},
};

/// Keeps uploaded images as flat files in one directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Creates the uploads directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::UploadError(format!("create_dir_all({}): {}", self.root.display(), e))
        })
    }

    /// Maps a public path back to a bare file name, refusing anything outside the prefix.
    fn file_name_of<'a>(&self, public_path: &'a str) -> Option<&'a str> {
        public_path
            .strip_prefix(self.url_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| is_safe_file_name(name))
    }

    async fn write_new(&self, file_name: &str, bytes: &[u8]) -> Result<(), std::io::Error> {
        let full_path = self.root.join(file_name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await?;

        let written = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&full_path).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, upload: &ImageUpload) -> Result<String, AppError> {
        let extension = upload
            .sniffed_type()
            .map(|kind| kind.extension())
            .ok_or_else(|| {
                AppError::validation("images", format!("{} is not a supported image", upload.display_name()))
            })?;

        self.ensure_root().await?;

        let file_name = unique_file_name(upload.original_name.as_deref(), extension);
        self.write_new(&file_name, &upload.bytes).await.map_err(|e| {
            warn!(file_name = %file_name, error = %e, "image write failed");
            AppError::UploadError(format!("write {}: {}", file_name, e))
        })?;

        debug!(file_name = %file_name, size = upload.bytes.len(), "image stored");
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    async fn remove(&self, public_path: &str) -> Result<(), AppError> {
        let Some(file_name) = self.file_name_of(public_path) else {
            warn!(path = %public_path, "refusing to remove path outside the uploads directory");
            return Ok(());
        };

        match fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::UploadError(format!("remove {}: {}", file_name, e))),
        }
    }

    async fn read(&self, file_name: &str) -> Result<Vec<u8>, AppError> {
        if !is_safe_file_name(file_name) {
            return Err(AppError::NotFound("File not found".into()));
        }

        match fs::read(self.root.join(file_name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound("File not found".into())),
            Err(e) => Err(AppError::UploadError(format!("read {}: {}", file_name, e))),
        }
    }

    async fn check_writable(&self) -> Result<(), AppError> {
        self.ensure_root().await?;

        let probe = format!(".health-{}", uuid::Uuid::new_v4().simple());
        let probe_path = self.root.join(&probe);
        fs::write(&probe_path, b"porto-health-check")
            .await
            .map_err(|e| AppError::UploadError(format!("write probe: {}", e)))?;
        fs::remove_file(&probe_path)
            .await
            .map_err(|e| AppError::UploadError(format!("remove probe: {}", e)))?;
        Ok(())
    }
}
