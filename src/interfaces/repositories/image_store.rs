use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::project::ImageUpload, errors::AppError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists one image under a fresh unique name and returns its public path
    async fn store(&self, upload: &ImageUpload) -> Result<String, AppError>;

    /// Deletes an image by the public path `store` returned. Missing files are not an error.
    async fn remove(&self, public_path: &str) -> Result<(), AppError>;

    /// Reads a stored image back by bare file name
    async fn read(&self, file_name: &str) -> Result<Vec<u8>, AppError>;

    /// Probes that the backing location accepts writes
    async fn check_writable(&self) -> Result<(), AppError>;
}

#[async_trait]
impl<T> ImageStore for Arc<T>
where
    T: ImageStore + ?Sized,
{
    async fn store(&self, upload: &ImageUpload) -> Result<String, AppError> {
        (**self).store(upload).await
    }

    async fn remove(&self, public_path: &str) -> Result<(), AppError> {
        (**self).remove(public_path).await
    }

    async fn read(&self, file_name: &str) -> Result<Vec<u8>, AppError> {
        (**self).read(file_name).await
    }

    async fn check_writable(&self) -> Result<(), AppError> {
        (**self).check_writable().await
    }
}
