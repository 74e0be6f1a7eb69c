use futures::future::join_all;
use validator::Validate;

use crate::{
    constants::MAX_IMAGES_PER_PROJECT,
    entities::project::{ImageUpload, ProjectInsert, ProjectRecord},
    errors::AppError,
    repositories::{image_store::ImageStore, project::ProjectRepository},
    utils::project_id::parse_project_id,
};

pub struct ProjectHandler<R, S>
where
    R: ProjectRepository,
    S: ImageStore,
{
    pub project_repo: R,
    pub image_store: S,
    max_image_bytes: usize,
}

impl<R, S> ProjectHandler<R, S>
where
    R: ProjectRepository,
    S: ImageStore,
{
    pub fn new(project_repo: R, image_store: S, max_image_bytes: usize) -> Self {
        ProjectHandler {
            project_repo,
            image_store,
            max_image_bytes,
        }
    }

    /// Creates a project from already-hosted image references.
    pub async fn create_project(&self, project: ProjectInsert) -> Result<ProjectRecord, AppError> {
        project.validate()?;

        let record = self.project_repo.create_project(&project).await?;
        tracing::info!(project_id = record.id, "Project created");
        Ok(record)
    }

    /// Stores the uploaded images, then creates the project referencing them.
    /// Nothing persists unless both steps succeed.
    pub async fn create_project_with_images(
        &self,
        mut project: ProjectInsert,
        uploads: Vec<ImageUpload>,
    ) -> Result<ProjectRecord, AppError> {
        project.validate()?;
        ensure_image_count(uploads.len())?;
        for upload in &uploads {
            upload.check(self.max_image_bytes)?;
        }

        let results = join_all(uploads.iter().map(|upload| self.image_store.store(upload))).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(path) => stored.push(path),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(err) = first_error {
            tracing::warn!(stored = stored.len(), "Image write failed, discarding batch");
            self.discard_images(&stored).await;
            return Err(err);
        }

        project.image = stored;

        match self.project_repo.create_project(&project).await {
            Ok(record) => {
                tracing::info!(
                    project_id = record.id,
                    images = record.image.len(),
                    "Project created with uploaded images"
                );
                Ok(record)
            }
            Err(e) => {
                self.discard_images(&project.image).await;
                Err(e)
            }
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        self.project_repo.list_projects().await
    }

    /// Looks up one project. Ids that are not positive integers are simply not found.
    pub async fn get_project(&self, raw_id: &str) -> Result<ProjectRecord, AppError> {
        let id = parse_project_id(raw_id)
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", raw_id)))?;

        self.project_repo.get_project_by_id(id).await
    }

    async fn discard_images(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.image_store.remove(path).await {
                tracing::error!(path = %path, error = %e, "Failed to remove orphaned image");
            }
        }
    }
}

/// Rejects a submission carrying more images than a project may hold.
pub fn ensure_image_count(count: usize) -> Result<(), AppError> {
    if count > MAX_IMAGES_PER_PROJECT {
        return Err(AppError::validation(
            "images",
            format!("At most {} images are allowed per project", MAX_IMAGES_PER_PROJECT),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::project::MockProjectRepository;
    use crate::repositories::image_store::MockImageStore;
    use chrono::Utc;
    use mockall::predicate::eq;

    const PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn insert() -> ProjectInsert {
        ProjectInsert {
            title: "Corporate Design System".into(),
            description: "Tokens and components".into(),
            tags: vec!["Figma".into()],
            year: "2022".into(),
            ..Default::default()
        }
    }

    fn record_from(project: &ProjectInsert, id: i32) -> ProjectRecord {
        ProjectRecord {
            id,
            title: project.title.clone(),
            description: project.description.clone(),
            tags: project.tags.clone(),
            image: project.image.clone(),
            link: project.link.clone(),
            github: project.github.clone(),
            year: project.year.clone(),
            created_at: Utc::now(),
        }
    }

    fn png(name: &str) -> ImageUpload {
        ImageUpload {
            original_name: Some(name.into()),
            content_type: Some("image/png".into()),
            bytes: PNG.to_vec(),
        }
    }

    #[actix_rt::test]
    async fn create_project_persists_valid_input() {
        let mut repo = MockProjectRepository::new();
        repo.expect_create_project()
            .times(1)
            .returning(|p| Ok(record_from(p, 1)));

        let handler = ProjectHandler::new(repo, MockImageStore::new(), 1024);
        let record = handler.create_project(insert()).await.unwrap();

        assert_eq!(record.id, 1);
        assert!(record.image.is_empty());
    }

    #[actix_rt::test]
    async fn create_project_rejects_invalid_input_without_touching_storage() {
        let mut repo = MockProjectRepository::new();
        repo.expect_create_project().never();

        let handler = ProjectHandler::new(repo, MockImageStore::new(), 1024);
        let mut project = insert();
        project.year = "22".into();

        let err = handler.create_project(project).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn uploads_are_stored_in_submission_order() {
        let mut store = MockImageStore::new();
        store.expect_store()
            .times(2)
            .returning(|upload| Ok(format!("/uploads/{}", upload.display_name())));

        let mut repo = MockProjectRepository::new();
        repo.expect_create_project()
            .times(1)
            .returning(|p| Ok(record_from(p, 7)));

        let handler = ProjectHandler::new(repo, store, 1024);
        let record = handler
            .create_project_with_images(insert(), vec![png("a.png"), png("b.png")])
            .await
            .unwrap();

        assert_eq!(record.image, vec!["/uploads/a.png", "/uploads/b.png"]);
    }

    #[actix_rt::test]
    async fn too_many_images_fail_before_any_write() {
        let mut store = MockImageStore::new();
        store.expect_store().never();
        let mut repo = MockProjectRepository::new();
        repo.expect_create_project().never();

        let handler = ProjectHandler::new(repo, store, 1024);
        let uploads = (0..6).map(|i| png(&format!("{i}.png"))).collect();

        let err = handler.create_project_with_images(insert(), uploads).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn non_image_upload_is_rejected_before_any_write() {
        let mut store = MockImageStore::new();
        store.expect_store().never();

        let handler = ProjectHandler::new(MockProjectRepository::new(), store, 1024);
        let text = ImageUpload {
            original_name: Some("notes.png".into()),
            content_type: Some("image/png".into()),
            bytes: b"plain text".to_vec(),
        };

        let err = handler
            .create_project_with_images(insert(), vec![png("a.png"), text])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn failed_write_discards_the_other_images() {
        let mut store = MockImageStore::new();
        store.expect_store().times(2).returning(|upload| {
            if upload.display_name() == "bad.png" {
                Err(AppError::UploadError("disk full".into()))
            } else {
                Ok("/uploads/good.png".into())
            }
        });
        store.expect_remove()
            .with(eq("/uploads/good.png"))
            .times(1)
            .returning(|_| Ok(()));

        let mut repo = MockProjectRepository::new();
        repo.expect_create_project().never();

        let handler = ProjectHandler::new(repo, store, 1024);
        let err = handler
            .create_project_with_images(insert(), vec![png("good.png"), png("bad.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UploadError(_)));
    }

    #[actix_rt::test]
    async fn failed_insert_discards_written_images() {
        let mut store = MockImageStore::new();
        store.expect_store()
            .times(1)
            .returning(|_| Ok("/uploads/one.png".into()));
        store.expect_remove()
            .with(eq("/uploads/one.png"))
            .times(1)
            .returning(|_| Ok(()));

        let mut repo = MockProjectRepository::new();
        repo.expect_create_project()
            .times(1)
            .returning(|_| Err(AppError::StorageError("connection reset".into())));

        let handler = ProjectHandler::new(repo, store, 1024);
        let err = handler
            .create_project_with_images(insert(), vec![png("one.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageError(_)));
    }

    #[actix_rt::test]
    async fn non_numeric_id_is_not_found_without_a_lookup() {
        let mut repo = MockProjectRepository::new();
        repo.expect_get_project_by_id().never();

        let handler = ProjectHandler::new(repo, MockImageStore::new(), 1024);
        let err = handler.get_project("abc").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_rt::test]
    async fn numeric_id_is_looked_up() {
        let mut repo = MockProjectRepository::new();
        repo.expect_get_project_by_id()
            .with(eq(3))
            .times(1)
            .returning(|id| Ok(record_from(&insert(), id)));

        let handler = ProjectHandler::new(repo, MockImageStore::new(), 1024);
        assert_eq!(handler.get_project("3").await.unwrap().id, 3);
    }
}
