use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::project::{ProjectInsert, ProjectRecord},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str =
    "id, title, description, tags, image, link, github, year, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Inserts a row and returns it with its generated id
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError>;

    /// All rows, newest year first, ties by ascending id
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError>;

    async fn get_project_by_id(&self, id: i32) -> Result<ProjectRecord, AppError>;

    /// Removes every row. Only the seed tool calls this.
    async fn delete_all_projects(&self) -> Result<u64, AppError>;

    async fn check_connection(&self) -> Result<(), AppError>;
}

#[async_trait]
impl<T> ProjectRepository for Arc<T>
where
    T: ProjectRepository + ?Sized,
{
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError> {
        (**self).create_project(project).await
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        (**self).list_projects().await
    }

    async fn get_project_by_id(&self, id: i32) -> Result<ProjectRecord, AppError> {
        (**self).get_project_by_id(id).await
    }

    async fn delete_all_projects(&self) -> Result<u64, AppError> {
        (**self).delete_all_projects().await
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError> {
        let record = sqlx::query_as::<_, ProjectRecord>(&format!(
            r#"
            INSERT INTO porto (title, description, tags, image, link, github, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.tags)
        .bind(&project.image)
        .bind(&project.link)
        .bind(&project.github)
        .bind(&project.year)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        let projects = sqlx::query_as::<_, ProjectRecord>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM porto ORDER BY year DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn get_project_by_id(&self, id: i32) -> Result<ProjectRecord, AppError> {
        sqlx::query_as::<_, ProjectRecord>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM porto WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    async fn delete_all_projects(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM porto")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
