use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{http::header, web, Either, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::{
    entities::project::{
        ImageUpload, NewProjectRequest, ProjectCreatedResponse, ProjectInsert, ProjectUpload,
        ProjectUploadedResponse,
    },
    errors::AppError,
    use_cases::projects::ensure_image_count,
    AppState,
};

type ProjectInput = Either<MultipartForm<ProjectUpload>, web::Json<NewProjectRequest>>;

#[instrument(name = "create_project", skip_all)]
pub async fn create_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    data_input: Result<ProjectInput, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let either = data_input.map_err(|e| extractor_error(&req, e))?;

    match either {
        Either::Left(form) => {
            let form = form.into_inner();
            let project = form.to_insert()?;

            let images: Vec<TempFile> = form
                .images
                .into_iter()
                .filter(|file| !is_empty_part(file))
                .collect();
            ensure_image_count(images.len())?;

            let uploads = read_uploads(images).await?;

            let project = state
                .project_handler
                .create_project_with_images(project, uploads)
                .await?;

            Ok(HttpResponse::Created().json(ProjectUploadedResponse { success: true, project }))
        }
        Either::Right(json) => {
            let project = ProjectInsert::try_from(json.into_inner())?;
            let data = state.project_handler.create_project(project).await?;

            Ok(HttpResponse::Created().json(ProjectCreatedResponse { success: true, data }))
        }
    }
}

#[instrument(name = "list_projects", skip_all)]
pub async fn list_projects(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let projects = state.project_handler.list_projects().await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(name = "get_project", skip(state))]
pub async fn get_project(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let project = state.project_handler.get_project(&project_id).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Browsers submit an empty, nameless part for a file input left blank.
fn is_empty_part(file: &TempFile) -> bool {
    file.size == 0 && file.file_name.as_deref().map_or(true, str::is_empty)
}

async fn read_uploads(files: Vec<TempFile>) -> Result<Vec<ImageUpload>, AppError> {
    let mut uploads = Vec::with_capacity(files.len());
    for file in files {
        let bytes = tokio::fs::read(file.file.path()).await.map_err(|e| {
            AppError::BadRequest(format!("Could not read uploaded part: {}", e))
        })?;
        uploads.push(ImageUpload {
            original_name: file.file_name,
            content_type: file.content_type.map(|mime| mime.to_string()),
            bytes,
        });
    }
    Ok(uploads)
}

/// Extraction failed for both body shapes. Bodies declared as JSON or
/// multipart were malformed; anything else is the wrong media type.
fn extractor_error(req: &HttpRequest, err: actix_web::Error) -> AppError {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") || content_type.starts_with("multipart/form-data") {
        AppError::BadRequest(format!("Malformed request body: {}", err))
    } else {
        AppError::UnsupportedMediaType(
            "Request must be either application/json or multipart/form-data".into(),
        )
    }
}
