use actix_web::{http::header, web, HttpResponse};
use tracing::instrument;

use crate::{errors::AppError, repositories::image_store::ImageStore, AppState};

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// Serves a stored image. Names are unique per upload so responses never change.
#[instrument(name = "serve_upload", skip(state))]
pub async fn serve_upload(
    state: web::Data<AppState>,
    file_name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let bytes = state.project_handler.image_store.read(&file_name).await?;

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, IMMUTABLE_CACHE))
        .body(bytes))
}
