use actix_multipart::MultipartError;
use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug, Display)]
pub enum AppError {
    #[display("Validation error: {}", join_field_errors(_0))]
    ValidationError(Vec<FieldError>),

    #[display("Bad request: {_0}")]
    BadRequest(String),

    #[display("Unauthorized: {_0}")]
    Unauthorized(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Unsupported media type: {_0}")]
    UnsupportedMediaType(String),

    #[display("Too many attempts, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[display("Upload error: {_0}")]
    UploadError(String),

    #[display("Storage error: {_0}")]
    StorageError(String),

    #[display("Internal server error: {_0}")]
    InternalError(String),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Single-field validation failure.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    /// Machine-readable kind used in the `error` key of failure bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::UnsupportedMediaType(_) => "unsupported_media_type",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::UploadError(_) => "upload_error",
            AppError::StorageError(_) => "storage_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    /// Message safe to show to clients. Server-side failures never leak their cause.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => errors.iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("; "),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::UnsupportedMediaType(msg) => msg.clone(),
            AppError::RateLimited { retry_after_secs } => {
                format!("Too many attempts. Try again in {} seconds", retry_after_secs)
            }
            AppError::UploadError(_) => "Failed to store uploaded image".to_string(),
            AppError::StorageError(_) => "Failed to access project storage".to_string(),
            AppError::InternalError(_) => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": self.kind(),
            "message": self.public_message(),
        });
        if let AppError::ValidationError(errors) = self {
            body["details"] = serde_json::json!(errors);
        }

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());
        if let AppError::RateLimited { retry_after_secs } = self {
            response.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }
        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UploadError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();

        // HashMap iteration order is unstable
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Project not found".into()),
            _ => AppError::StorageError(format!("Database error: {}", err))
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::UploadError(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Malformed multipart body: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn storage_errors_hide_their_cause() {
        let err = AppError::StorageError("connection refused on 10.0.0.3".into());
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "storage_error");
        assert_eq!(json["message"], "Failed to access project storage");
    }

    #[actix_rt::test]
    async fn validation_errors_list_their_fields() {
        let err = AppError::validation("year", "Year is required");
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Year is required");
        assert_eq!(json["details"][0]["field"], "year");
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after_secs: 7 }.error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "7");
    }

    #[test]
    fn validation_errors_become_sorted_field_errors() {
        let mut errors = ValidationErrors::new();
        let mut year = validator::ValidationError::new("year_required");
        year.message = Some("Year is required".into());
        errors.add("year", year);
        errors.add("title", validator::ValidationError::new("title_required"));

        match AppError::from(errors) {
            AppError::ValidationError(fields) => {
                assert_eq!(fields, vec![
                    FieldError { field: "title".into(), message: "Invalid value for title".into() },
                    FieldError { field: "year".into(), message: "Year is required".into() },
                ]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
    }
}
