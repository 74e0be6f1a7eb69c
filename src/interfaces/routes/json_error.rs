use actix_web::{error::JsonPayloadError, web};

use crate::errors::AppError;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(err).into()
    }));
}

impl From<JsonPayloadError> for AppError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::ContentType => AppError::UnsupportedMediaType(
                "Request body must be application/json".into(),
            ),
            other => AppError::BadRequest(format!("JSON payload error: {}", other)),
        }
    }
}
