use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{constants::MAX_IMAGES_PER_PROJECT, handlers::home::home};

mod admin;
mod json_error;
mod projects;
mod system;
mod uploads;

/// Room for the text fields and part headers on top of the image bytes.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .configure(system::config_routes)
            .configure(projects::config_routes)
            .configure(admin::config_routes)
    );

    cfg.configure(uploads::config_routes);
    cfg.configure(json_error::config_routes);
}

/// Body limits for project submissions, sized from the per-image cap.
pub fn configure_upload_limits(max_image_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    // one spare image slot so over-count submissions reach validation
    let total_limit = max_image_bytes
        .saturating_mul(MAX_IMAGES_PER_PROJECT + 1)
        .saturating_add(FORM_OVERHEAD_BYTES);

    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(
            MultipartFormConfig::default()
                .total_limit(total_limit)
                .memory_limit(FORM_OVERHEAD_BYTES),
        );
        // `Either` buffers the whole body before trying each extractor
        cfg.app_data(web::PayloadConfig::new(total_limit));
    }
}
