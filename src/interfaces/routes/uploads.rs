use actix_web::web;

use crate::{constants::UPLOADS_URL_PREFIX, handlers::uploads};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(UPLOADS_URL_PREFIX)
            .service(
                web::resource("/{file_name}")
                    .route(web::get().to(uploads::serve_upload))
            )
    );
}
