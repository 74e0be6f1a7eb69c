use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Porto portfolio API!",
        "name": "Porto-API",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/api/porto", "/api/porto/{id}", "/api/admin/login", "/api/health"]
    }))
}
