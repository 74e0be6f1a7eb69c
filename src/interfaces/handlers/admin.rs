use actix_web::{web, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::{
    entities::admin::{AdminLoginRequest, AdminLoginResponse},
    errors::AppError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

#[instrument(name = "admin_login", skip_all)]
pub async fn admin_login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let client_ip = get_client_ip(&req, state.trust_forwarded_for);
    state.login_limiter.check(&client_ip)?;

    state.admin_gate.verify(&body)?;

    Ok(HttpResponse::Ok().json(AdminLoginResponse { success: true }))
}
