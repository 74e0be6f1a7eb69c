use serde::{Deserialize, Serialize};

/// Body of `POST /api/admin/login`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub success: bool,
}
