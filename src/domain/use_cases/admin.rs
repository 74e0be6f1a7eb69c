use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    entities::admin::AdminLoginRequest,
    errors::AppError,
    settings::AppConfig,
};

/// Checks admin login attempts against the configured shared secret.
pub struct AdminGate {
    password: Option<Zeroizing<String>>,
}

impl AdminGate {
    pub fn new(password: Option<Zeroizing<String>>) -> Self {
        AdminGate {
            password: password.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    pub fn verify(&self, request: &AdminLoginRequest) -> Result<(), AppError> {
        let candidate = request
            .password
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Password is required".into()))?;

        let expected = self.password.as_ref().ok_or_else(|| {
            AppError::InternalError("admin password is not configured".into())
        })?;

        if bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())) {
            tracing::info!("Admin login succeeded");
            Ok(())
        } else {
            tracing::warn!("Admin login rejected");
            Err(AppError::Unauthorized("Invalid password".into()))
        }
    }
}

impl From<&AppConfig> for AdminGate {
    fn from(config: &AppConfig) -> Self {
        AdminGate::new(config.admin_password.clone())
    }
}
