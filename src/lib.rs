use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, limiter, storage, utils};

use constants::UPLOADS_URL_PREFIX;
use limiter::rate_limiter::LoginRateLimiter;
use repositories::{image_store::ImageStore, project::ProjectRepository, sqlx_repo::SqlxProjectRepo};
use settings::AppConfig;
use storage::local::LocalImageStore;
use use_cases::{admin::AdminGate, projects::ProjectHandler};

pub type AppProjectHandler = ProjectHandler<Arc<dyn ProjectRepository>, Arc<dyn ImageStore>>;

pub struct AppState {
    pub project_handler: AppProjectHandler,
    pub admin_gate: AdminGate,
    pub login_limiter: LoginRateLimiter,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: sqlx::PgPool) -> Self {
        let project_repo = SqlxProjectRepo::new(pool);
        let image_store = LocalImageStore::new(&config.uploads_dir, UPLOADS_URL_PREFIX);

        Self::with_backends(config, Arc::new(project_repo), Arc::new(image_store))
    }

    /// Builds the state around arbitrary backends; tests plug in-memory ones here.
    pub fn with_backends(
        config: &AppConfig,
        project_repo: Arc<dyn ProjectRepository>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        let project_handler = ProjectHandler::new(project_repo, image_store, config.max_image_bytes);

        AppState {
            project_handler,
            admin_gate: AdminGate::from(config),
            login_limiter: LoginRateLimiter::new(config.login_attempts_per_minute),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }
}
