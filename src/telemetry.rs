use tracing_subscriber::EnvFilter;

use crate::settings::AppEnvironment;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Installs the global tracing subscriber. JSON lines in production, compact text elsewhere.
pub fn init_tracing(env: &AppEnvironment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match env {
        AppEnvironment::Production => builder.json().init(),
        _ => builder.compact().init(),
    }
}
