use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use porto_backend::{
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    routes::{configure_routes, configure_upload_limits},
    settings::{AppConfig, AppEnvironment},
    telemetry::init_tracing,
    AppState,
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let env = AppEnvironment::from_env().unwrap_or(AppEnvironment::Development);
    init_tracing(&env);

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        tracing::error!("Failed to apply migrations: {}", e);
        std::process::exit(1);
    }

    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let app_state = web::Data::new(
        AppState::new(&config, pool.clone())
    );

    let server_addr = config.server_addr();
    let cors_origins = config.cors_origins();
    let max_image_bytes = config.max_image_bytes;

    tracing::info!(
        "🚀 Starting {} v{} on {} ({})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.env
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&cors_origins))
            .wrap(TracingLogger::default())
            .configure(configure_upload_limits(max_image_bytes))
            .configure(configure_routes)
    })
    .workers(config.worker_count.max(1))
    .disable_signals()
    .bind(&server_addr)?
    .run();

    let handle = server.handle();

    tokio::select! {
        res = server => res?,
        _ = shutdown_signal() => {
            handle.stop(true).await;
        }
    }

    pool.close().await;
    tracing::info!("Server stopped, database pool closed.");
    Ok(())
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = if origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}
