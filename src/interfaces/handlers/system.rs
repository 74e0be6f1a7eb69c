use actix_web::{web, get, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use std::{
    time::Duration,
    sync::{atomic::{AtomicI64, Ordering}, RwLock},
};
use sysinfo::System;
use serde::{Deserialize, Serialize};
use crate::{
    constants::START_TIME,
    repositories::{image_store::ImageStore, project::ProjectRepository},
    AppState,
};

/// Seconds a computed health report is reused before probing again.
const CACHE_TTL_SECS: i64 = 5;

#[derive(Serialize, Deserialize, Clone, Default, Debug)]
pub struct HealthCheckResponse {
    pub status: String,
    pub uptime: String,
    pub timestamp: String,
    pub started_at: String,
    pub database: String,
    pub uploads: String,
    pub version: String,
    pub memory_usage: String,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let handler = &state.project_handler;
    let (database, uploads) = tokio::join!(
        handler.project_repo.check_connection(),
        handler.image_store.check_writable(),
    );

    let db_status = match database {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unavailable");
            "Unavailable"
        }
    };
    let uploads_status = match uploads {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: uploads directory not writable");
            "Unavailable"
        }
    };

    let status = if db_status == "OK" && uploads_status == "OK" { "healthy" } else { "degraded" };

    let mut sys = System::new();
    sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
    let memory_usage = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| {
            format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
        });

    HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        started_at: START_TIME.to_rfc3339(),
        database: db_status.to_string(),
        uploads: uploads_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > CACHE_TTL_SECS {
        let response = build_health_response(&state).await;

        if let Ok(mut cache) = CACHED_STATUS.write() {
            *cache = response.clone();
            LAST_CHECK.store(now, Ordering::Relaxed);
        }

        HttpResponse::Ok().json(response)
    } else {
        match CACHED_STATUS.read() {
            Ok(response) => HttpResponse::Ok().json(response.clone()),
            Err(e) => {
                tracing::warn!("HealthCheck cache lock poisoned: {}", e);
                let response = build_health_response(&state).await;
                HttpResponse::Ok().json(response)
            }
        }
    }
}
