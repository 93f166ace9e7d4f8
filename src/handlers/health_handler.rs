use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::app_state::AppState;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/health/ready")]
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    let Some(db) = &state.db else {
        return HttpResponse::ServiceUnavailable().json(json!({
            "status": "unavailable",
            "database": "not configured",
        }));
    };

    match db.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ready",
            "database": "connected",
        })),
        Err(err) => {
            log::warn!("Readiness check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "database": "unreachable",
            }))
        }
    }
}
