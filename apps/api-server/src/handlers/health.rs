//! Health check and home statistics.

use actix_web::{HttpResponse, web};
use sapien_core::services::HomeStats;
use serde::Serialize;

use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub database: &'static str,
    pub version: &'static str,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = if state.database_connected().await {
        "connected"
    } else {
        "disconnected"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        message: "Hello from Sapien!",
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub success: bool,
    pub data: HomeStats,
    pub timestamp: String,
}

/// GET /api/home
pub async fn home(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let data = state.home.stats().await?;

    Ok(HttpResponse::Ok().json(HomeResponse {
        success: true,
        data,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
