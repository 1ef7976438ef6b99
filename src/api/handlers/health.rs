//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub products_loaded: usize,
    pub provider: &'static str,
    /// Requests left in the provider's rate limit window, when reported
    pub rate_limit_remaining: Option<u32>,
    pub image_host_configured: bool,
    pub history_entries: usize,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        products_loaded: state.catalog.all().len(),
        provider: state.provider.code(),
        rate_limit_remaining: state.provider.rate_limit_remaining(),
        image_host_configured: state.uploads.has_host(),
        history_entries: state.history.len(),
    };

    HttpResponse::Ok().json(response)
}
