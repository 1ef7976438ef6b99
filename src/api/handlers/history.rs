//! Product history endpoints

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::history::HistoryRecord;
use crate::AppState;
use super::{error_response, ErrorResponse};

#[derive(Serialize, ToSchema)]
pub struct HistoryListResponse {
    pub success: bool,
    pub data: Vec<HistoryRecord>,
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryDeleteResponse {
    pub success: bool,
    pub id: Uuid,
}

/// GET /api/v1/history - Products created through the service, newest first
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "history",
    responses(
        (status = 200, description = "Saved products", body = HistoryListResponse)
    )
)]
pub async fn list_history(state: web::Data<AppState>) -> HttpResponse {
    let data = state.history.list();
    let count = data.len();

    HttpResponse::Ok().json(HistoryListResponse { success: true, data, count })
}

/// DELETE /api/v1/history/{id} - Forget a saved product
#[utoipa::path(
    delete,
    path = "/api/v1/history/{id}",
    tag = "history",
    params(
        ("id" = Uuid, Path, description = "History record ID")
    ),
    responses(
        (status = 200, description = "Record removed", body = HistoryDeleteResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 500, description = "History file could not be written", body = ErrorResponse)
    )
)]
pub async fn delete_history(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    let id = path.into_inner();

    match state.history.remove(id).await {
        Ok(true) => {
            info!(id = %id, "History record removed");
            HttpResponse::Ok().json(HistoryDeleteResponse { success: true, id })
        }
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            "HISTORY_NOT_FOUND",
            format!("History record {} does not exist", id),
        ),
        Err(e) => {
            error!(id = %id, error = %e, "Failed to update history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "HISTORY_ERROR", e.to_string())
        }
    }
}
