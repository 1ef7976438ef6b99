//! Mockup generation endpoint

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{DesignAsset, ProductTemplate};
use crate::history::HistoryRecord;
use crate::mockup::{MockupError, MockupOutcome};
use crate::AppState;
use super::{error_response, ErrorResponse};

/// Request body for mockup generation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMockupRequest {
    /// Product template ID from `GET /api/v1/products`
    pub product_id: u32,
    /// Design as a data URL, bare base64 or public http(s) URL
    pub design: String,
    /// File name reported to the image host
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Prompt the design was generated from, used in the default title
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Fallback recorded during the run
#[derive(Serialize, ToSchema)]
pub struct WarningInfo {
    pub kind: String,
    pub message: String,
}

/// Response for a finished mockup run
#[derive(Serialize, ToSchema)]
pub struct MockupResponse {
    pub success: bool,
    /// Fulfillment provider product ID
    pub product_id: String,
    /// Rendered mockup, or the catalog image when rendering timed out
    pub preview_url: Option<String>,
    /// `succeeded`, `degraded` or `timed_out`
    pub state: String,
    pub title: String,
    pub position: String,
    pub variant_ids: Vec<u64>,
    pub poll_attempts: u32,
    pub generation_time_ms: u64,
    pub warnings: Vec<WarningInfo>,
    pub history_id: Option<Uuid>,
}

/// HTTP status for an orchestration failure
pub fn status_for(err: &MockupError) -> StatusCode {
    match err {
        MockupError::Validation(_) => StatusCode::BAD_REQUEST,
        MockupError::CatalogMisconfigured { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        MockupError::UploadFailed { .. } | MockupError::ProductCreationFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Explicit title, else "{name} - {prompt}", else the orchestrator default
fn request_title(template: &ProductTemplate, title: Option<&str>, prompt: Option<&str>) -> Option<String> {
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    let prompt = prompt.map(str::trim).filter(|p| !p.is_empty());
    match (title, prompt) {
        (Some(title), _) => Some(title.to_string()),
        (None, Some(prompt)) => Some(format!("{} - {}", template.name, prompt)),
        (None, None) => None,
    }
}

/// POST /api/v1/mockups - Put a design on a product and wait for the mockup
#[utoipa::path(
    post,
    path = "/api/v1/mockups",
    tag = "mockups",
    request_body = CreateMockupRequest,
    responses(
        (status = 200, description = "Draft product created", body = MockupResponse),
        (status = 400, description = "Invalid design or request", body = ErrorResponse),
        (status = 404, description = "Product template not found", body = ErrorResponse),
        (status = 422, description = "Catalog lists no variants for the product", body = ErrorResponse),
        (status = 502, description = "Upload or product creation failed upstream", body = ErrorResponse)
    )
)]
pub async fn create_mockup(
    state: web::Data<AppState>,
    body: web::Json<CreateMockupRequest>,
) -> HttpResponse {
    let start = Instant::now();
    let body = body.into_inner();

    let Some(template) = state.catalog.get(body.product_id).cloned() else {
        return error_response(
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
            format!("Product template {} does not exist", body.product_id),
        );
    };

    let file_name = body.file_name.as_deref().unwrap_or("design.png");
    let design = match DesignAsset::parse(&body.design, file_name) {
        Ok(design) => design,
        Err(e) => {
            warn!(error = %e, "Rejected design payload");
            return error_response(StatusCode::BAD_REQUEST, "INVALID_DESIGN", e.to_string());
        }
    };

    info!(
        product_id = template.id,
        product_type = %template.product_type,
        design = %design.describe(),
        "Processing mockup request"
    );

    let title = request_title(&template, body.title.as_deref(), body.prompt.as_deref());

    let outcome = match state
        .orchestrator
        .generate_mockup(&template, design, title, body.description)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, code = e.code(), "Mockup generation failed");
            return error_response(status_for(&e), &e.code().to_uppercase(), e.to_string());
        }
    };

    let history_id = record_history(&state, &template, &outcome).await;
    let elapsed = start.elapsed().as_millis() as u64;

    info!(
        product_id = %outcome.product_id,
        state = %outcome.state,
        generation_time_ms = elapsed,
        "Mockup request finished"
    );

    HttpResponse::Ok().json(MockupResponse {
        success: true,
        product_id: outcome.product_id,
        preview_url: outcome.preview_url,
        state: outcome.state.to_string(),
        title: outcome.title,
        position: outcome.position,
        variant_ids: outcome.variant_ids,
        poll_attempts: outcome.poll_attempts,
        generation_time_ms: elapsed,
        warnings: outcome
            .warnings
            .iter()
            .map(|w| WarningInfo { kind: w.kind().to_string(), message: w.to_string() })
            .collect(),
        history_id,
    })
}

/// History failures are logged, never returned to the caller
async fn record_history(state: &AppState, template: &ProductTemplate, outcome: &MockupOutcome) -> Option<Uuid> {
    match state.history.append(HistoryRecord::from_outcome(template, outcome)).await {
        Ok(record) => Some(record.id),
        Err(e) => {
            warn!(error = %e, product_id = %outcome.product_id, "Failed to record history");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductCatalog;
    use crate::mockup::error::UploadStage;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&MockupError::Validation("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&MockupError::CatalogMisconfigured { blueprint_id: 1, print_provider_id: 2 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&MockupError::UploadFailed { stage: UploadStage::ImageHost, message: "x".into() }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_request_title() {
        let catalog = ProductCatalog::builtin();
        let mug = catalog.get(3).unwrap();

        assert_eq!(request_title(mug, Some("  My Mug "), Some("cats")), Some("My Mug".to_string()));
        assert_eq!(request_title(mug, None, Some("cats in space")), Some("Coffee Mug - cats in space".to_string()));
        assert_eq!(request_title(mug, Some(""), None), None);
    }
}
