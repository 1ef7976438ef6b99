//! Product catalog and draft product management endpoints

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::ProductTemplate;
use crate::providers::ProviderError;
use crate::AppState;
use super::{error_response, ErrorResponse};

/// Response for listing product templates
#[derive(Serialize, ToSchema)]
pub struct ProductsListResponse {
    pub success: bool,
    pub data: Vec<ProductTemplate>,
    pub count: usize,
}

/// Response for publish/delete actions
#[derive(Serialize, ToSchema)]
pub struct ProductActionResponse {
    pub success: bool,
    pub product_id: String,
    pub action: String,
}

fn provider_failure(err: &ProviderError) -> HttpResponse {
    let (status, code) = match err {
        ProviderError::NotFound(_) => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
        ProviderError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_NOT_CONFIGURED"),
        ProviderError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "PROVIDER_RATE_LIMITED"),
        _ => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
    };
    error_response(status, code, err.summary())
}

/// GET /api/v1/products - List product templates
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    responses(
        (status = 200, description = "Product templates offered by the service", body = ProductsListResponse)
    )
)]
pub async fn list_products(state: web::Data<AppState>) -> HttpResponse {
    let data = state.catalog.all().to_vec();
    let count = data.len();

    HttpResponse::Ok().json(ProductsListResponse { success: true, data, count })
}

/// POST /api/v1/products/{product_id}/publish - Publish a draft product
#[utoipa::path(
    post,
    path = "/api/v1/products/{product_id}/publish",
    tag = "products",
    params(
        ("product_id" = String, Path, description = "Fulfillment provider product ID")
    ),
    responses(
        (status = 200, description = "Publish requested", body = ProductActionResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 502, description = "Provider rejected the request", body = ErrorResponse)
    )
)]
pub async fn publish_product(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let product_id = path.into_inner();

    match state.provider.publish_product(&product_id).await {
        Ok(()) => {
            info!(product_id = %product_id, "Product publish requested");
            HttpResponse::Ok().json(ProductActionResponse {
                success: true,
                product_id,
                action: "published".to_string(),
            })
        }
        Err(e) => {
            error!(product_id = %product_id, error = %e, "Publish failed");
            provider_failure(&e)
        }
    }
}

/// DELETE /api/v1/products/{product_id} - Delete a draft product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = String, Path, description = "Fulfillment provider product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ProductActionResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 502, description = "Provider rejected the request", body = ErrorResponse)
    )
)]
pub async fn delete_product(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let product_id = path.into_inner();

    match state.provider.delete_product(&product_id).await {
        Ok(()) => {
            info!(product_id = %product_id, "Product deleted");
            HttpResponse::Ok().json(ProductActionResponse {
                success: true,
                product_id,
                action: "deleted".to_string(),
            })
        }
        Err(e) => {
            error!(product_id = %product_id, error = %e, "Delete failed");
            provider_failure(&e)
        }
    }
}
