//! Design hosting endpoint

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::DesignAsset;
use crate::storage::UploadError;
use crate::AppState;
use super::{error_response, ErrorResponse};

/// Request body for hosting a design; exactly one source is required
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// `data:image/...;base64,...` URL or bare base64
    #[serde(default)]
    pub data_url: Option<String>,
    /// Public image to re-host
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Public URL of the hosted image
    pub url: String,
}

fn upload_failure(err: &UploadError) -> HttpResponse {
    let (status, code) = match err {
        UploadError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
        UploadError::UnsupportedMediaType(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE"),
        UploadError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "IMAGE_HOST_NOT_CONFIGURED"),
        UploadError::UploadFailed { .. } => (StatusCode::BAD_GATEWAY, "UPLOAD_FAILED"),
    };
    error_response(status, code, err.to_string())
}

/// POST /api/v1/uploads - Host a design on the public image host
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "uploads",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Design hosted", body = UploadResponse),
        (status = 400, description = "Missing or malformed design", body = ErrorResponse),
        (status = 413, description = "Design too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image type", body = ErrorResponse),
        (status = 502, description = "Image host rejected the upload", body = ErrorResponse)
    )
)]
pub async fn upload_design(state: web::Data<AppState>, body: web::Json<UploadRequest>) -> HttpResponse {
    let body = body.into_inner();
    let file_name = body.file_name.as_deref().unwrap_or("design.png");

    let design = match (body.data_url.as_deref(), body.url.as_deref()) {
        (Some(data_url), None) => DesignAsset::parse(data_url, file_name),
        (None, Some(url)) => DesignAsset::parse(url, file_name),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                "Provide exactly one of `data_url` or `url`",
            );
        }
    };

    let result = match design {
        Ok(DesignAsset::Encoded { bytes, file_name }) => state.uploads.upload_from_bytes(&bytes, &file_name).await,
        Ok(DesignAsset::Hosted(url)) => state.uploads.upload_from_url(&url).await,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_DESIGN", e.to_string()),
    };

    match result {
        Ok(url) => {
            info!(url = %url, "Design hosted");
            HttpResponse::Ok().json(UploadResponse { success: true, url })
        }
        Err(e) => {
            error!(error = %e, "Design upload failed");
            upload_failure(&e)
        }
    }
}
