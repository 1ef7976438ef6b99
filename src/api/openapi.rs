//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    health::HealthResponse,
    history::{HistoryDeleteResponse, HistoryListResponse},
    mockups::{CreateMockupRequest, MockupResponse, WarningInfo},
    products::{ProductActionResponse, ProductsListResponse},
    uploads::{UploadRequest, UploadResponse},
    ApiError, ErrorResponse,
};
use crate::domain::{ProductTemplate, ProductType};
use crate::history::HistoryRecord;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Automerch API",
        version = "1.0.0",
        description = "Print-on-demand mockup workflow: host a design, create a draft product and fetch its rendered mockup",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "mockups", description = "Mockup generation endpoints"),
        (name = "products", description = "Product templates and draft product management"),
        (name = "uploads", description = "Design hosting"),
        (name = "history", description = "Products created through the service")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::mockups::create_mockup,
        crate::api::handlers::products::list_products,
        crate::api::handlers::products::publish_product,
        crate::api::handlers::products::delete_product,
        crate::api::handlers::uploads::upload_design,
        crate::api::handlers::history::list_history,
        crate::api::handlers::history::delete_history,
    ),
    components(
        schemas(
            // Health schemas
            HealthResponse,
            // Mockup schemas
            CreateMockupRequest,
            MockupResponse,
            WarningInfo,
            // Product schemas
            ProductsListResponse,
            ProductActionResponse,
            ProductTemplate,
            ProductType,
            // Upload schemas
            UploadRequest,
            UploadResponse,
            // History schemas
            HistoryListResponse,
            HistoryDeleteResponse,
            HistoryRecord,
            // Errors
            ErrorResponse,
            ApiError,
        )
    )
)]
pub struct ApiDoc;
