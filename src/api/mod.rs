//! API module - HTTP routes and handlers

pub mod handlers;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/mockups")
                    .route("", web::post().to(handlers::mockups::create_mockup))
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("/{product_id}/publish", web::post().to(handlers::products::publish_product))
                    .route("/{product_id}", web::delete().to(handlers::products::delete_product))
            )
            .service(
                web::scope("/uploads")
                    .route("", web::post().to(handlers::uploads::upload_design))
            )
            .service(
                web::scope("/history")
                    .route("", web::get().to(handlers::history::list_history))
                    .route("/{id}", web::delete().to(handlers::history::delete_history))
            )
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    );
}
