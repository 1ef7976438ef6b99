//! Fulfillment provider contract
//!
//! The mockup pipeline talks to the print-on-demand backend only through the
//! `FulfillmentProvider` trait, so the orchestrator can be exercised against
//! in-memory fakes and other backends can be added beside Printify.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    BlueprintInfo, PrintAreaPatch, ProductDraft, ProviderProduct, UploadHandle, Variant,
};

// ============================================================================
// Error Types
// ============================================================================

/// Provider error types
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Provider-side message without transport details
    pub fn summary(&self) -> String {
        match self {
            ProviderError::ApiError { status, message } => format!("{} - {}", status, message),
            ProviderError::Http(e) if e.is_timeout() => "request timed out".to_string(),
            ProviderError::Http(e) if e.is_connect() => "connection failed".to_string(),
            ProviderError::Http(_) => "transport error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Provider Trait
// ============================================================================

/// Print-on-demand fulfillment backend
#[async_trait]
pub trait FulfillmentProvider: Send + Sync {
    /// Provider code (e.g., "printify")
    fn code(&self) -> &'static str;

    /// Remaining requests in the current rate limit window, if known
    fn rate_limit_remaining(&self) -> Option<u32>;

    /// Storefront checked before the primary shop while polling, if any
    fn alternate_shop(&self) -> Option<&str>;

    /// Register a publicly reachable image
    async fn upload_image_by_url(&self, file_name: &str, url: &str) -> ProviderResult<UploadHandle>;

    /// Register an image from base64 contents
    async fn upload_image_base64(&self, file_name: &str, contents: &str) -> ProviderResult<UploadHandle>;

    async fn get_blueprint(&self, blueprint_id: u32) -> ProviderResult<BlueprintInfo>;

    async fn get_variants(&self, blueprint_id: u32, print_provider_id: u32) -> ProviderResult<Vec<Variant>>;

    async fn create_product(&self, draft: &ProductDraft) -> ProviderResult<ProviderProduct>;

    async fn update_product(&self, product_id: &str, patch: &PrintAreaPatch) -> ProviderResult<ProviderProduct>;

    /// Fetch a product from the primary shop
    async fn get_product(&self, product_id: &str) -> ProviderResult<ProviderProduct>;

    /// Fetch a product from a specific shop
    async fn get_product_for_shop(&self, shop_id: &str, product_id: &str) -> ProviderResult<ProviderProduct>;

    async fn publish_product(&self, product_id: &str) -> ProviderResult<()>;

    async fn delete_product(&self, product_id: &str) -> ProviderResult<()>;
}
