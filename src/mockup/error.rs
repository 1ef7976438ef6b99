//! Caller-facing failures and non-fatal resolution warnings

use serde::Serialize;
use thiserror::Error;

/// Step at which an upload failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    /// Hosting the design on the public image host
    ImageHost,
    /// Registering the hosted image with the fulfillment provider
    ProviderRegistration,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStage::ImageHost => write!(f, "image_host"),
            UploadStage::ProviderRegistration => write!(f, "provider_registration"),
        }
    }
}

/// Errors that end a mockup run
#[derive(Debug, Error)]
pub enum MockupError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("upload failed at {stage}: {message}")]
    UploadFailed { stage: UploadStage, message: String },

    #[error("catalog lists no variants for blueprint {blueprint_id} at print provider {print_provider_id}")]
    CatalogMisconfigured { blueprint_id: u32, print_provider_id: u32 },

    #[error("product creation failed for blueprint {blueprint_id} at print provider {print_provider_id}: {message}")]
    ProductCreationFailed {
        blueprint_id: u32,
        print_provider_id: u32,
        message: String,
    },
}

impl MockupError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            MockupError::Validation(_) => "validation_error",
            MockupError::UploadFailed { .. } => "upload_failed",
            MockupError::CatalogMisconfigured { .. } => "catalog_misconfigured",
            MockupError::ProductCreationFailed { .. } => "product_creation_failed",
        }
    }
}

/// Fallback taken during a run that did not stop it
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    #[error("blueprint {blueprint_id} unavailable, no fallback preview: {message}")]
    BlueprintUnavailable { blueprint_id: u32, message: String },

    #[error("variants unavailable, using variant {fallback_variant_id}: {message}")]
    CatalogUnavailable {
        blueprint_id: u32,
        print_provider_id: u32,
        fallback_variant_id: u64,
        message: String,
    },

    #[error("catalog returned no variants, using variant {fallback_variant_id}")]
    EmptyCatalog {
        blueprint_id: u32,
        print_provider_id: u32,
        fallback_variant_id: u64,
    },

    #[error("all {variant_count} variants are flagged disabled, offering them all")]
    NoSellableVariants { variant_count: usize },

    #[error("design not fitted: {reason}")]
    FitSkipped { reason: String },

    #[error("print area update for product {product_id} failed: {message}")]
    PatchFailed { product_id: String, message: String },
}

impl ResolutionWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionWarning::BlueprintUnavailable { .. } => "blueprint_unavailable",
            ResolutionWarning::CatalogUnavailable { .. } => "catalog_unavailable",
            ResolutionWarning::EmptyCatalog { .. } => "empty_catalog",
            ResolutionWarning::NoSellableVariants { .. } => "no_sellable_variants",
            ResolutionWarning::FitSkipped { .. } => "fit_skipped",
            ResolutionWarning::PatchFailed { .. } => "patch_failed",
        }
    }
}
