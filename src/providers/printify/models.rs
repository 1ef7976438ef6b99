//! Printify API Response Models
//!
//! These models represent the JSON payloads of the Printify REST API.
//! Catalog models are mapped to domain types in the mapper module; product
//! payloads already use the wire field names and are (de)serialized directly.

use serde::{Deserialize, Serialize};

// ============================================================================
// Uploads
// ============================================================================

/// Upload by public URL
#[derive(Debug, Serialize)]
pub struct UploadByUrlRequest<'a> {
    pub file_name: &'a str,
    pub url: &'a str,
}

/// Upload by base64 contents
#[derive(Debug, Serialize)]
pub struct UploadBase64Request<'a> {
    pub file_name: &'a str,
    pub contents: &'a str,
}

/// Uploaded image (from POST /uploads/images.json)
#[derive(Debug, Deserialize)]
pub struct PrintifyUpload {
    pub id: String,
    pub file_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub preview_url: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Blueprint detail (from /catalog/blueprints/{id}.json)
#[derive(Debug, Deserialize)]
pub struct PrintifyBlueprint {
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Variants listing, returned either wrapped or as a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PrintifyVariantsResponse {
    Wrapped {
        id: Option<u32>,
        title: Option<String>,
        variants: Vec<PrintifyVariant>,
    },
    Bare(Vec<PrintifyVariant>),
}

impl PrintifyVariantsResponse {
    pub fn into_variants(self) -> Vec<PrintifyVariant> {
        match self {
            PrintifyVariantsResponse::Wrapped { variants, .. } => variants,
            PrintifyVariantsResponse::Bare(variants) => variants,
        }
    }
}

/// Catalog variant for a blueprint/print provider pair
#[derive(Debug, Clone, Deserialize)]
pub struct PrintifyVariant {
    pub id: u64,
    pub title: Option<String>,
    pub options: Option<serde_json::Value>,
    #[serde(default)]
    pub placeholders: Vec<PrintifyPlaceholder>,
    pub is_default: Option<bool>,
    pub is_available: Option<bool>,
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub images: Vec<PrintifyVariantImage>,
    pub preview: Option<String>,
}

/// Catalog photo attached to a variant
#[derive(Debug, Clone, Deserialize)]
pub struct PrintifyVariantImage {
    #[serde(default)]
    pub src: String,
}

/// Print placeholder of a catalog variant
#[derive(Debug, Clone, Deserialize)]
pub struct PrintifyPlaceholder {
    pub position: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

// ============================================================================
// Publishing
// ============================================================================

/// Which product fields the sales channel should take over
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub title: bool,
    pub description: bool,
    pub images: bool,
    pub variants: bool,
    pub tags: bool,
    pub key_features: bool,
    #[serde(rename = "shipping_template")]
    pub shipping_template: bool,
    #[serde(rename = "retail_prices")]
    pub retail_prices: bool,
}

impl PublishRequest {
    pub fn everything() -> Self {
        PublishRequest {
            title: true,
            description: true,
            images: true,
            variants: true,
            tags: true,
            key_features: true,
            shipping_template: true,
            retail_prices: true,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct PrintifyErrorBody {
    pub message: Option<String>,
    pub code: Option<i64>,
    pub errors: Option<serde_json::Value>,
}
