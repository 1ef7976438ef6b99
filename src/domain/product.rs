//! Draft product payloads and the provider's product view
//!
//! Field names follow the fulfillment API wire format so the draft serializes
//! directly into the create/update request body.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::placement::ImagePlacement;

/// Draft invariant violations
#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("draft product must reference at least one variant")]
    NoVariants,
    #[error("print area references variant {0} that is not attached to the product")]
    ForeignVariant(u64),
    #[error("print area has no placeholder image")]
    EmptyPrintArea,
}

/// Hosted image registered with the fulfillment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    pub id: String,
}

/// Variant line of a draft product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftVariant {
    pub id: u64,
    /// Price in cents
    pub price: u64,
    pub is_enabled: bool,
}

/// Image placed inside a print-area placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    /// Upload handle id
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub angle: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintAreaPlaceholder {
    pub position: String,
    pub images: Vec<PlacedImage>,
}

/// Binds a set of variants to placeholder artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintArea {
    pub variant_ids: Vec<u64>,
    pub placeholders: Vec<PrintAreaPlaceholder>,
}

impl PrintArea {
    /// One placeholder carrying one uploaded image for every given variant
    pub fn single(variant_ids: Vec<u64>, position: &str, upload: &UploadHandle, placement: ImagePlacement) -> Self {
        PrintArea {
            variant_ids,
            placeholders: vec![PrintAreaPlaceholder {
                position: position.to_string(),
                images: vec![PlacedImage {
                    id: upload.id.clone(),
                    x: placement.x,
                    y: placement.y,
                    scale: placement.scale,
                    angle: placement.angle,
                }],
            }],
        }
    }
}

/// Create-product request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub blueprint_id: u32,
    pub print_provider_id: u32,
    pub variants: Vec<DraftVariant>,
    pub print_areas: Vec<PrintArea>,
}

impl ProductDraft {
    /// Check variant/print-area consistency before sending
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.variants.is_empty() {
            return Err(DraftError::NoVariants);
        }

        for area in &self.print_areas {
            if area.placeholders.iter().all(|p| p.images.is_empty()) {
                return Err(DraftError::EmptyPrintArea);
            }
            if let Some(foreign) = area
                .variant_ids
                .iter()
                .find(|id| !self.variants.iter().any(|v| v.id == **id))
            {
                return Err(DraftError::ForeignVariant(*foreign));
            }
        }

        Ok(())
    }

    pub fn variant_ids(&self) -> Vec<u64> {
        self.variants.iter().map(|v| v.id).collect()
    }
}

/// Update-product request body carrying only the print areas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintAreaPatch {
    pub print_areas: Vec<PrintArea>,
}

/// Rendered image attached to a provider product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub src: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub variant_ids: Vec<u64>,
    #[serde(default)]
    pub position: Option<String>,
}

/// Product as reported by the fulfillment provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProduct {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl ProviderProduct {
    /// Image flagged default, else the first image with a source
    pub fn preview_src(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.is_default && !img.src.is_empty())
            .or_else(|| self.images.iter().find(|img| !img.src.is_empty()))
            .map(|img| img.src.as_str())
    }
}
