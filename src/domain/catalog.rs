//! Catalog Domain Models
//!
//! Product templates offered by the service plus the provider-agnostic view of
//! blueprint and variant metadata returned by the fulfillment catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Product Types
// ============================================================================

/// Physical goods the service can put a design on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ProductType {
    #[serde(rename = "T-Shirt")]
    Tshirt,
    Hoodie,
    Mug,
    #[serde(rename = "Phone Case")]
    PhoneCase,
    #[serde(rename = "Tote Bag")]
    ToteBag,
    Poster,
    Canvas,
    Blanket,
    Pillow,
    Sticker,
    Journal,
}

impl ProductType {
    pub const ALL: [ProductType; 11] = [
        ProductType::Tshirt,
        ProductType::Hoodie,
        ProductType::Mug,
        ProductType::PhoneCase,
        ProductType::ToteBag,
        ProductType::Poster,
        ProductType::Canvas,
        ProductType::Blanket,
        ProductType::Pillow,
        ProductType::Sticker,
        ProductType::Journal,
    ];

    /// Display label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            ProductType::Tshirt => "T-Shirt",
            ProductType::Hoodie => "Hoodie",
            ProductType::Mug => "Mug",
            ProductType::PhoneCase => "Phone Case",
            ProductType::ToteBag => "Tote Bag",
            ProductType::Poster => "Poster",
            ProductType::Canvas => "Canvas",
            ProductType::Blanket => "Blanket",
            ProductType::Pillow => "Pillow",
            ProductType::Sticker => "Sticker",
            ProductType::Journal => "Journal",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    /// Exact label match (case-insensitive), no fuzzy guessing
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown product type: {}", s))
    }
}

// ============================================================================
// Product Templates
// ============================================================================

/// Immutable descriptor of a sellable product, defined at process start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductTemplate {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Retail price in dollars
    pub price: f64,
    pub blueprint_id: u32,
    pub print_provider_id: u32,
    pub default_variant_id: Option<u64>,
    pub print_area_position: String,
}

impl ProductTemplate {
    /// Retail price in cents as the fulfillment API expects it
    pub fn price_cents(&self) -> u64 {
        (self.price * 100.0).round().max(0.0) as u64
    }
}

/// Static catalog of product templates
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    templates: Vec<ProductTemplate>,
}

impl ProductCatalog {
    pub fn new(templates: Vec<ProductTemplate>) -> Self {
        ProductCatalog { templates }
    }

    /// Built-in catalog of blueprint/provider pairings
    pub fn builtin() -> Self {
        fn template(
            id: u32,
            name: &str,
            product_type: ProductType,
            price: f64,
            blueprint_id: u32,
            print_provider_id: u32,
            default_variant_id: Option<u64>,
            position: &str,
        ) -> ProductTemplate {
            ProductTemplate {
                id,
                name: name.to_string(),
                product_type,
                price,
                blueprint_id,
                print_provider_id,
                default_variant_id,
                print_area_position: position.to_string(),
            }
        }

        ProductCatalog::new(vec![
            template(1, "Classic T-Shirt", ProductType::Tshirt, 29.99, 5, 42, Some(4012), "front"),
            template(2, "Cozy Hoodie", ProductType::Hoodie, 49.99, 1908, 410, Some(1), "large_center_embroidery"),
            template(3, "Coffee Mug", ProductType::Mug, 19.99, 68, 1, Some(33719), "front"),
            template(4, "Phone Case", ProductType::PhoneCase, 24.99, 1273, 88, Some(96135), "front"),
            template(5, "Tote Bag", ProductType::ToteBag, 22.99, 1389, 10, Some(103600), "front"),
            template(6, "Matte Poster", ProductType::Poster, 14.99, 282, 2, Some(43135), "front"),
            template(7, "Stretched Canvas", ProductType::Canvas, 39.99, 555, 69, Some(1), "front"),
            template(8, "Sherpa Blanket", ProductType::Blanket, 49.99, 238, 10, Some(41656), "front"),
            template(9, "Square Pillow", ProductType::Pillow, 24.99, 220, 10, Some(41527), "front"),
            template(10, "Die-Cut Stickers", ProductType::Sticker, 4.99, 600, 73, Some(72007), "front"),
            template(11, "Hardcover Journal", ProductType::Journal, 16.99, 485, 28, Some(65223), "front"),
        ])
    }

    pub fn get(&self, id: u32) -> Option<&ProductTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[ProductTemplate] {
        &self.templates
    }
}

// ============================================================================
// Fulfillment Catalog Metadata
// ============================================================================

/// Named print location on a variant with provider-defined pixel size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub position: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Placeholder {
    /// Pixel dimensions when both are known and non-zero
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

/// Sellable configuration of a blueprint at one print provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: u64,
    pub title: Option<String>,
    pub is_default: bool,
    /// `None` when the catalog did not report the flag
    pub is_available: Option<bool>,
    pub is_enabled: Option<bool>,
    pub placeholders: Vec<Placeholder>,
    /// Catalog photo of this variant
    #[serde(default)]
    pub preview: Option<String>,
}

impl Variant {
    pub fn new(id: u64) -> Self {
        Variant {
            id,
            title: None,
            is_default: false,
            is_available: None,
            is_enabled: None,
            placeholders: Vec::new(),
            preview: None,
        }
    }

    pub fn placeholder(&self, position: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.position == position)
    }
}

/// Blueprint summary used for fallback previews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintInfo {
    pub id: u32,
    pub title: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub images: Vec<String>,
}

impl BlueprintInfo {
    /// First catalog image, shown when no rendered mockup arrives
    pub fn fallback_preview(&self) -> Option<&str> {
        self.images.iter().map(String::as_str).find(|s| !s.is_empty())
    }
}
