//! Placement rules per product type
//!
//! Every product type maps to one `ProductProfile` describing whether the
//! artwork must cover the print area edge to edge, how much to over-crop it,
//! where the uploaded image sits inside the print area and which placeholder
//! position is preferred when the provider offers it.

use serde::{Deserialize, Serialize};

use super::catalog::ProductType;

/// Position of an uploaded image inside a placeholder (normalized coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// Horizontal center, 0.0 = left edge, 1.0 = right edge
    pub x: f64,
    /// Vertical center, 0.0 = top edge, 1.0 = bottom edge
    pub y: f64,
    /// 1.0 = image width equals placeholder width
    pub scale: f64,
    pub angle: i32,
}

impl ImagePlacement {
    pub const fn centered(scale: f64) -> Self {
        ImagePlacement { x: 0.5, y: 0.5, scale, angle: 0 }
    }
}

impl Default for ImagePlacement {
    fn default() -> Self {
        ImagePlacement::centered(1.0)
    }
}

/// How the design is rendered before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Cover the placeholder aspect ratio (canvas may be downsized)
    Aspect,
    /// Cover the exact placeholder pixel size (strict device templates)
    ExactPixels,
}

/// Lookup table entry for a product type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductProfile {
    pub requires_full_bleed: bool,
    /// Multiplier applied while fitting, >= 1.0
    pub bleed_factor: f64,
    pub fit_mode: FitMode,
    /// Placement sent with the print area, `None` means centered at scale 1.0
    pub placement_override: Option<ImagePlacement>,
    /// Placeholder position used instead of the template's when available
    pub preferred_position: Option<&'static str>,
}

impl ProductProfile {
    const STANDARD: ProductProfile = ProductProfile {
        requires_full_bleed: false,
        bleed_factor: 1.0,
        fit_mode: FitMode::Aspect,
        placement_override: None,
        preferred_position: None,
    };

    const fn full_bleed(bleed_factor: f64, scale: f64) -> ProductProfile {
        ProductProfile {
            requires_full_bleed: true,
            bleed_factor,
            fit_mode: FitMode::Aspect,
            placement_override: Some(ImagePlacement::centered(scale)),
            preferred_position: None,
        }
    }

    /// Profile for a product type
    pub fn for_type(product_type: ProductType) -> ProductProfile {
        match product_type {
            ProductType::Tshirt | ProductType::Hoodie | ProductType::Mug => Self::STANDARD,
            ProductType::PhoneCase => ProductProfile {
                requires_full_bleed: true,
                bleed_factor: 1.0,
                fit_mode: FitMode::ExactPixels,
                placement_override: Some(ImagePlacement::centered(1.0)),
                preferred_position: Some("back"),
            },
            // Bag seams swallow the outer edge, push the art down and oversize it
            ProductType::ToteBag => ProductProfile {
                requires_full_bleed: true,
                bleed_factor: 1.12,
                fit_mode: FitMode::Aspect,
                placement_override: Some(ImagePlacement { x: 0.5, y: 0.52, scale: 1.15, angle: 0 }),
                preferred_position: None,
            },
            ProductType::Poster => Self::full_bleed(1.02, 1.0),
            ProductType::Canvas => Self::full_bleed(1.05, 1.05),
            ProductType::Blanket => Self::full_bleed(1.04, 1.04),
            ProductType::Pillow => Self::full_bleed(1.04, 1.04),
            ProductType::Sticker => Self::full_bleed(1.0, 1.0),
            ProductType::Journal => Self::full_bleed(1.03, 1.03),
        }
    }

    /// Placement to send with the print area
    pub fn placement(&self) -> ImagePlacement {
        self.placement_override.unwrap_or_default()
    }
}
