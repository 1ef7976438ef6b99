//! Cover-fit of a design onto a print placeholder
//!
//! The design is scaled so it covers the whole target canvas (never
//! letterboxed, never distorted) and centered. A bleed factor above 1.0
//! over-crops on purpose so trimming at the print shop leaves no gaps.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use thiserror::Error;
use tracing::{debug, warn};

/// Placeholders with a longer edge than this are not rendered, the design is
/// passed through untouched instead
pub const MAX_RENDER_EDGE: u32 = 16384;

/// Fitting errors
#[derive(Debug, Error)]
pub enum FitError {
    #[error("Failed to decode design image: {0}")]
    ImageDecode(#[source] image::ImageError),
    #[error("Failed to encode fitted image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Placement of the scaled source relative to the target canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverGeometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub draw_width: f64,
    pub draw_height: f64,
    /// Left edge of the drawn image, negative when cropping
    pub dx: f64,
    /// Top edge of the drawn image, negative when cropping
    pub dy: f64,
}

/// Region of the source image that ends up visible, in source pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn contains(&self, other: &SourceRect) -> bool {
        const EPS: f64 = 1e-6;
        other.x + EPS >= self.x
            && other.y + EPS >= self.y
            && other.x + other.width <= self.x + self.width + EPS
            && other.y + other.height <= self.y + self.height + EPS
    }
}

/// Bleed values below 1.0 (or NaN) would letterbox, treat them as exact cover
pub fn normalize_bleed(bleed: f64) -> f64 {
    if bleed.is_finite() && bleed >= 1.0 {
        bleed
    } else {
        1.0
    }
}

impl CoverGeometry {
    pub fn compute(src_width: u32, src_height: u32, canvas_width: u32, canvas_height: u32, bleed: f64) -> Self {
        let canvas_width = canvas_width.max(1);
        let canvas_height = canvas_height.max(1);
        let bleed = normalize_bleed(bleed);

        let target_aspect = canvas_width as f64 / canvas_height as f64;
        let src_aspect = src_width.max(1) as f64 / src_height.max(1) as f64;

        let (draw_width, draw_height) = if src_aspect > target_aspect {
            let h = canvas_height as f64 * bleed;
            (h * src_aspect, h)
        } else {
            let w = canvas_width as f64 * bleed;
            (w, w / src_aspect)
        };

        CoverGeometry {
            canvas_width,
            canvas_height,
            draw_width,
            draw_height,
            dx: (canvas_width as f64 - draw_width) / 2.0,
            dy: (canvas_height as f64 - draw_height) / 2.0,
        }
    }

    /// Visible part of the source once drawn onto the canvas
    pub fn source_crop(&self, src_width: u32, src_height: u32) -> SourceRect {
        let scale = self.draw_width / src_width.max(1) as f64;
        let width = (self.canvas_width as f64 / scale).min(src_width as f64);
        let height = (self.canvas_height as f64 / scale).min(src_height as f64);

        SourceRect {
            x: (-self.dx / scale).max(0.0),
            y: (-self.dy / scale).max(0.0),
            width,
            height,
        }
    }
}

/// Fitted PNG plus its final dimensions
#[derive(Debug, Clone)]
pub struct FittedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    /// `false` when the source was passed through untouched
    pub modified: bool,
}

/// Cover `target_width` x `target_height` with the design, scaled by `bleed`
pub fn fit(source: &[u8], target_width: u32, target_height: u32, bleed: f64) -> Result<FittedImage, FitError> {
    render_bounded(source, target_width, target_height, bleed)
}

/// Cover exactly `exact_width` x `exact_height` pixels
pub fn cover_exact(source: &[u8], exact_width: u32, exact_height: u32, overscan: f64) -> Result<FittedImage, FitError> {
    render_bounded(source, exact_width, exact_height, overscan)
}

/// Output is always the requested size, or the untouched source above `MAX_RENDER_EDGE`
fn render_bounded(source: &[u8], width: u32, height: u32, bleed: f64) -> Result<FittedImage, FitError> {
    let (w, h) = (width.max(1), height.max(1));
    if w > MAX_RENDER_EDGE || h > MAX_RENDER_EDGE {
        warn!(width = w, height = h, "Placeholder too large to render, keeping design as-is");
        return passthrough(source);
    }
    render(source, w, h, bleed)
}

fn decode(source: &[u8]) -> Result<DynamicImage, FitError> {
    image::load_from_memory(source).map_err(FitError::ImageDecode)
}

fn passthrough(source: &[u8]) -> Result<FittedImage, FitError> {
    let (width, height) = decode(source)?.dimensions();
    Ok(FittedImage {
        bytes: Bytes::copy_from_slice(source),
        width,
        height,
        modified: false,
    })
}

fn render(source: &[u8], canvas_width: u32, canvas_height: u32, bleed: f64) -> Result<FittedImage, FitError> {
    let image = decode(source)?;
    let (src_width, src_height) = image.dimensions();
    let bleed = normalize_bleed(bleed);

    if (src_width, src_height) == (canvas_width, canvas_height) && bleed == 1.0 {
        debug!(width = src_width, height = src_height, "Design already matches placeholder");
        return Ok(FittedImage {
            bytes: Bytes::copy_from_slice(source),
            width: src_width,
            height: src_height,
            modified: false,
        });
    }

    let geometry = CoverGeometry::compute(src_width, src_height, canvas_width, canvas_height, bleed);
    let crop = geometry.source_crop(src_width, src_height);

    let x = (crop.x.floor() as u32).min(src_width.saturating_sub(1));
    let y = (crop.y.floor() as u32).min(src_height.saturating_sub(1));
    let w = (crop.width.round() as u32).clamp(1, src_width - x);
    let h = (crop.height.round() as u32).clamp(1, src_height - y);

    debug!(
        src_width,
        src_height,
        canvas_width,
        canvas_height,
        bleed,
        crop_x = x,
        crop_y = y,
        crop_width = w,
        crop_height = h,
        "Fitting design to placeholder"
    );

    let fitted = image
        .crop_imm(x, y, w, h)
        .resize_exact(canvas_width, canvas_height, image::imageops::FilterType::Lanczos3);

    let bytes = encode_png(&fitted)?;

    Ok(FittedImage {
        bytes,
        width: canvas_width,
        height: canvas_height,
        modified: true,
    })
}

/// Encode to PNG (lossless, keeps transparency)
fn encode_png(image: &DynamicImage) -> Result<Bytes, FitError> {
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    let mut buffer = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)
        .map_err(FitError::Encode)?;
    Ok(Bytes::from(buffer))
}
