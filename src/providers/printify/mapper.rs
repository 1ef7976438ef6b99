//! Printify to domain model mapper

use crate::domain::{BlueprintInfo, Placeholder, UploadHandle, Variant};
use super::models::*;

/// Mapper for Printify API responses
pub struct PrintifyMapper;

impl PrintifyMapper {
    pub fn map_upload(upload: PrintifyUpload) -> UploadHandle {
        UploadHandle { id: upload.id }
    }

    pub fn map_blueprint(blueprint: PrintifyBlueprint) -> BlueprintInfo {
        BlueprintInfo {
            id: blueprint.id,
            title: blueprint.title,
            brand: blueprint.brand,
            model: blueprint.model,
            images: blueprint.images,
        }
    }

    /// Map a catalog variant; missing flags stay unknown rather than false
    pub fn map_variant(variant: PrintifyVariant) -> Variant {
        let preview = variant
            .images
            .into_iter()
            .map(|image| image.src)
            .chain(variant.preview)
            .find(|src| !src.is_empty());

        Variant {
            id: variant.id,
            title: variant.title,
            is_default: variant.is_default.unwrap_or(false),
            is_available: variant.is_available,
            is_enabled: variant.is_enabled,
            placeholders: variant
                .placeholders
                .into_iter()
                .map(Self::map_placeholder)
                .collect(),
            preview,
        }
    }

    fn map_placeholder(placeholder: PrintifyPlaceholder) -> Placeholder {
        let px = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0).map(|v| v.round() as u32);
        Placeholder {
            position: placeholder.position,
            width: px(placeholder.width),
            height: px(placeholder.height),
        }
    }

    /// Pull a readable message out of an error body
    pub fn error_message(body: &str) -> String {
        match serde_json::from_str::<PrintifyErrorBody>(body) {
            Ok(PrintifyErrorBody { message: Some(message), code, .. }) => match code {
                Some(code) => format!("{} (code {})", message, code),
                None => message,
            },
            _ if body.trim().is_empty() => "Unknown error".to_string(),
            _ => body.chars().take(500).collect(),
        }
    }
}
