//! Catalog resolution: sellable variants, preferred variant and print position
//!
//! The pure `resolve_*` functions hold the selection rules; `CatalogResolver`
//! fetches the catalog and turns fetch failures into named fallbacks.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{BlueprintInfo, ProductTemplate, Variant};
use crate::providers::FulfillmentProvider;
use super::error::{MockupError, ResolutionWarning};

/// Variant used when neither the catalog nor the template names one
pub const LITERAL_DEFAULT_VARIANT_ID: u64 = 1;

/// Position tried when the requested one is not offered
const FALLBACK_POSITION: &str = "front";

/// Where the selected variant IDs came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSource {
    /// Variants the catalog lists as sellable
    Catalog,
    /// Every listed variant, since none were flagged sellable
    AllListed,
    /// The template's default variant ID
    TemplateDefault,
    /// The literal default variant ID
    LiteralDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantSelection {
    pub variant_ids: Vec<u64>,
    pub preferred_variant_id: u64,
    pub source: VariantSource,
}

impl VariantSelection {
    fn single(id: u64, source: VariantSource) -> Self {
        VariantSelection {
            variant_ids: vec![id],
            preferred_variant_id: id,
            source,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, VariantSource::TemplateDefault | VariantSource::LiteralDefault)
    }
}

/// Sellable variant IDs and the preferred one
///
/// A variant is sellable unless explicitly flagged disabled. The preferred
/// variant is the first flagged default, then available, then enabled, then
/// the first sellable one. An empty listing falls back to `default_variant_id`
/// and then to [`LITERAL_DEFAULT_VARIANT_ID`].
pub fn resolve_sellable_variants(variants: &[Variant], default_variant_id: Option<u64>) -> VariantSelection {
    if variants.is_empty() {
        return fallback_selection(default_variant_id);
    }

    let sellable: Vec<&Variant> = variants.iter().filter(|v| v.is_enabled != Some(false)).collect();
    let (pool, source) = if sellable.is_empty() {
        (variants.iter().collect::<Vec<_>>(), VariantSource::AllListed)
    } else {
        (sellable, VariantSource::Catalog)
    };

    let preferred = pool
        .iter()
        .find(|v| v.is_default)
        .or_else(|| pool.iter().find(|v| v.is_available == Some(true)))
        .or_else(|| pool.iter().find(|v| v.is_enabled == Some(true)))
        .or_else(|| pool.first());

    let Some(preferred) = preferred else {
        return fallback_selection(default_variant_id);
    };

    let mut variant_ids: Vec<u64> = Vec::with_capacity(pool.len());
    for variant in &pool {
        if !variant_ids.contains(&variant.id) {
            variant_ids.push(variant.id);
        }
    }

    VariantSelection {
        variant_ids,
        preferred_variant_id: preferred.id,
        source,
    }
}

fn fallback_selection(default_variant_id: Option<u64>) -> VariantSelection {
    match default_variant_id {
        Some(id) => VariantSelection::single(id, VariantSource::TemplateDefault),
        None => VariantSelection::single(LITERAL_DEFAULT_VARIANT_ID, VariantSource::LiteralDefault),
    }
}

/// Print position to place the design on; always yields a position
///
/// The product-type override wins when the variant offers it (or nothing is
/// known about its placeholders), then the requested position, then
/// "front", then the first placeholder of the selected variant.
pub fn resolve_placeholder_position(
    variants: &[Variant],
    selected_variant_id: u64,
    requested: &str,
    type_override: Option<&str>,
) -> String {
    let positions: Vec<&str> = variants
        .iter()
        .find(|v| v.id == selected_variant_id)
        .or_else(|| variants.first())
        .map(|v| v.placeholders.iter().map(|p| p.position.as_str()).collect())
        .unwrap_or_default();

    if positions.is_empty() {
        return type_override.unwrap_or(requested).to_string();
    }

    let offered = |position: &str| positions.iter().any(|p| *p == position);

    type_override
        .filter(|p| offered(*p))
        .or_else(|| Some(requested).filter(|p| offered(*p)))
        .or_else(|| Some(FALLBACK_POSITION).filter(|p| offered(*p)))
        .or_else(|| positions.first().copied())
        .unwrap_or(requested)
        .to_string()
}

/// Catalog data fetched for one run
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub blueprint: Result<BlueprintInfo, String>,
    pub variants: Result<Vec<Variant>, String>,
}

/// Everything the orchestrator needs from the catalog
#[derive(Debug, Clone)]
pub struct CatalogResolution {
    pub selection: VariantSelection,
    pub position: String,
    /// Pixel size of the chosen placeholder on the preferred variant
    pub placeholder_dimensions: Option<(u32, u32)>,
    pub fallback_preview: Option<String>,
    pub warnings: Vec<ResolutionWarning>,
}

/// Fetches blueprint and variant metadata and applies the selection rules
pub struct CatalogResolver {
    provider: Arc<dyn FulfillmentProvider>,
    strict: bool,
}

impl CatalogResolver {
    /// With `strict`, an empty but successful variant listing is an error
    pub fn new(provider: Arc<dyn FulfillmentProvider>, strict: bool) -> Self {
        CatalogResolver { provider, strict }
    }

    /// Fetch blueprint and variants concurrently; failures are kept, not raised
    pub async fn fetch(&self, template: &ProductTemplate) -> CatalogSnapshot {
        let (blueprint, variants) = futures::join!(
            self.provider.get_blueprint(template.blueprint_id),
            self.provider.get_variants(template.blueprint_id, template.print_provider_id),
        );

        debug!(
            blueprint_id = template.blueprint_id,
            print_provider_id = template.print_provider_id,
            blueprint_ok = blueprint.is_ok(),
            variant_count = variants.as_ref().map(|v| v.len()).unwrap_or(0),
            "Catalog fetched"
        );

        CatalogSnapshot {
            blueprint: blueprint.map_err(|e| e.summary()),
            variants: variants.map_err(|e| e.summary()),
        }
    }

    /// Apply selection rules to a snapshot
    pub fn resolve(
        &self,
        template: &ProductTemplate,
        snapshot: &CatalogSnapshot,
        type_override: Option<&str>,
    ) -> Result<CatalogResolution, MockupError> {
        let mut warnings = Vec::new();

        let blueprint_preview = match &snapshot.blueprint {
            Ok(blueprint) => blueprint.fallback_preview().map(str::to_string),
            Err(message) => {
                warnings.push(ResolutionWarning::BlueprintUnavailable {
                    blueprint_id: template.blueprint_id,
                    message: message.clone(),
                });
                None
            }
        };

        let variants: &[Variant] = match &snapshot.variants {
            Ok(variants) => variants,
            Err(_) => &[],
        };

        if self.strict && matches!(&snapshot.variants, Ok(v) if v.is_empty()) {
            return Err(MockupError::CatalogMisconfigured {
                blueprint_id: template.blueprint_id,
                print_provider_id: template.print_provider_id,
            });
        }

        let selection = resolve_sellable_variants(variants, template.default_variant_id);

        match (&snapshot.variants, selection.source) {
            (Err(message), _) => warnings.push(ResolutionWarning::CatalogUnavailable {
                blueprint_id: template.blueprint_id,
                print_provider_id: template.print_provider_id,
                fallback_variant_id: selection.preferred_variant_id,
                message: message.clone(),
            }),
            (Ok(_), VariantSource::TemplateDefault | VariantSource::LiteralDefault) => {
                warnings.push(ResolutionWarning::EmptyCatalog {
                    blueprint_id: template.blueprint_id,
                    print_provider_id: template.print_provider_id,
                    fallback_variant_id: selection.preferred_variant_id,
                })
            }
            (Ok(_), VariantSource::AllListed) => warnings.push(ResolutionWarning::NoSellableVariants {
                variant_count: variants.len(),
            }),
            (Ok(_), VariantSource::Catalog) => {}
        }

        let position = resolve_placeholder_position(
            variants,
            selection.preferred_variant_id,
            &template.print_area_position,
            type_override,
        );

        let preferred = variants.iter().find(|v| v.id == selection.preferred_variant_id);
        let placeholder_dimensions = preferred
            .and_then(|v| v.placeholder(&position))
            .and_then(|p| p.dimensions());

        // The preferred variant's own photo beats the generic blueprint image
        let fallback_preview = preferred
            .and_then(|v| v.preview.clone())
            .filter(|src| !src.is_empty())
            .or(blueprint_preview);

        for warning in &warnings {
            warn!(kind = warning.kind(), blueprint_id = template.blueprint_id, "{}", warning);
        }

        Ok(CatalogResolution {
            selection,
            position,
            placeholder_dimensions,
            fallback_preview,
            warnings,
        })
    }
}
