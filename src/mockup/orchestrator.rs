//! Mockup orchestration
//!
//! One run walks `Preparing -> Uploading -> CatalogResolving -> Creating ->
//! Patching -> Polling` and ends `Succeeded`, `Degraded` or `TimedOut`.
//! Only validation, upload and creation failures end a run early; every other
//! problem becomes a `ResolutionWarning` on the outcome. Drafts created before
//! a failure are left in place.

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::{MockupSettings, UploadStrategy};
use crate::domain::{
    DesignAsset, DraftVariant, FitMode, PrintArea, PrintAreaPatch, ProductDraft, ProductProfile,
    ProductTemplate, UploadHandle,
};
use crate::engine::{self, FittedImage};
use crate::providers::FulfillmentProvider;
use crate::storage::UploadAdapter;
use super::catalog::{CatalogResolution, CatalogResolver};
use super::error::{MockupError, ResolutionWarning, UploadStage};
use super::poll::{poll_for_preview, PollOutcome, PollPolicy, Sleeper, TokioSleeper};

/// Orchestration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MockupState {
    Preparing,
    Uploading,
    CatalogResolving,
    Creating,
    Patching,
    Polling,
    /// Rendered mockup found
    Succeeded,
    /// No render in time, catalog image returned instead
    Degraded,
    /// No render and no catalog image
    TimedOut,
}

impl std::fmt::Display for MockupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MockupState::Preparing => write!(f, "preparing"),
            MockupState::Uploading => write!(f, "uploading"),
            MockupState::CatalogResolving => write!(f, "catalog_resolving"),
            MockupState::Creating => write!(f, "creating"),
            MockupState::Patching => write!(f, "patching"),
            MockupState::Polling => write!(f, "polling"),
            MockupState::Succeeded => write!(f, "succeeded"),
            MockupState::Degraded => write!(f, "degraded"),
            MockupState::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Result of one orchestration run
#[derive(Debug, Clone, Serialize)]
pub struct MockupOutcome {
    pub product_id: String,
    /// Absent only when the run timed out
    pub preview_url: Option<String>,
    pub state: MockupState,
    pub title: String,
    pub variant_ids: Vec<u64>,
    pub position: String,
    /// Public URL of the design, when it was hosted
    pub design_url: Option<String>,
    pub poll_attempts: u32,
    pub warnings: Vec<ResolutionWarning>,
}

/// Drives a design onto a fulfillment product and waits for its mockup
pub struct MockupOrchestrator {
    provider: Arc<dyn FulfillmentProvider>,
    uploads: Arc<UploadAdapter>,
    catalog: CatalogResolver,
    policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
    settings: MockupSettings,
}

impl MockupOrchestrator {
    pub fn new(provider: Arc<dyn FulfillmentProvider>, uploads: Arc<UploadAdapter>, settings: MockupSettings) -> Self {
        MockupOrchestrator {
            catalog: CatalogResolver::new(provider.clone(), settings.strict_catalog),
            policy: PollPolicy::from_settings(&settings),
            provider,
            uploads,
            sleeper: Arc::new(TokioSleeper),
            settings,
        }
    }

    /// Replace the timer used while polling
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Create a draft product carrying `design` and wait for its mockup
    #[instrument(
        skip(self, template, design, title, description),
        fields(template_id = template.id, product_type = %template.product_type, design = %design.describe())
    )]
    pub async fn generate_mockup(
        &self,
        template: &ProductTemplate,
        design: DesignAsset,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<MockupOutcome, MockupError> {
        validate_template(template)?;
        if let DesignAsset::Encoded { bytes, .. } = &design {
            self.validate_design(bytes)?;
        }

        let title = non_empty(title).unwrap_or_else(|| format!("{} - Custom Design", template.name));
        let description = non_empty(description)
            .unwrap_or_else(|| format!("Custom {} with uploaded design", template.product_type));

        let profile = ProductProfile::for_type(template.product_type);
        let mut warnings = Vec::new();
        let mut resolution: Option<CatalogResolution> = None;

        // Preparing
        debug!(state = %MockupState::Preparing, full_bleed = profile.requires_full_bleed);
        let design = if profile.requires_full_bleed {
            let resolved = self.resolve_catalog(template, &profile).await?;
            let dimensions = resolved.placeholder_dimensions;
            resolution = Some(resolved);
            self.prepare_design(design, dimensions, &profile, &mut warnings).await
        } else {
            design
        };

        // Uploading
        debug!(state = %MockupState::Uploading);
        let (upload, design_url) = self.upload_design(design).await?;

        // CatalogResolving
        debug!(state = %MockupState::CatalogResolving);
        let resolution = match resolution {
            Some(resolution) => resolution,
            None => self.resolve_catalog(template, &profile).await?,
        };
        warnings.extend(resolution.warnings.iter().cloned());

        // Creating
        debug!(state = %MockupState::Creating, position = %resolution.position);
        let variant_ids = resolution.selection.variant_ids.clone();
        let price = template.price_cents();
        let draft = ProductDraft {
            title: title.clone(),
            description,
            blueprint_id: template.blueprint_id,
            print_provider_id: template.print_provider_id,
            variants: variant_ids
                .iter()
                .map(|id| DraftVariant { id: *id, price, is_enabled: true })
                .collect(),
            print_areas: vec![PrintArea::single(
                variant_ids.clone(),
                &resolution.position,
                &upload,
                profile.placement(),
            )],
        };
        draft.validate().map_err(|e| MockupError::Validation(e.to_string()))?;

        if self.settings.log_payloads {
            debug!(payload = %serde_json::to_string(&draft).unwrap_or_default(), "Create product payload");
        }

        let product = self.provider.create_product(&draft).await.map_err(|e| {
            MockupError::ProductCreationFailed {
                blueprint_id: template.blueprint_id,
                print_provider_id: template.print_provider_id,
                message: e.summary(),
            }
        })?;

        if product.id.trim().is_empty() {
            return Err(MockupError::ProductCreationFailed {
                blueprint_id: template.blueprint_id,
                print_provider_id: template.print_provider_id,
                message: "provider returned no product id".to_string(),
            });
        }
        info!(product_id = %product.id, variants = variant_ids.len(), "Draft product created");

        // Patching
        if self.settings.patch_after_create {
            debug!(state = %MockupState::Patching, product_id = %product.id);
            let patch = PrintAreaPatch { print_areas: draft.print_areas.clone() };
            if self.settings.log_payloads {
                debug!(payload = %serde_json::to_string(&patch).unwrap_or_default(), "Update product payload");
            }
            if let Err(e) = self.provider.update_product(&product.id, &patch).await {
                let warning = ResolutionWarning::PatchFailed {
                    product_id: product.id.clone(),
                    message: e.summary(),
                };
                warn!(kind = warning.kind(), "{}", warning);
                warnings.push(warning);
            }
        }

        // Polling
        debug!(state = %MockupState::Polling, product_id = %product.id);
        let polled = poll_for_preview(self.provider.as_ref(), &product.id, &self.policy, self.sleeper.as_ref()).await;

        let (state, preview_url, poll_attempts) = match polled {
            PollOutcome::Rendered { preview_url, attempts } => (MockupState::Succeeded, Some(preview_url), attempts),
            PollOutcome::Exhausted { attempts } => match resolution.fallback_preview.clone() {
                Some(fallback) => (MockupState::Degraded, Some(fallback), attempts),
                None => (MockupState::TimedOut, None, attempts),
            },
        };

        if state == MockupState::Succeeded {
            info!(product_id = %product.id, attempts = poll_attempts, "Mockup ready");
        } else {
            warn!(product_id = %product.id, attempts = poll_attempts, state = %state, "Mockup not rendered in time");
        }

        Ok(MockupOutcome {
            product_id: product.id,
            preview_url,
            state,
            title,
            variant_ids,
            position: resolution.position,
            design_url,
            poll_attempts,
            warnings,
        })
    }

    async fn resolve_catalog(
        &self,
        template: &ProductTemplate,
        profile: &ProductProfile,
    ) -> Result<CatalogResolution, MockupError> {
        let snapshot = self.catalog.fetch(template).await;
        self.catalog.resolve(template, &snapshot, profile.preferred_position)
    }

    /// Fit the design to the placeholder; every failure keeps the original design
    async fn prepare_design(
        &self,
        design: DesignAsset,
        dimensions: Option<(u32, u32)>,
        profile: &ProductProfile,
        warnings: &mut Vec<ResolutionWarning>,
    ) -> DesignAsset {
        let mut skip = |reason: String| {
            let warning = ResolutionWarning::FitSkipped { reason };
            warn!(kind = warning.kind(), "{}", warning);
            warnings.push(warning);
        };

        let Some((width, height)) = dimensions else {
            skip("placeholder dimensions unavailable".to_string());
            return design;
        };

        let loaded = match &design {
            DesignAsset::Encoded { bytes, file_name } => Ok((bytes.clone(), file_name.clone())),
            DesignAsset::Hosted(url) => self
                .uploads
                .fetch_remote(url)
                .await
                .map(|bytes| (bytes, file_name_from_url(url)))
                .map_err(|e| format!("hosted design could not be downloaded: {}", e)),
        };
        let (source, file_name): (Bytes, String) = match loaded {
            Ok(loaded) => loaded,
            Err(reason) => {
                skip(reason);
                return design;
            }
        };

        let fitted = match profile.fit_mode {
            FitMode::Aspect => engine::fit(&source, width, height, profile.bleed_factor),
            FitMode::ExactPixels => engine::cover_exact(&source, width, height, profile.bleed_factor),
        };

        match fitted {
            Ok(FittedImage { bytes, width, height, modified: true }) => match self.uploads.validate(&bytes) {
                Ok(_) => {
                    debug!(width, height, bleed = profile.bleed_factor, "Design fitted to placeholder");
                    DesignAsset::Encoded { bytes, file_name: fitted_name(&file_name) }
                }
                Err(e) => {
                    skip(format!("fitted design rejected: {}", e));
                    design
                }
            },
            Ok(_) => design,
            Err(e) => {
                skip(e.to_string());
                design
            }
        }
    }

    /// Register the design with the provider, returning the handle and hosted URL
    async fn upload_design(&self, design: DesignAsset) -> Result<(UploadHandle, Option<String>), MockupError> {
        let registration_failed = |e: crate::providers::ProviderError| MockupError::UploadFailed {
            stage: UploadStage::ProviderRegistration,
            message: e.summary(),
        };

        let (bytes, file_name) = match design {
            DesignAsset::Hosted(url) => {
                let handle = self
                    .provider
                    .upload_image_by_url(&file_name_from_url(&url), url.as_str())
                    .await
                    .map_err(registration_failed)?;
                return Ok((handle, Some(url.to_string())));
            }
            DesignAsset::Encoded { bytes, file_name } => (bytes, file_name),
        };

        // Size and media type are caller errors whichever strategy is used
        self.validate_design(&bytes)?;

        match self.settings.upload_strategy {
            UploadStrategy::ImageHost => {
                let hosted = self
                    .uploads
                    .upload_from_bytes(&bytes, &file_name)
                    .await
                    .map_err(|e| MockupError::UploadFailed {
                        stage: UploadStage::ImageHost,
                        message: e.to_string(),
                    })?;
                let handle = self
                    .provider
                    .upload_image_by_url(&file_name, &hosted)
                    .await
                    .map_err(registration_failed)?;
                Ok((handle, Some(hosted)))
            }
            UploadStrategy::Inline => {
                let contents = base64::engine::general_purpose::STANDARD.encode(&bytes);
                let handle = self
                    .provider
                    .upload_image_base64(&file_name, &contents)
                    .await
                    .map_err(registration_failed)?;
                Ok((handle, None))
            }
        }
    }

    fn validate_design(&self, bytes: &[u8]) -> Result<(), MockupError> {
        self.uploads
            .validate(bytes)
            .map(|_| ())
            .map_err(|e| MockupError::Validation(e.to_string()))
    }
}

fn validate_template(template: &ProductTemplate) -> Result<(), MockupError> {
    if !template.price.is_finite() || template.price < 0.0 {
        return Err(MockupError::Validation(format!("invalid price {} for template {}", template.price, template.id)));
    }
    if template.blueprint_id == 0 || template.print_provider_id == 0 {
        return Err(MockupError::Validation(format!(
            "template {} has no blueprint/print provider pairing",
            template.id
        )));
    }
    if template.print_area_position.trim().is_empty() {
        return Err(MockupError::Validation(format!("template {} has no print area position", template.id)));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn file_name_from_url(url: &url::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("design.png")
        .to_string()
}

fn fitted_name(file_name: &str) -> String {
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    format!("{}-fitted.png", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageHostSettings;
    use crate::domain::{Placeholder, ProductCatalog, Variant};
    use crate::mockup::fakes::{FakeImageHost, FakeProvider, RecordingSleeper, FALLBACK_IMAGE, RENDERED_IMAGE};
    use crate::providers::ProviderError;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Bytes {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .unwrap();
        Bytes::from(buf.into_inner())
    }

    fn encoded(width: u32, height: u32) -> DesignAsset {
        DesignAsset::Encoded { bytes: png(width, height), file_name: "design.png".to_string() }
    }

    fn template(id: u32) -> ProductTemplate {
        ProductCatalog::builtin().get(id).cloned().unwrap()
    }

    fn variant(id: u64, positions: &[(&str, u32, u32)]) -> Variant {
        let mut v = Variant::new(id);
        v.placeholders = positions
            .iter()
            .map(|(p, w, h)| Placeholder { position: p.to_string(), width: Some(*w), height: Some(*h) })
            .collect();
        v
    }

    struct Harness {
        provider: Arc<FakeProvider>,
        host: Arc<FakeImageHost>,
        sleeper: Arc<RecordingSleeper>,
        orchestrator: MockupOrchestrator,
    }

    fn harness(provider: FakeProvider, settings: MockupSettings) -> Harness {
        harness_with_limit(provider, settings, ImageHostSettings::default().max_upload_bytes)
    }

    fn harness_with_limit(provider: FakeProvider, settings: MockupSettings, max_upload_bytes: usize) -> Harness {
        let provider = Arc::new(provider);
        let host = Arc::new(FakeImageHost::default());
        let sleeper = Arc::new(RecordingSleeper::default());
        let host_settings = ImageHostSettings { max_upload_bytes, ..ImageHostSettings::default() };
        let uploads = Arc::new(UploadAdapter::new(Some(host.clone()), &host_settings).unwrap());
        let orchestrator =
            MockupOrchestrator::new(provider.clone(), uploads, settings).with_sleeper(sleeper.clone());
        Harness { provider, host, sleeper, orchestrator }
    }

    fn quick_settings(max_attempts: u32) -> MockupSettings {
        MockupSettings { poll_max_attempts: max_attempts, ..MockupSettings::default() }
    }

    #[tokio::test]
    async fn test_mug_creates_exactly_one_product() {
        let h = harness(
            FakeProvider {
                variants: Some(vec![variant(33719, &[("front", 2475, 1155)])]),
                preview_on_fetch: Some(1),
                ..FakeProvider::default()
            },
            MockupSettings::default(),
        );

        let outcome = h
            .orchestrator
            .generate_mockup(&template(3), encoded(8, 8), None, None)
            .await
            .unwrap();

        assert_eq!(outcome.product_id, "prod-1");
        assert_eq!(outcome.state, MockupState::Succeeded);
        assert_eq!(outcome.preview_url.as_deref(), Some(RENDERED_IMAGE));
        assert_eq!(outcome.title, "Coffee Mug - Custom Design");

        let calls = h.provider.calls.lock();
        assert_eq!(calls.creates.len(), 1);
        let draft = &calls.creates[0];
        assert_eq!(draft.blueprint_id, 68);
        assert_eq!(draft.print_provider_id, 1);
        assert_eq!(draft.description, "Custom Mug with uploaded design");
        assert_eq!(draft.variants, vec![DraftVariant { id: 33719, price: 1999, is_enabled: true }]);
        assert_eq!(draft.print_areas.len(), 1);
        assert_eq!(draft.print_areas[0].variant_ids, vec![33719]);
        assert_eq!(draft.print_areas[0].placeholders[0].position, "front");
        assert_eq!(draft.print_areas[0].placeholders[0].images[0].id, "upload-1");

        // Mug is not full bleed: the design is hosted unchanged
        assert_eq!(h.host.uploads.lock()[0].0, "design");
        assert_eq!(calls.uploads_by_url[0].1, "https://i.ibb.co/fake/design.png");
        assert_eq!(calls.updates.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_on_sixth_attempt() {
        let h = harness(
            FakeProvider { preview_on_fetch: Some(6), ..FakeProvider::default() },
            MockupSettings::default(),
        );

        let outcome = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert_eq!(outcome.state, MockupState::Succeeded);
        assert_eq!(outcome.poll_attempts, 6);
        assert_eq!(h.provider.calls.lock().product_fetches, 6);
        assert_eq!(h.sleeper.sleeps.lock()[0], h.orchestrator.poll_policy().settle_delay);
    }

    #[tokio::test]
    async fn test_exhaustion_with_fallback_is_degraded() {
        let h = harness(FakeProvider::default(), quick_settings(4));

        let outcome = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert_eq!(outcome.state, MockupState::Degraded);
        assert_eq!(outcome.preview_url.as_deref(), Some(FALLBACK_IMAGE));
        assert_eq!(h.provider.calls.lock().product_fetches, 4);
    }

    #[tokio::test]
    async fn test_exhaustion_without_fallback_times_out() {
        let h = harness(FakeProvider { blueprint: None, ..FakeProvider::default() }, quick_settings(3));

        let outcome = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert_eq!(outcome.state, MockupState::TimedOut);
        assert!(outcome.preview_url.is_none());
        assert!(!outcome.product_id.is_empty());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::BlueprintUnavailable { blueprint_id: 68, .. })));
    }

    #[tokio::test]
    async fn test_empty_catalog_uses_template_default() {
        let h = harness(
            FakeProvider { preview_on_fetch: Some(1), ..FakeProvider::default() },
            MockupSettings::default(),
        );

        let outcome = h.orchestrator.generate_mockup(&template(1), encoded(4, 4), None, None).await.unwrap();

        assert_eq!(outcome.variant_ids, vec![4012]);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::EmptyCatalog { fallback_variant_id: 4012, .. })));
    }

    #[tokio::test]
    async fn test_catalog_failure_is_not_fatal() {
        let h = harness(
            FakeProvider { variants: None, preview_on_fetch: Some(1), ..FakeProvider::default() },
            MockupSettings::default(),
        );

        let outcome = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert_eq!(outcome.variant_ids, vec![33719]);
        assert!(outcome.warnings.iter().any(|w| w.kind() == "catalog_unavailable"));
    }

    #[tokio::test]
    async fn test_strict_catalog_rejects_empty_listing() {
        let settings = MockupSettings { strict_catalog: true, ..MockupSettings::default() };
        let h = harness(FakeProvider::default(), settings);

        let err = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap_err();

        assert!(matches!(err, MockupError::CatalogMisconfigured { blueprint_id: 68, print_provider_id: 1 }));
        assert!(h.provider.calls.lock().creates.is_empty());
    }

    #[tokio::test]
    async fn test_patch_failure_is_swallowed() {
        let h = harness(
            FakeProvider { update_fails: true, preview_on_fetch: Some(1), ..FakeProvider::default() },
            MockupSettings::default(),
        );

        let outcome = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert_eq!(outcome.state, MockupState::Succeeded);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::PatchFailed { product_id, .. } if product_id == "prod-1")));
    }

    #[tokio::test]
    async fn test_patch_can_be_disabled() {
        let settings = MockupSettings { patch_after_create: false, ..MockupSettings::default() };
        let h = harness(FakeProvider { preview_on_fetch: Some(1), ..FakeProvider::default() }, settings);

        h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert!(h.provider.calls.lock().updates.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_carries_identifiers() {
        let h = harness(
            FakeProvider {
                create_error: Some(ProviderError::ApiError { status: 400, message: "Validation failed.".into() }),
                ..FakeProvider::default()
            },
            MockupSettings::default(),
        );

        let err = h
            .orchestrator
            .generate_mockup(&template(3), encoded(4, 4), Some("My Mug".into()), None)
            .await
            .unwrap_err();

        match err {
            MockupError::ProductCreationFailed { blueprint_id, print_provider_id, message } => {
                assert_eq!((blueprint_id, print_provider_id), (68, 1));
                assert_eq!(message, "400 - Validation failed.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.provider.calls.lock().product_fetches, 0);
    }

    #[tokio::test]
    async fn test_phone_case_is_fitted_to_back_placeholder() {
        let h = harness(
            FakeProvider {
                variants: Some(vec![variant(96135, &[("back", 60, 120), ("front", 60, 120)])]),
                preview_on_fetch: Some(1),
                ..FakeProvider::default()
            },
            MockupSettings::default(),
        );

        let outcome = h.orchestrator.generate_mockup(&template(4), encoded(40, 40), None, None).await.unwrap();

        assert_eq!(outcome.position, "back");
        assert!(outcome.warnings.is_empty());
        assert_eq!(h.host.uploads.lock()[0].0, "design-fitted");

        let calls = h.provider.calls.lock();
        // Catalog fetched once and reused after the upload
        assert_eq!(calls.variant_fetches, 1);
        let image = &calls.creates[0].print_areas[0].placeholders[0].images[0];
        assert_eq!((image.x, image.y, image.scale), (0.5, 0.5, 1.0));
    }

    #[tokio::test]
    async fn test_full_bleed_without_dimensions_skips_fitting() {
        let h = harness(
            FakeProvider { preview_on_fetch: Some(1), ..FakeProvider::default() },
            MockupSettings::default(),
        );

        let outcome = h.orchestrator.generate_mockup(&template(5), encoded(10, 10), None, None).await.unwrap();

        assert!(outcome.warnings.iter().any(|w| w.kind() == "fit_skipped"));
        assert_eq!(h.host.uploads.lock()[0].0, "design");
        let calls = h.provider.calls.lock();
        let image = &calls.creates[0].print_areas[0].placeholders[0].images[0];
        assert_eq!((image.y, image.scale), (0.52, 1.15));
    }

    #[tokio::test]
    async fn test_hosted_design_is_registered_directly() {
        let h = harness(
            FakeProvider { preview_on_fetch: Some(1), ..FakeProvider::default() },
            MockupSettings::default(),
        );
        let url = url::Url::parse("https://cdn.example.com/art/dragon.png").unwrap();

        let outcome = h
            .orchestrator
            .generate_mockup(&template(1), DesignAsset::Hosted(url), None, None)
            .await
            .unwrap();

        assert_eq!(outcome.design_url.as_deref(), Some("https://cdn.example.com/art/dragon.png"));
        assert!(h.host.uploads.lock().is_empty());
        let calls = h.provider.calls.lock();
        assert_eq!(calls.uploads_by_url[0].0, "dragon.png");
    }

    #[tokio::test]
    async fn test_hosted_design_download_failure_fails_open() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/poster.png").with_status(500).create_async().await;

        let h = harness(
            FakeProvider {
                variants: Some(vec![variant(43135, &[("front", 300, 400)])]),
                preview_on_fetch: Some(1),
                ..FakeProvider::default()
            },
            MockupSettings::default(),
        );
        let url = url::Url::parse(&format!("{}/poster.png", server.url())).unwrap();

        let outcome = h
            .orchestrator
            .generate_mockup(&template(6), DesignAsset::Hosted(url.clone()), None, None)
            .await
            .unwrap();

        assert!(outcome.warnings.iter().any(|w| w.kind() == "fit_skipped"));
        assert_eq!(h.provider.calls.lock().uploads_by_url[0].1, url.to_string());
    }

    #[tokio::test]
    async fn test_inline_strategy_skips_image_host() {
        let settings = MockupSettings { upload_strategy: UploadStrategy::Inline, ..MockupSettings::default() };
        let h = harness(FakeProvider { preview_on_fetch: Some(1), ..FakeProvider::default() }, settings);

        let outcome = h.orchestrator.generate_mockup(&template(3), encoded(4, 4), None, None).await.unwrap();

        assert!(outcome.design_url.is_none());
        assert!(h.host.uploads.lock().is_empty());
        assert_eq!(h.provider.calls.lock().uploads_base64, vec!["design.png".to_string()]);
    }

    #[tokio::test]
    async fn test_unsupported_design_is_a_validation_error() {
        let h = harness(FakeProvider::default(), MockupSettings::default());
        let design = DesignAsset::Encoded { bytes: Bytes::from_static(b"not an image"), file_name: "x.txt".into() };

        let err = h.orchestrator.generate_mockup(&template(3), design, None, None).await.unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert!(h.host.uploads.lock().is_empty());
        let calls = h.provider.calls.lock();
        assert!(calls.creates.is_empty());
        assert_eq!(calls.variant_fetches, 0);
    }

    #[tokio::test]
    async fn test_oversized_design_is_a_validation_error_for_every_strategy() {
        for strategy in [UploadStrategy::ImageHost, UploadStrategy::Inline] {
            let settings = MockupSettings { upload_strategy: strategy, ..MockupSettings::default() };
            let h = harness_with_limit(FakeProvider::default(), settings, 16);

            let err = h.orchestrator.generate_mockup(&template(3), encoded(32, 32), None, None).await.unwrap_err();

            assert!(matches!(err, MockupError::Validation(ref m) if m.contains("16 byte limit")), "{strategy:?}: {err}");
            assert!(h.host.uploads.lock().is_empty());
            let calls = h.provider.calls.lock();
            assert!(calls.uploads_base64.is_empty());
            assert!(calls.creates.is_empty());
        }
    }

    #[tokio::test]
    async fn test_oversized_fitted_design_keeps_original() {
        let source = png(10, 10);
        let limit = source.len() + 64;
        let h = harness_with_limit(
            FakeProvider {
                variants: Some(vec![variant(43135, &[("front", 600, 800)])]),
                preview_on_fetch: Some(1),
                ..FakeProvider::default()
            },
            MockupSettings::default(),
            limit,
        );
        let design = DesignAsset::Encoded { bytes: source.clone(), file_name: "design.png".to_string() };

        let outcome = h.orchestrator.generate_mockup(&template(6), design, None, None).await.unwrap();

        assert_eq!(outcome.state, MockupState::Succeeded);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::FitSkipped { reason } if reason.contains("fitted design rejected"))));
        assert_eq!(h.host.uploads.lock().as_slice(), [("design".to_string(), source.len())]);
        assert_eq!(h.provider.calls.lock().creates.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_template_is_rejected() {
        let h = harness(FakeProvider::default(), MockupSettings::default());
        let mut broken = template(3);
        broken.price = f64::NAN;

        let err = h.orchestrator.generate_mockup(&broken, encoded(4, 4), None, None).await.unwrap_err();

        assert_eq!(err.code(), "validation_error");
    }
}
