//! In-memory collaborators for mockup tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::domain::product::ProductImage;
use crate::domain::{BlueprintInfo, PrintAreaPatch, ProductDraft, ProviderProduct, UploadHandle, Variant};
use crate::providers::{FulfillmentProvider, ProviderError, ProviderResult};
use crate::storage::{ImageHost, UploadError};
use super::poll::Sleeper;

pub const FALLBACK_IMAGE: &str = "https://images.printify.com/blueprint-fallback.png";
pub const RENDERED_IMAGE: &str = "https://images.printify.com/mockup/rendered.png";

#[derive(Debug, Default)]
pub struct FakeCalls {
    pub uploads_by_url: Vec<(String, String)>,
    pub uploads_base64: Vec<String>,
    pub blueprint_fetches: u32,
    pub variant_fetches: u32,
    pub creates: Vec<ProductDraft>,
    pub updates: Vec<(String, PrintAreaPatch)>,
    pub product_fetches: u32,
    pub shop_fetches: Vec<String>,
    pub published: Vec<String>,
    pub deleted: Vec<String>,
}

/// Scriptable fulfillment provider
pub struct FakeProvider {
    /// `None` makes the blueprint lookup fail
    pub blueprint: Option<BlueprintInfo>,
    /// `None` makes the variants lookup fail
    pub variants: Option<Vec<Variant>>,
    pub create_error: Option<ProviderError>,
    pub update_fails: bool,
    /// Primary-shop fetch on which the rendered image first shows up
    pub preview_on_fetch: Option<u32>,
    pub alternate_shop: Option<String>,
    /// Image the alternate shop reports right away
    pub alternate_preview: Option<String>,
    pub calls: Mutex<FakeCalls>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        FakeProvider {
            blueprint: Some(BlueprintInfo {
                id: 68,
                title: "Mug 11oz".to_string(),
                brand: None,
                model: None,
                images: vec![FALLBACK_IMAGE.to_string()],
            }),
            variants: Some(Vec::new()),
            create_error: None,
            update_fails: false,
            preview_on_fetch: None,
            alternate_shop: None,
            alternate_preview: None,
            calls: Mutex::new(FakeCalls::default()),
        }
    }
}

impl FakeProvider {
    fn product(&self, image: Option<&str>) -> ProviderProduct {
        ProviderProduct {
            id: "prod-1".to_string(),
            title: "Fake product".to_string(),
            images: image
                .map(|src| {
                    vec![ProductImage {
                        src: src.to_string(),
                        is_default: true,
                        variant_ids: Vec::new(),
                        position: Some("front".to_string()),
                    }]
                })
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl FulfillmentProvider for FakeProvider {
    fn code(&self) -> &'static str {
        "fake"
    }

    fn rate_limit_remaining(&self) -> Option<u32> {
        None
    }

    fn alternate_shop(&self) -> Option<&str> {
        self.alternate_shop.as_deref()
    }

    async fn upload_image_by_url(&self, file_name: &str, url: &str) -> ProviderResult<UploadHandle> {
        self.calls.lock().uploads_by_url.push((file_name.to_string(), url.to_string()));
        Ok(UploadHandle { id: "upload-1".to_string() })
    }

    async fn upload_image_base64(&self, file_name: &str, _contents: &str) -> ProviderResult<UploadHandle> {
        self.calls.lock().uploads_base64.push(file_name.to_string());
        Ok(UploadHandle { id: "upload-1".to_string() })
    }

    async fn get_blueprint(&self, blueprint_id: u32) -> ProviderResult<BlueprintInfo> {
        self.calls.lock().blueprint_fetches += 1;
        self.blueprint
            .clone()
            .ok_or_else(|| ProviderError::NotFound(format!("blueprint {}", blueprint_id)))
    }

    async fn get_variants(&self, _blueprint_id: u32, _print_provider_id: u32) -> ProviderResult<Vec<Variant>> {
        self.calls.lock().variant_fetches += 1;
        self.variants.clone().ok_or_else(|| ProviderError::ApiError {
            status: 503,
            message: "catalog unavailable".to_string(),
        })
    }

    async fn create_product(&self, draft: &ProductDraft) -> ProviderResult<ProviderProduct> {
        self.calls.lock().creates.push(draft.clone());
        match &self.create_error {
            Some(ProviderError::ApiError { status, message }) => Err(ProviderError::ApiError {
                status: *status,
                message: message.clone(),
            }),
            Some(other) => Err(ProviderError::ParseError(other.to_string())),
            None => Ok(self.product(None)),
        }
    }

    async fn update_product(&self, product_id: &str, patch: &PrintAreaPatch) -> ProviderResult<ProviderProduct> {
        self.calls.lock().updates.push((product_id.to_string(), patch.clone()));
        if self.update_fails {
            return Err(ProviderError::ApiError { status: 500, message: "update rejected".to_string() });
        }
        Ok(self.product(None))
    }

    async fn get_product(&self, _product_id: &str) -> ProviderResult<ProviderProduct> {
        let fetch = {
            let mut calls = self.calls.lock();
            calls.product_fetches += 1;
            calls.product_fetches
        };
        match self.preview_on_fetch {
            Some(n) if fetch >= n => Ok(self.product(Some(RENDERED_IMAGE))),
            _ if fetch % 2 == 0 => Err(ProviderError::ApiError { status: 502, message: "flaky".to_string() }),
            _ => Ok(self.product(None)),
        }
    }

    async fn get_product_for_shop(&self, shop_id: &str, _product_id: &str) -> ProviderResult<ProviderProduct> {
        self.calls.lock().shop_fetches.push(shop_id.to_string());
        match &self.alternate_preview {
            Some(src) => Ok(self.product(Some(src))),
            None => Err(ProviderError::NotFound("product not in shop".to_string())),
        }
    }

    async fn publish_product(&self, product_id: &str) -> ProviderResult<()> {
        self.calls.lock().published.push(product_id.to_string());
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> ProviderResult<()> {
        self.calls.lock().deleted.push(product_id.to_string());
        Ok(())
    }
}

/// Image host that records names and returns a predictable URL
#[derive(Default)]
pub struct FakeImageHost {
    pub uploads: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, UploadError> {
        self.uploads.lock().push((name.to_string(), bytes.len()));
        Ok(format!("https://i.ibb.co/fake/{}.png", name))
    }
}

/// Sleeper that returns immediately and records requested delays
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}
