//! Printify API Client Implementation
//!
//! This module implements the FulfillmentProvider trait for Printify: image
//! uploads, catalog lookups and the draft product lifecycle.
//!
//! API Docs: https://developers.printify.com/

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PrintifySettings;
use crate::domain::{
    BlueprintInfo, PrintAreaPatch, ProductDraft, ProviderProduct, UploadHandle, Variant,
};
use crate::providers::http_client::{RateLimitedClient, RateLimitedRequestBuilder};
use crate::providers::traits::{FulfillmentProvider, ProviderError, ProviderResult};
use super::mapper::PrintifyMapper;
use super::models::*;

/// Retries for idempotent catalog reads
const CATALOG_RETRIES: u32 = 2;

/// Printify API client
pub struct PrintifyProvider {
    /// Rate-limited HTTP client
    client: RateLimitedClient,

    /// Personal access token
    api_token: Option<String>,

    /// API base URL
    base_url: String,

    /// Shop that owns created products
    shop_id: String,

    /// Storefront shop polled before the primary one
    alternate_shop_id: Option<String>,
}

impl PrintifyProvider {
    /// Create a new Printify provider instance
    pub fn new(settings: &PrintifySettings) -> ProviderResult<Self> {
        let client = RateLimitedClient::new(
            settings.rate_limit_per_minute,
            Duration::from_secs(settings.timeout_secs.max(1)),
        )?;

        Ok(PrintifyProvider {
            client,
            api_token: settings.api_token.clone().filter(|t| !t.trim().is_empty()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            shop_id: settings.shop_id.trim().to_string(),
            alternate_shop_id: settings
                .alternate_shop_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }

    fn token(&self) -> ProviderResult<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("printify.api_token is not set".to_string()))
    }

    fn shop(&self) -> ProviderResult<&str> {
        if self.shop_id.is_empty() {
            return Err(ProviderError::NotConfigured("printify.shop_id is empty".to_string()));
        }
        Ok(&self.shop_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed<'a>(
        &self,
        builder: RateLimitedRequestBuilder<'a>,
    ) -> ProviderResult<RateLimitedRequestBuilder<'a>> {
        Ok(builder.bearer_auth(self.token()?))
    }

    /// Map a non-2xx response to a provider error
    async fn check(response: Response) -> ProviderResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = PrintifyMapper::error_message(&body);

        Err(match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed(message),
            404 => ProviderError::NotFound(message),
            code => ProviderError::ApiError { status: code, message },
        })
    }

    /// Check status and parse JSON body
    async fn read_json<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
        let response = Self::check(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let snippet: String = text.chars().take(500).collect();
            ProviderError::ParseError(format!("JSON parse error: {} - Body: {}", e, snippet))
        })
    }

    async fn get_catalog<T: DeserializeOwned>(&self, path: &str) -> ProviderResult<T> {
        let url = self.url(path);
        debug!(url = %url, "Printify catalog request");

        let response = self
            .authed(self.client.get(&url))?
            .send_with_retry(CATALOG_RETRIES)
            .await?;

        Self::read_json(response).await
    }

    async fn upload(&self, body: &impl serde::Serialize) -> ProviderResult<UploadHandle> {
        let url = self.url("/uploads/images.json");
        let response = self.authed(self.client.post(&url))?.json(body).send().await?;
        let upload: PrintifyUpload = Self::read_json(response).await?;

        debug!(upload_id = %upload.id, "Image registered with Printify");
        Ok(PrintifyMapper::map_upload(upload))
    }
}

#[async_trait]
impl FulfillmentProvider for PrintifyProvider {
    fn code(&self) -> &'static str {
        "printify"
    }

    fn rate_limit_remaining(&self) -> Option<u32> {
        self.client.remaining_requests()
    }

    fn alternate_shop(&self) -> Option<&str> {
        self.alternate_shop_id.as_deref()
    }

    async fn upload_image_by_url(&self, file_name: &str, url: &str) -> ProviderResult<UploadHandle> {
        self.upload(&UploadByUrlRequest { file_name, url }).await
    }

    async fn upload_image_base64(&self, file_name: &str, contents: &str) -> ProviderResult<UploadHandle> {
        self.upload(&UploadBase64Request { file_name, contents }).await
    }

    async fn get_blueprint(&self, blueprint_id: u32) -> ProviderResult<BlueprintInfo> {
        let path = format!("/catalog/blueprints/{}.json", blueprint_id);
        let blueprint: PrintifyBlueprint = self.get_catalog(&path).await?;
        Ok(PrintifyMapper::map_blueprint(blueprint))
    }

    async fn get_variants(&self, blueprint_id: u32, print_provider_id: u32) -> ProviderResult<Vec<Variant>> {
        let path = format!(
            "/catalog/blueprints/{}/print_providers/{}/variants.json",
            blueprint_id, print_provider_id
        );
        let response: PrintifyVariantsResponse = self.get_catalog(&path).await?;

        Ok(response
            .into_variants()
            .into_iter()
            .map(PrintifyMapper::map_variant)
            .collect())
    }

    async fn create_product(&self, draft: &ProductDraft) -> ProviderResult<ProviderProduct> {
        let url = self.url(&format!("/shops/{}/products.json", self.shop()?));
        let response = self.authed(self.client.post(&url))?.json(draft).send().await?;
        let product: ProviderProduct = Self::read_json(response).await?;

        info!(product_id = %product.id, blueprint_id = draft.blueprint_id, "Printify product created");
        Ok(product)
    }

    async fn update_product(&self, product_id: &str, patch: &PrintAreaPatch) -> ProviderResult<ProviderProduct> {
        let url = self.url(&format!("/shops/{}/products/{}.json", self.shop()?, product_id));
        let response = self.authed(self.client.put(&url))?.json(patch).send().await?;
        Self::read_json(response).await
    }

    async fn get_product(&self, product_id: &str) -> ProviderResult<ProviderProduct> {
        let shop = self.shop()?.to_string();
        self.get_product_for_shop(&shop, product_id).await
    }

    async fn get_product_for_shop(&self, shop_id: &str, product_id: &str) -> ProviderResult<ProviderProduct> {
        let url = self.url(&format!("/shops/{}/products/{}.json", shop_id, product_id));
        let response = self.authed(self.client.get(&url))?.send().await?;
        Self::read_json(response).await
    }

    async fn publish_product(&self, product_id: &str) -> ProviderResult<()> {
        let url = self.url(&format!("/shops/{}/products/{}/publish.json", self.shop()?, product_id));
        let response = self
            .authed(self.client.post(&url))?
            .json(&PublishRequest::everything())
            .send()
            .await?;
        Self::check(response).await?;

        info!(product_id = %product_id, "Printify product published");
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> ProviderResult<()> {
        let url = self.url(&format!("/shops/{}/products/{}.json", self.shop()?, product_id));
        let response = self.authed(self.client.delete(&url))?.send().await?;
        Self::check(response).await?;

        info!(product_id = %product_id, "Printify product deleted");
        Ok(())
    }
}
