//! ImgBB image host client

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ImageHostSettings;
use super::upload::UploadError;

/// Public image host
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Host the image and return its public URL
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    data: Option<ImgbbImage>,
    error: Option<ImgbbErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ImgbbImage {
    url: String,
    display_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgbbErrorBody {
    message: Option<String>,
}

/// ImgBB upload API client
pub struct ImgbbHost {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    expiration_secs: u64,
}

impl ImgbbHost {
    /// Create a client, failing when no API key is configured
    pub fn new(settings: &ImageHostSettings) -> Result<Self, UploadError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| UploadError::NotConfigured("image_host.api_key is not set".to_string()))?
            .to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("automerch/", env!("CARGO_PKG_VERSION"), " image-host"))
            .build()
            .map_err(|e| UploadError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(ImgbbHost {
            http_client,
            base_url: settings.base_url.clone(),
            api_key,
            expiration_secs: settings.expiration_secs,
        })
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn upload(&self, bytes: &[u8], name: &str) -> Result<String, UploadError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let mut form = vec![
            ("key", self.api_key.clone()),
            ("image", encoded),
            ("name", name.to_string()),
        ];
        if self.expiration_secs > 0 {
            form.push(("expiration", self.expiration_secs.to_string()));
        }

        debug!(name = %name, size_bytes = bytes.len(), "Uploading design to ImgBB");

        let response = self
            .http_client
            .post(&self.base_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| UploadError::UploadFailed { status: None, message: e.to_string() })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::UploadFailed { status: Some(status.as_u16()), message: e.to_string() })?;

        let parsed: Option<ImgbbResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| text.chars().take(500).collect());
            return Err(UploadError::UploadFailed { status: Some(status.as_u16()), message });
        }

        let image = parsed.and_then(|r| r.data).ok_or_else(|| UploadError::UploadFailed {
            status: Some(status.as_u16()),
            message: "response carried no image data".to_string(),
        })?;

        let url = if image.url.is_empty() {
            image.display_url.unwrap_or_default()
        } else {
            image.url
        };
        if url.is_empty() {
            return Err(UploadError::UploadFailed {
                status: Some(status.as_u16()),
                message: "response carried no image URL".to_string(),
            });
        }

        info!(url = %url, "Design hosted on ImgBB");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings(base_url: String) -> ImageHostSettings {
        ImageHostSettings {
            base_url,
            api_key: Some("imgbb-key".to_string()),
            ..ImageHostSettings::default()
        }
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let settings = ImageHostSettings::default();
        assert!(matches!(ImgbbHost::new(&settings), Err(UploadError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_upload_returns_hosted_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/upload")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "imgbb-key".into()),
                Matcher::UrlEncoded("name".into(), "design".into()),
                Matcher::UrlEncoded("image".into(), "aGVsbG8=".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data":{"url":"https://i.ibb.co/xyz/design.png","display_url":"https://ibb.co/xyz"},"success":true,"status":200}"#)
            .create_async()
            .await;

        let host = ImgbbHost::new(&settings(format!("{}/1/upload", server.url()))).unwrap();
        let url = host.upload(b"hello", "design").await.unwrap();

        assert_eq!(url, "https://i.ibb.co/xyz/design.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_error_carries_status_and_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/1/upload")
            .with_status(400)
            .with_body(r#"{"status_code":400,"error":{"message":"Invalid API v1 key.","code":100},"status_txt":"Bad Request"}"#)
            .create_async()
            .await;

        let host = ImgbbHost::new(&settings(format!("{}/1/upload", server.url()))).unwrap();
        let err = host.upload(b"hello", "design").await.unwrap_err();

        match err {
            UploadError::UploadFailed { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "Invalid API v1 key.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
