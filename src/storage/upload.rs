//! Upload adapter: limits, media-type checks and remote fetches
//!
//! Every check here runs before any byte is sent to the image host.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ImageHostSettings;
use super::imgbb::ImageHost;

/// Errors raised while hosting or fetching a design
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("image host not configured: {0}")]
    NotConfigured(String),

    #[error("upload failed ({}): {message}", status_label(.status))]
    UploadFailed { status: Option<u16>, message: String },
}

/// Gatekeeper in front of the public image host
pub struct UploadAdapter {
    host: Option<Arc<dyn ImageHost>>,
    http_client: reqwest::Client,
    max_upload_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl UploadAdapter {
    /// `host` is `None` when no image host is configured; byte uploads then fail
    pub fn new(host: Option<Arc<dyn ImageHost>>, settings: &ImageHostSettings) -> Result<Self, UploadError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("automerch/", env!("CARGO_PKG_VERSION"), " design-fetch"))
            .build()
            .map_err(|e| UploadError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(UploadAdapter {
            host,
            http_client,
            max_upload_bytes: settings.max_upload_bytes,
            allowed_content_types: settings
                .allowed_content_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
        })
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Check size and sniffed media type, returning the media type
    pub fn validate(&self, bytes: &[u8]) -> Result<&'static str, UploadError> {
        self.check_size(bytes.len())?;

        let content_type = sniff_content_type(bytes)
            .ok_or_else(|| UploadError::UnsupportedMediaType("unrecognized image data".to_string()))?;

        if !self.allowed_content_types.iter().any(|t| t == content_type) {
            return Err(UploadError::UnsupportedMediaType(content_type.to_string()));
        }

        Ok(content_type)
    }

    fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_upload_bytes {
            return Err(UploadError::PayloadTooLarge { size, max: self.max_upload_bytes });
        }
        Ok(())
    }

    /// Host raw image bytes and return the public URL
    #[instrument(skip(self, bytes), fields(size_bytes = bytes.len()))]
    pub async fn upload_from_bytes(&self, bytes: &[u8], file_name: &str) -> Result<String, UploadError> {
        let content_type = self.validate(bytes)?;
        let host = self
            .host
            .as_ref()
            .ok_or_else(|| UploadError::NotConfigured("no image host available".to_string()))?;

        debug!(content_type, "Design passed upload checks");
        host.upload(bytes, &host_name(file_name)).await
    }

    /// Re-host a remote image and return the new public URL
    pub async fn upload_from_url(&self, url: &url::Url) -> Result<String, UploadError> {
        let bytes = self.fetch_remote(url).await?;
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("design.png")
            .to_string();
        self.upload_from_bytes(&bytes, &file_name).await
    }

    /// Download a remote image under the same limits as uploads
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_remote(&self, url: &url::Url) -> Result<Bytes, UploadError> {
        let response = self
            .http_client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| UploadError::UploadFailed { status: None, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UploadFailed {
                status: Some(status.as_u16()),
                message: format!("HTTP {} from {}", status, url),
            });
        }

        if let Some(length) = response.content_length() {
            self.check_size(length as usize)?;
        }

        // Chunked responses carry no length, so the limit is enforced while reading
        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| UploadError::UploadFailed { status: Some(status.as_u16()), message: e.to_string() })?;
            self.check_size(buffer.len() + chunk.len())?;
            buffer.extend_from_slice(&chunk);
        }
        let bytes = buffer.freeze();

        self.validate(&bytes)?;
        debug!(size_bytes = bytes.len(), "Fetched remote design");
        Ok(bytes)
    }
}

fn status_label(status: &Option<u16>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string())
}

/// Media type from magic bytes
fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Bmp => Some("image/bmp"),
        image::ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}

/// Image hosts take a bare name without extension
fn host_name(file_name: &str) -> String {
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    if stem.is_empty() {
        "design".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[derive(Default)]
    struct RecordingHost {
        names: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageHost for RecordingHost {
        async fn upload(&self, _bytes: &[u8], name: &str) -> Result<String, UploadError> {
            self.names.lock().push(name.to_string());
            Ok(format!("https://i.ibb.co/test/{}.png", name))
        }
    }

    fn adapter(host: Option<Arc<dyn ImageHost>>, max: usize) -> UploadAdapter {
        let settings = ImageHostSettings { max_upload_bytes: max, ..ImageHostSettings::default() };
        UploadAdapter::new(host, &settings).unwrap()
    }

    #[test]
    fn test_rejects_oversized_payload() {
        let adapter = adapter(None, 8);
        let err = adapter.validate(PNG_MAGIC).unwrap_err();
        assert!(matches!(err, UploadError::PayloadTooLarge { size: 12, max: 8 }));
    }

    #[test]
    fn test_rejects_unknown_media_type() {
        let adapter = adapter(None, 1024);
        assert!(matches!(adapter.validate(b"plain text"), Err(UploadError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_rejects_disallowed_media_type() {
        let settings = ImageHostSettings {
            allowed_content_types: vec!["image/jpeg".to_string()],
            ..ImageHostSettings::default()
        };
        let adapter = UploadAdapter::new(None, &settings).unwrap();
        let err = adapter.validate(PNG_MAGIC).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedMediaType(t) if t == "image/png"));
    }

    #[tokio::test]
    async fn test_oversized_payload_never_reaches_host() {
        let host = Arc::new(RecordingHost::default());
        let adapter = adapter(Some(host.clone()), 4);

        let err = adapter.upload_from_bytes(PNG_MAGIC, "design.png").await.unwrap_err();

        assert!(matches!(err, UploadError::PayloadTooLarge { .. }));
        assert!(host.names.lock().is_empty());
    }

    #[tokio::test]
    async fn test_upload_from_bytes_strips_extension() {
        let host = Arc::new(RecordingHost::default());
        let adapter = adapter(Some(host.clone()), 1024);

        let url = adapter.upload_from_bytes(PNG_MAGIC, "mug-design.png").await.unwrap();

        assert_eq!(url, "https://i.ibb.co/test/mug-design.png");
        assert_eq!(host.names.lock().as_slice(), ["mug-design".to_string()]);
    }

    #[tokio::test]
    async fn test_upload_without_host_is_not_configured() {
        let adapter = adapter(None, 1024);
        let err = adapter.upload_from_bytes(PNG_MAGIC, "design.png").await.unwrap_err();
        assert!(matches!(err, UploadError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_upload_from_url_rehosts_remote_image() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/art/poster.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(PNG_MAGIC)
            .create_async()
            .await;

        let host = Arc::new(RecordingHost::default());
        let adapter = adapter(Some(host.clone()), 1024);
        let url = url::Url::parse(&format!("{}/art/poster.png", server.url())).unwrap();

        let hosted = adapter.upload_from_url(&url).await.unwrap();

        assert_eq!(hosted, "https://i.ibb.co/test/poster.png");
    }

    #[tokio::test]
    async fn test_fetch_remote_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/missing.png").with_status(404).create_async().await;

        let adapter = adapter(None, 1024);
        let url = url::Url::parse(&format!("{}/missing.png", server.url())).unwrap();

        let err = adapter.fetch_remote(&url).await.unwrap_err();
        assert!(matches!(err, UploadError::UploadFailed { status: Some(404), .. }));
    }

    #[tokio::test]
    async fn test_fetch_remote_caps_chunked_download() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/huge.png")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(PNG_MAGIC)?;
                for _ in 0..64 {
                    w.write_all(&[0u8; 256])?;
                }
                Ok(())
            })
            .create_async()
            .await;

        let adapter = adapter(None, 1024);
        let url = url::Url::parse(&format!("{}/huge.png", server.url())).unwrap();

        let err = adapter.fetch_remote(&url).await.unwrap_err();
        assert!(matches!(err, UploadError::PayloadTooLarge { max: 1024, .. }));
    }

    #[tokio::test]
    async fn test_fetch_remote_accepts_chunked_download_under_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/small.png")
            .with_status(200)
            .with_chunked_body(|w| w.write_all(PNG_MAGIC))
            .create_async()
            .await;

        let adapter = adapter(None, 1024);
        let url = url::Url::parse(&format!("{}/small.png", server.url())).unwrap();

        let bytes = adapter.fetch_remote(&url).await.unwrap();
        assert_eq!(&bytes[..], PNG_MAGIC);
    }
}
