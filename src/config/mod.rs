//! Configuration module for the mockup service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;
use std::time::Duration;

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub printify: PrintifySettings,
    pub image_host: ImageHostSettings,
    pub mockup: MockupSettings,
    pub history: HistorySettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8787,
            workers: None,
        }
    }
}

/// Log verbosity and output format
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// EnvFilter directive used when RUST_LOG is not set
    pub level: String,
    /// Emit JSON lines instead of the human readable format
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "automerch=info,actix_web=info".to_string(),
            json: true,
        }
    }
}

/// Printify fulfillment API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrintifySettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub shop_id: String,
    /// Storefront (e.g. an Etsy-linked shop) checked first while polling
    pub alternate_shop_id: Option<String>,
    pub rate_limit_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for PrintifySettings {
    fn default() -> Self {
        PrintifySettings {
            base_url: "https://api.printify.com/v1".to_string(),
            api_token: None,
            shop_id: String::new(),
            alternate_shop_id: None,
            rate_limit_per_minute: 600,
            timeout_secs: 30,
        }
    }
}

/// Public image host (ImgBB) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageHostSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Seconds until the hosted copy expires, 0 keeps it forever
    pub expiration_secs: u64,
    pub max_upload_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl Default for ImageHostSettings {
    fn default() -> Self {
        ImageHostSettings {
            base_url: "https://api.imgbb.com/1/upload".to_string(),
            api_key: None,
            expiration_secs: 0,
            max_upload_bytes: 32 * 1024 * 1024,
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

/// How embedded designs reach the fulfillment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStrategy {
    /// Host on the image host first, then register the public URL
    ImageHost,
    /// Send base64 contents straight to the fulfillment provider
    Inline,
}

/// Mockup orchestration tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockupSettings {
    pub settle_delay_ms: u64,
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
    pub patch_after_create: bool,
    pub upload_strategy: UploadStrategy,
    /// Treat an empty (but successful) variant listing as a hard error
    pub strict_catalog: bool,
    pub log_payloads: bool,
}

impl Default for MockupSettings {
    fn default() -> Self {
        MockupSettings {
            settle_delay_ms: 7000,
            poll_max_attempts: 60,
            poll_interval_ms: 2000,
            patch_after_create: true,
            upload_strategy: UploadStrategy::ImageHost,
            strict_catalog: false,
            log_payloads: false,
        }
    }
}

impl MockupSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Product history persistence
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub path: PathBuf,
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        HistorySettings {
            path: PathBuf::from("data/history.json"),
            max_entries: 500,
        }
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with AUTOMERCH_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (AUTOMERCH_PRINTIFY__SHOP_ID, etc.)
            .add_source(
                Environment::with_prefix("AUTOMERCH")
                    .separator("__")
                    .try_parsing(true)
            );

        builder.build()?.try_deserialize()
    }
}
