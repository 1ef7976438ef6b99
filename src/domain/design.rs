//! Design assets handed to the mockup pipeline

use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DesignError {
    #[error("design is empty")]
    Empty,
    #[error("malformed data URL")]
    MalformedDataUrl,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
    #[error("unsupported design reference: {0}")]
    UnsupportedReference(String),
}

/// The user's source image, either embedded or already hosted
#[derive(Debug, Clone, PartialEq)]
pub enum DesignAsset {
    Encoded {
        bytes: Bytes,
        file_name: String,
    },
    Hosted(url::Url),
}

impl DesignAsset {
    /// Parse a design reference: a `data:` URL, an http(s) URL or bare base64
    pub fn parse(reference: &str, file_name: &str) -> Result<Self, DesignError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DesignError::Empty);
        }

        if reference.starts_with("data:") {
            let (_, payload) = reference
                .split_once(',')
                .ok_or(DesignError::MalformedDataUrl)?;
            return Self::from_base64(payload, file_name);
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            let url = url::Url::parse(reference)
                .map_err(|e| DesignError::UnsupportedReference(e.to_string()))?;
            return Ok(DesignAsset::Hosted(url));
        }

        Self::from_base64(reference, file_name)
    }

    fn from_base64(payload: &str, file_name: &str) -> Result<Self, DesignError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| DesignError::InvalidBase64(e.to_string()))?;
        if bytes.is_empty() {
            return Err(DesignError::Empty);
        }
        Ok(DesignAsset::Encoded {
            bytes: Bytes::from(bytes),
            file_name: file_name.to_string(),
        })
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, DesignAsset::Hosted(_))
    }

    /// Short description for logs, never the payload itself
    pub fn describe(&self) -> String {
        match self {
            DesignAsset::Encoded { bytes, file_name } => format!("{} ({} bytes)", file_name, bytes.len()),
            DesignAsset::Hosted(url) => url.to_string(),
        }
    }
}
