//! Image payloads submitted to the detection endpoint.
//!
//! Input is checked by sniffing magic bytes, so a file that is not an image
//! is rejected before any request goes out.

use std::path::Path;

use tracing::info;

use crate::error::{NailedItError, Result};

#[derive(Debug, Clone)]
pub struct ImagePayload {
    file_name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl ImagePayload {
    /// Wrap in-memory image content. Fails with `InvalidInput` when the
    /// content is empty or not a recognised image format.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(NailedItError::InvalidInput(format!(
                "'{}' is empty",
                file_name
            )));
        }

        let format = image::guess_format(&bytes).map_err(|_| {
            NailedItError::InvalidInput(format!(
                "'{}' is not an image. Please select an image file.",
                file_name
            ))
        })?;

        Ok(Self {
            file_name,
            content_type: format.to_mime_type(),
            bytes,
        })
    }

    /// Read an image file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let payload = Self::from_bytes(file_name, bytes)?;
        info!(
            "Loaded image '{}' ({}, {:.2} MB)",
            payload.file_name,
            payload.content_type,
            payload.bytes.len() as f64 / 1024.0 / 1024.0
        );
        Ok(payload)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
