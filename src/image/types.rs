//! Core types shared by the encoder, transformer and session.

use crate::error::{PhotoForgeError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats accepted as uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Parses a MIME type, accepting only PNG, JPEG and WEBP.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// A user-supplied photo, as picked in the upload surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name, used to name downloads.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl Upload {
    /// Creates an upload from in-memory bytes.
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Reads an upload from disk.
    ///
    /// The MIME type comes from the file extension, falling back to the
    /// file's magic bytes. Any read failure is reported as an encode error.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| PhotoForgeError::Encode(format!("{}: {e}", path.display())))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&data));
        let mime_type = match format {
            Some(f) => f.mime_type().to_string(),
            None => "application/octet-stream".to_string(),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(file_name, mime_type, data))
    }

    /// Returns the file name without its last extension.
    ///
    /// Falls back to `result` when the name is empty.
    pub fn basename(&self) -> String {
        let stem = match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.file_name.as_str(),
        };
        if stem.is_empty() {
            "result".to_string()
        } else {
            stem.to_string()
        }
    }

    /// Returns the size of the upload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// An upload encoded for transport: base64 payload plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Standard base64 (padded) encoding of the image bytes.
    pub data: String,
    /// MIME type of the encoded bytes.
    pub mime_type: String,
}

/// Metadata about a transformation round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformMetadata {
    /// Model that produced the image.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// The image returned by the service.
#[derive(Debug, Clone)]
#[must_use = "result image should be displayed or downloaded"]
pub struct ResultImage {
    /// Raw image bytes exactly as returned by the service.
    pub data: Vec<u8>,
    /// Round-trip metadata.
    pub metadata: TransformMetadata,
}

impl ResultImage {
    /// Creates a new result image.
    pub fn new(data: Vec<u8>, metadata: TransformMetadata) -> Self {
        Self { data, metadata }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a PNG data URI.
    ///
    /// The service is asked for PNG output so transparency survives; the
    /// URI is always tagged `image/png`.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}
