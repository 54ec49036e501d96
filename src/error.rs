//! Error types for photo processing.

use std::time::Duration;

/// Maximum length of a remote error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Coarse classification of a failure, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upload could not be read or is not a supported image.
    Encode,
    /// The call to the image service failed.
    Remote,
    /// The service answered but returned no image.
    NoImage,
    /// The local 720p export could not decode or re-encode the result.
    Resize,
}

/// Errors that can occur while processing a photo.
#[derive(Debug, thiserror::Error)]
pub enum PhotoForgeError {
    /// The upload could not be read or encoded.
    #[error("failed to read image: {0}")]
    Encode(String),

    /// The upload has a MIME type the service does not accept.
    #[error("unsupported image type: {0} (expected PNG, JPEG or WEBP)")]
    UnsupportedMediaType(String),

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit or quota exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested delay, if any.
        retry_after: Option<Duration>,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters (e.g. unknown model).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The response contained no inline image part.
    #[error("No image data found in the response.")]
    NoImageData,

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data returned by the service.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The result image could not be decoded or resized locally.
    #[error("failed to resize image: {0}")]
    Resize(#[from] image::ImageError),

    /// I/O error (e.g. writing a download to disk).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PhotoForgeError {
    /// Returns which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encode(_) | Self::UnsupportedMediaType(_) | Self::Io(_) => ErrorKind::Encode,
            Self::NoImageData => ErrorKind::NoImage,
            Self::Resize(_) => ErrorKind::Resize,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::InvalidRequest(_)
            | Self::UnexpectedResponse(_)
            | Self::Network(_)
            | Self::Decode(_)
            | Self::Json(_) => ErrorKind::Remote,
        }
    }

    /// Returns the message shown in the result panel.
    ///
    /// Remote failures are wrapped so the user can tell a service problem
    /// apart from a problem with their file.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Remote => format!("Failed to process image: {self}"),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for photo processing operations.
pub type Result<T> = std::result::Result<T, PhotoForgeError>;

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Redacts API keys from a remote error body and caps its length.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            let bare = word.trim_matches(|c: char| !c.is_ascii_alphanumeric());
            if bare.starts_with("AIza") && bare.len() >= 30 {
                word.replace(bare, "[REDACTED]")
            } else {
                word.to_string()
            }
        })
        .collect();
    let joined = redacted.join(" ");

    if joined.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = joined.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        joined
    }
}
