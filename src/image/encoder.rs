//! Upload-to-text encoding.

use crate::error::{PhotoForgeError, Result};
use crate::image::types::{EncodedImage, ImageFormat, Upload};
use base64::Engine;

/// Encodes an upload as a base64 payload tagged with its MIME type.
///
/// Fails without retrying when the upload is empty or its MIME type is not
/// one of PNG, JPEG or WEBP.
pub fn encode_upload(upload: &Upload) -> Result<EncodedImage> {
    let format = ImageFormat::from_mime_type(&upload.mime_type)
        .ok_or_else(|| PhotoForgeError::UnsupportedMediaType(upload.mime_type.clone()))?;

    if upload.data.is_empty() {
        return Err(PhotoForgeError::Encode(format!(
            "{} is empty",
            upload.file_name
        )));
    }

    Ok(EncodedImage {
        data: base64::engine::general_purpose::STANDARD.encode(&upload.data),
        mime_type: format.mime_type().to_string(),
    })
}
