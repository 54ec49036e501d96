//! Image transformer trait.

use crate::error::Result;
use crate::image::types::{EncodedImage, ResultImage};
use async_trait::async_trait;

/// One transformation request: an encoded photo plus the instruction.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// The encoded photo.
    pub image: EncodedImage,
    /// Natural-language instruction describing the edit.
    pub prompt: String,
}

impl TransformRequest {
    /// Creates a new request.
    pub fn new(image: EncodedImage, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
        }
    }
}

/// A remote service that edits a photo according to an instruction.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Sends the request and returns the first image in the response.
    async fn transform(&self, request: &TransformRequest) -> Result<ResultImage>;

    /// Returns the name of this transformer for display.
    fn name(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
