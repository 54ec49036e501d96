//! Photo encoding, prompts, remote transformation and export.

pub mod encoder;
mod prompt;
mod provider;
pub mod providers;
pub mod resize;
mod types;

pub use encoder::encode_upload;
pub use prompt::{build_prompt, BackgroundColor, Tool};
pub use provider::{ImageTransformer, TransformRequest};
pub use resize::{export_sd, ExportedImage, SD_MAX_EDGE};
pub use types::{EncodedImage, ImageFormat, ResultImage, TransformMetadata, Upload};
