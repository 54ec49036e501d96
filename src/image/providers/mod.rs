//! Image transformer backends.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiModel, GeminiTransformer, GeminiTransformerBuilder};
