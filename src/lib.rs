#![warn(missing_docs)]
//! PhotoForge - AI photo editing through a generative image API.
//!
//! Three tools are available: background removal, quality enhancement and
//! passport-photo styling. The edit itself happens remotely; this crate
//! encodes the photo, builds the instruction, sends one request, and keeps
//! the session state that a front end renders.
//!
//! # Quick Start
//!
//! ```no_run
//! use photoforge::{BackgroundColor, GeminiTransformer, Outcome, Session, Tool};
//!
//! #[tokio::main]
//! async fn main() -> photoforge::Result<()> {
//!     let transformer = GeminiTransformer::builder().build()?;
//!     let session = Session::new(transformer);
//!
//!     session.select_tool(Tool::PassportPhoto).await;
//!     session.set_background(BackgroundColor::Blue).await;
//!
//!     if let Outcome::Ready(image) = session.upload_path("me.jpg").await {
//!         std::fs::write("me_passport.png", &image.data)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini`: Gemini (Google) transformer
//! - `cli`: Command-line front end

mod error;
pub mod image;
pub mod session;
pub mod view;

// Re-export error types at crate root
pub use error::{ErrorKind, PhotoForgeError, Result};

pub use crate::image::{
    build_prompt, encode_upload, export_sd, BackgroundColor, EncodedImage, ExportedImage,
    ImageFormat, ImageTransformer, ResultImage, Tool, TransformMetadata, TransformRequest, Upload,
};
pub use session::{Download, Outcome, Session, SessionState, Status};
pub use view::ResultPanel;

#[cfg(feature = "gemini")]
pub use crate::image::providers::{GeminiModel, GeminiTransformer, GeminiTransformerBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{PhotoForgeError, Result};
    pub use crate::image::{BackgroundColor, ImageTransformer, ResultImage, Tool, Upload};
    pub use crate::session::{Outcome, Session, Status};

    #[cfg(feature = "gemini")]
    pub use crate::image::providers::GeminiTransformer;
}
