//! Editing session: the active tool, the current upload and its result.
//!
//! A [`Session`] owns everything one user sees. Every upload or tool switch
//! starts a new request generation; a response that arrives for an older
//! generation is dropped, so only the newest request can change what is
//! displayed.

use crate::error::{PhotoForgeError, Result};
use crate::image::{
    build_prompt, encode_upload, export_sd, BackgroundColor, ImageTransformer, ResultImage, Tool,
    TransformRequest, Upload,
};
use std::path::Path;
use tokio::sync::Mutex;

/// Where the session is in its request cycle.
#[derive(Debug, Clone, Default)]
pub enum Status {
    /// Nothing uploaded yet, or the tool was just switched.
    #[default]
    Idle,
    /// A request for the current upload is in flight.
    Processing,
    /// The service returned an image.
    Ready(ResultImage),
    /// The request failed; holds the message shown to the user.
    Failed(String),
}

impl Status {
    /// Returns true while a request is in flight.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    /// Returns the result image, if one is ready.
    pub fn result(&self) -> Option<&ResultImage> {
        match self {
            Self::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Returns the error message, if the last request failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A copy of the session's state at one point in time.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Active tool.
    pub tool: Tool,
    /// Background choice for the passport tool.
    pub background: BackgroundColor,
    /// Current upload, if any.
    pub upload: Option<Upload>,
    /// Request status.
    pub status: Status,
    pub(crate) generation: u64,
}

impl SessionState {
    /// Returns the idle state of a freshly selected tool.
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            ..Default::default()
        }
    }

    /// Returns the base name used for download file names.
    pub fn download_basename(&self) -> String {
        self.upload
            .as_ref()
            .map(Upload::basename)
            .unwrap_or_else(|| "result".to_string())
    }

    /// File name of the full-resolution download.
    pub fn hd_file_name(&self) -> String {
        format!("{}_8K_HD.png", self.download_basename())
    }

    /// File name of the 720p download.
    pub fn sd_file_name(&self) -> String {
        format!("{}_720p.png", self.download_basename())
    }

    fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// How an upload request ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The result is now displayed.
    Ready(ResultImage),
    /// The request failed; the message is now displayed.
    Failed(String),
    /// A newer upload or a tool switch replaced this request; its response
    /// was discarded.
    Superseded,
}

/// A file offered for download.
#[derive(Debug, Clone)]
pub struct Download {
    /// Suggested file name.
    pub file_name: String,
    /// PNG bytes.
    pub data: Vec<u8>,
}

/// An editing session driving an [`ImageTransformer`].
pub struct Session<T> {
    transformer: T,
    state: Mutex<SessionState>,
}

impl<T: ImageTransformer> Session<T> {
    /// Creates an idle session with the default tool.
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Returns the transformer this session sends requests to.
    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Switches tools.
    ///
    /// Clears the upload, result and error, resets the background to white
    /// and invalidates any request still in flight.
    pub async fn select_tool(&self, tool: Tool) {
        let mut state = self.state.lock().await;
        state.invalidate();
        state.tool = tool;
        state.background = BackgroundColor::default();
        state.upload = None;
        state.status = Status::Idle;
        tracing::debug!(%tool, generation = state.generation, "tool selected");
    }

    /// Changes the passport background.
    ///
    /// Only the passport tool has a background choice; for other tools this
    /// does nothing and returns false. The new color takes effect on the next
    /// upload or [`reprocess`](Self::reprocess); it does not re-run the
    /// current request.
    pub async fn set_background(&self, color: BackgroundColor) -> bool {
        let mut state = self.state.lock().await;
        if !state.tool.uses_background_color() {
            return false;
        }
        state.background = color;
        true
    }

    /// Uploads a photo and runs the active tool on it.
    pub async fn upload(&self, upload: Upload) -> Outcome {
        let (generation, request) = {
            let mut state = self.state.lock().await;
            let generation = state.invalidate();
            let encoded = encode_upload(&upload);
            state.upload = Some(upload);

            match encoded {
                Ok(image) => {
                    state.status = Status::Processing;
                    let prompt = build_prompt(state.tool, state.background);
                    (generation, TransformRequest::new(image, prompt))
                }
                Err(e) => {
                    let message = e.user_message();
                    state.status = Status::Failed(message.clone());
                    return Outcome::Failed(message);
                }
            }
        };

        let result = self.transformer.transform(&request).await;
        self.finish(generation, result).await
    }

    /// Reads a photo from disk and uploads it.
    ///
    /// A read failure replaces the current upload and result with the error.
    pub async fn upload_path(&self, path: impl AsRef<Path>) -> Outcome {
        match Upload::from_path(path).await {
            Ok(upload) => self.upload(upload).await,
            Err(e) => {
                let mut state = self.state.lock().await;
                state.invalidate();
                state.upload = None;
                let message = e.user_message();
                state.status = Status::Failed(message.clone());
                Outcome::Failed(message)
            }
        }
    }

    /// Runs the current upload again with the current tool and background.
    ///
    /// Returns `None` when nothing has been uploaded.
    pub async fn reprocess(&self) -> Option<Outcome> {
        let upload = self.state.lock().await.upload.clone()?;
        Some(self.upload(upload).await)
    }

    /// Returns the result exactly as the service returned it.
    pub async fn hd_download(&self) -> Option<Download> {
        let state = self.state.lock().await;
        let image = state.status.result()?;
        Some(Download {
            file_name: state.hd_file_name(),
            data: image.data.clone(),
        })
    }

    /// Returns the result scaled to 720 pixels on its longer edge.
    ///
    /// Returns `Ok(None)` when no result is ready. A decode or encode failure
    /// is returned to the caller and leaves the session untouched.
    pub async fn sd_download(&self) -> Result<Option<Download>> {
        let (file_name, data) = {
            let state = self.state.lock().await;
            match state.status.result() {
                Some(image) => (state.sd_file_name(), image.data.clone()),
                None => return Ok(None),
            }
        };

        let exported = export_sd(&data)?;
        Ok(Some(Download {
            file_name,
            data: exported.data,
        }))
    }

    async fn finish(&self, generation: u64, result: Result<ResultImage>) -> Outcome {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "discarding stale response"
            );
            return Outcome::Superseded;
        }

        match result {
            Ok(image) => {
                state.status = Status::Ready(image.clone());
                Outcome::Ready(image)
            }
            Err(e) => {
                tracing::debug!(error = %e, "request failed");
                let message = failure_message(&e);
                state.status = Status::Failed(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}

fn failure_message(err: &PhotoForgeError) -> String {
    let message = err.user_message();
    if message.trim().is_empty() {
        "An unexpected error occurred.".to_string()
    } else {
        message
    }
}
