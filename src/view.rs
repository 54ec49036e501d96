//! What the front end shows for a given session state.

use crate::image::{BackgroundColor, Tool};
use crate::session::{SessionState, Status};

/// One entry of the tool picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOption {
    /// The tool.
    pub tool: Tool,
    /// Whether it is the active tool.
    pub active: bool,
}

/// One entry of the background color picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    /// The color.
    pub color: BackgroundColor,
    /// Whether it is the current choice.
    pub selected: bool,
}

/// The result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPanel {
    /// Spinner with the tool's loading text.
    Loading {
        /// Text under the spinner.
        text: &'static str,
    },
    /// The main error panel.
    Error {
        /// Message from the failed request.
        message: String,
    },
    /// The result with its two download actions.
    Result {
        /// PNG data URI of the result.
        data_uri: String,
        /// File name of the full-resolution download.
        hd_file_name: String,
        /// File name of the 720p download.
        sd_file_name: String,
    },
    /// Nothing processed yet.
    Placeholder,
}

impl ResultPanel {
    /// Builds the panel for a session state.
    pub fn from_state(state: &SessionState) -> Self {
        match &state.status {
            Status::Processing => Self::Loading {
                text: state.tool.loading_text(),
            },
            Status::Failed(message) => Self::Error {
                message: message.clone(),
            },
            Status::Ready(image) => Self::Result {
                data_uri: image.to_data_uri(),
                hd_file_name: state.hd_file_name(),
                sd_file_name: state.sd_file_name(),
            },
            Status::Idle => Self::Placeholder,
        }
    }
}

/// Tool picker entries, in display order.
pub fn tool_options(state: &SessionState) -> Vec<ToolOption> {
    Tool::ALL
        .into_iter()
        .map(|tool| ToolOption {
            tool,
            active: tool == state.tool,
        })
        .collect()
}

/// Color picker entries, or `None` when the active tool has no background
/// choice.
pub fn color_options(state: &SessionState) -> Option<Vec<ColorOption>> {
    if !state.tool.uses_background_color() {
        return None;
    }
    Some(
        BackgroundColor::ALL
            .into_iter()
            .map(|color| ColorOption {
                color,
                selected: color == state.background,
            })
            .collect(),
    )
}
