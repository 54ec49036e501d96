//! Tools and the instruction strings sent for each of them.

use serde::{Deserialize, Serialize};

const REMOVE_BACKGROUND_PROMPT: &str = "Please remove the background from this image, making it transparent. The main subject should be preserved with clean, high-quality edges.";

const ENHANCE_PROMPT: &str = "Enhance this photo to the highest possible quality, targeting an 8K resolution look. Improve lighting, color balance, sharpness, and clarity. Make it look professional, clean, and ultra-detailed. Do not crop or change the aspect ratio. Preserve the original subject and composition.";

const PASSPORT_PROMPT: &str = "Create a professional passport-style photo of the person in this image. Change the clothing to a formal dark-colored suit with a collared shirt and tie. The new outfit should look realistic and natural. Do not change the person's face, hair, or any of their features. The expression should be neutral. The subject should be centered and looking directly at the camera.";

/// A supported transformation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// Make the background transparent.
    #[default]
    RemoveBackground,
    /// Improve lighting, color and sharpness.
    Enhance,
    /// Restyle as a passport photo with a suit and chosen background.
    PassportPhoto,
}

impl Tool {
    /// All tools, in picker order.
    pub const ALL: [Tool; 3] = [Tool::RemoveBackground, Tool::Enhance, Tool::PassportPhoto];

    /// Returns the identifier used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveBackground => "remove-background",
            Self::Enhance => "enhance",
            Self::PassportPhoto => "passport-photo",
        }
    }

    /// Short label shown in the tool picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RemoveBackground => "Bg Remove",
            Self::Enhance => "Photo Enhance",
            Self::PassportPhoto => "Passport Photo",
        }
    }

    /// Heading shown above the upload surface.
    pub fn title(&self) -> &'static str {
        match self {
            Self::RemoveBackground => "Bg Remove",
            Self::Enhance => "Photo Enhancer",
            Self::PassportPhoto => "AI Passport Photo Creator",
        }
    }

    /// One-line description of what the tool does.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RemoveBackground => {
                "Upload an image and our AI will automatically remove the background for you."
            }
            Self::Enhance => {
                "Instantly improve your image quality to an 8K look. Enhance colors, lighting, and sharpness."
            }
            Self::PassportPhoto => {
                "Turn any photo into a professional passport picture. Our AI adjusts clothing and background to meet requirements."
            }
        }
    }

    /// Text shown while a request is in flight.
    pub fn loading_text(&self) -> &'static str {
        match self {
            Self::RemoveBackground => "Removing background...",
            Self::Enhance => "Enhancing photo...",
            Self::PassportPhoto => "Creating passport photo...",
        }
    }

    /// Returns true if the background color choice applies to this tool.
    pub fn uses_background_color(&self) -> bool {
        matches!(self, Self::PassportPhoto)
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background choice for passport photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundColor {
    /// Leave the background as it is.
    Original,
    /// Solid white.
    #[default]
    White,
    /// Solid black.
    Black,
    /// Solid grey.
    Grey,
    /// Solid blue.
    Blue,
    /// Solid red.
    Red,
}

impl BackgroundColor {
    /// All colors, in picker order.
    pub const ALL: [BackgroundColor; 6] = [
        BackgroundColor::Original,
        BackgroundColor::White,
        BackgroundColor::Black,
        BackgroundColor::Grey,
        BackgroundColor::Blue,
        BackgroundColor::Red,
    ];

    /// Returns the color name as used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::White => "white",
            Self::Black => "black",
            Self::Grey => "grey",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }

    /// Label shown in the color picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::White => "White",
            Self::Black => "Black",
            Self::Grey => "Grey",
            Self::Blue => "Blue",
            Self::Red => "Red",
        }
    }
}

impl std::fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the instruction string for a tool.
///
/// `background` only affects [`Tool::PassportPhoto`].
pub fn build_prompt(tool: Tool, background: BackgroundColor) -> String {
    match tool {
        Tool::RemoveBackground => REMOVE_BACKGROUND_PROMPT.to_string(),
        Tool::Enhance => ENHANCE_PROMPT.to_string(),
        Tool::PassportPhoto => {
            let mut prompt = PASSPORT_PROMPT.to_string();
            match background {
                BackgroundColor::Original => {
                    prompt.push_str(" Keep the original background completely unchanged.");
                }
                color => {
                    prompt.push_str(&format!(
                        " Replace the background with a solid {color} color background. The subject should be well-lit with no harsh shadows."
                    ));
                }
            }
            prompt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        for tool in Tool::ALL {
            for color in BackgroundColor::ALL {
                assert_eq!(build_prompt(tool, color), build_prompt(tool, color));
            }
        }
    }

    #[test]
    fn test_remove_background_prompt() {
        let prompt = build_prompt(Tool::RemoveBackground, BackgroundColor::White);
        assert!(prompt.contains("remove the background"));
        assert!(prompt.contains("transparent"));
    }

    #[test]
    fn test_background_ignored_outside_passport() {
        assert_eq!(
            build_prompt(Tool::Enhance, BackgroundColor::Red),
            build_prompt(Tool::Enhance, BackgroundColor::Original)
        );
        assert!(!build_prompt(Tool::Enhance, BackgroundColor::Red).contains("red"));
    }

    #[test]
    fn test_passport_original_keeps_background() {
        let prompt = build_prompt(Tool::PassportPhoto, BackgroundColor::Original);
        assert!(prompt.contains("formal dark-colored suit"));
        assert!(prompt.ends_with("Keep the original background completely unchanged."));
        assert!(!prompt.contains("Replace the background"));
    }

    #[test]
    fn test_passport_solid_colors() {
        for color in BackgroundColor::ALL
            .into_iter()
            .filter(|c| *c != BackgroundColor::Original)
        {
            let prompt = build_prompt(Tool::PassportPhoto, color);
            let clause = format!("Replace the background with a solid {} color", color.as_str());
            assert!(prompt.contains(&clause), "missing clause for {color}");
            assert!(!prompt.contains("unchanged."));
        }
    }

    #[test]
    fn test_tool_metadata() {
        assert_eq!(Tool::default(), Tool::RemoveBackground);
        assert_eq!(Tool::PassportPhoto.loading_text(), "Creating passport photo...");
        assert_eq!(Tool::Enhance.title(), "Photo Enhancer");
        assert!(Tool::PassportPhoto.uses_background_color());
        assert!(!Tool::RemoveBackground.uses_background_color());
        assert_eq!(Tool::RemoveBackground.to_string(), "remove-background");
    }

    #[test]
    fn test_background_default_and_serde() {
        assert_eq!(BackgroundColor::default(), BackgroundColor::White);
        let json = serde_json::to_string(&BackgroundColor::Grey).unwrap();
        assert_eq!(json, "\"grey\"");
        let tool: Tool = serde_json::from_str("\"passport-photo\"").unwrap();
        assert_eq!(tool, Tool::PassportPhoto);
    }
}
