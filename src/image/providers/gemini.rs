//! Gemini (Google) image transformer.

use crate::error::{parse_retry_after, sanitize_error_message, PhotoForgeError, Result};
use crate::image::provider::{ImageTransformer, TransformRequest};
use crate::image::types::{ResultImage, TransformMetadata};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked, in order, for the API key.
const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }
}

/// Builder for [`GeminiTransformer`].
#[derive(Debug, Clone, Default)]
pub struct GeminiTransformerBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiTransformerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API endpoint (scheme and host, no trailing path).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the transformer, resolving the API key.
    pub fn build(self) -> Result<GeminiTransformer> {
        let api_key = self
            .api_key
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            })
            .ok_or_else(|| {
                PhotoForgeError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiTransformer {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url,
        })
    }
}

/// Gemini image transformer.
pub struct GeminiTransformer {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiTransformer {
    /// Creates a new `GeminiTransformerBuilder`.
    pub fn builder() -> GeminiTransformerBuilder {
        GeminiTransformerBuilder::new()
    }

    /// Returns the model this transformer calls.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model.as_str())
    }

    async fn transform_impl(&self, request: &TransformRequest) -> Result<ResultImage> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_transform_request(request);

        tracing::debug!(
            model = self.model.as_str(),
            mime_type = %request.image.mime_type,
            "submitting Gemini image edit request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let inline_data = extract_image(gemini_response)?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(&inline_data.data)
            .map_err(|e| PhotoForgeError::Decode(e.to_string()))?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            bytes = data.len(),
            mime_type = %inline_data.mime_type,
            duration_ms,
            "Gemini image edit complete"
        );

        Ok(ResultImage::new(
            data,
            TransformMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

/// Returns the first part carrying inline image bytes, if any.
fn first_inline_image(parts: &[GeminiPartResponse]) -> Option<&InlineData> {
    parts.iter().find_map(|p| p.inline_data.as_ref())
}

/// Pulls the image out of a successful (HTTP 200) response.
fn extract_image(response: GeminiResponse) -> Result<InlineData> {
    // Blocked prompts are also returned as HTTP 200
    if let Some(ref feedback) = response.prompt_feedback {
        if let Some(ref reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(PhotoForgeError::ContentBlocked(msg));
        }
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        PhotoForgeError::UnexpectedResponse("No candidates in Gemini response".into())
    })?;

    if let Some(ref finish_reason) = candidate.finish_reason {
        match finish_reason.as_str() {
            "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST" => {
                return Err(PhotoForgeError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    finish_reason
                )));
            }
            "NO_IMAGE" => return Err(PhotoForgeError::NoImageData),
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    first_inline_image(&parts)
        .cloned()
        .ok_or(PhotoForgeError::NoImageData)
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> PhotoForgeError {
    let text = sanitize_error_message(text);
    if status == 404 {
        return PhotoForgeError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return PhotoForgeError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return PhotoForgeError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return PhotoForgeError::ContentBlocked(text);
    }
    PhotoForgeError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl ImageTransformer for GeminiTransformer {
    async fn transform(&self, request: &TransformRequest) -> Result<ResultImage> {
        self.transform_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(PhotoForgeError::Auth("Invalid API key".into())),
            404 => Err(PhotoForgeError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(PhotoForgeError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_transform_request(req: &TransformRequest) -> Self {
        // Image first, then the instruction
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: req.image.mime_type.clone(),
                    data: req.image.data.clone(),
                },
            },
            GeminiRequestPart::Text {
                text: req.prompt.clone(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::image::types::EncodedImage;
    use mockito::Matcher;
    use serde_json::json;

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";

    fn request() -> TransformRequest {
        TransformRequest::new(
            EncodedImage {
                data: "/9j/4AAQ".into(),
                mime_type: "image/jpeg".into(),
            },
            "Please remove the background from this image",
        )
    }

    fn transformer(base_url: &str) -> GeminiTransformer {
        GeminiTransformer::builder()
            .api_key("test-key")
            .base_url(base_url)
            .build()
            .unwrap()
    }

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "nano-banana-pro-preview"
        );
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let transformer = GeminiTransformerBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .base_url("http://localhost:1234/")
            .build()
            .unwrap();
        assert_eq!(transformer.model(), GeminiModel::NanoBananaPro);
        assert_eq!(
            transformer.model_url(),
            "http://localhost:1234/v1beta/models/nano-banana-pro-preview"
        );
        assert_eq!(transformer.name(), "Gemini (Google)");
    }

    #[test]
    fn test_request_serialization() {
        let gemini_req = GeminiRequest::from_transform_request(&request());
        let json = serde_json::to_value(&gemini_req).unwrap();

        assert_eq!(
            json,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "/9j/4AAQ"}},
                        {"text": "Please remove the background from this image"}
                    ]
                }],
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })
        );
    }

    #[test]
    fn test_first_inline_image_skips_text_parts() {
        let resp = parse(
            r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your edited image"},
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}},
                        {"inlineData": {"mimeType": "image/png", "data": "BAUG"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#,
        );
        let inline = extract_image(resp).unwrap();
        assert_eq!(inline.data, "AQID");
    }

    #[test]
    fn test_first_inline_image_empty() {
        assert!(first_inline_image(&[]).is_none());
    }

    #[test]
    fn test_response_without_image_is_no_image_data() {
        let resp = parse(
            r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I cannot edit this image."}, {}]}
            }]
        }"#,
        );
        let err = extract_image(resp).unwrap_err();
        assert!(matches!(err, PhotoForgeError::NoImageData));
        assert_eq!(err.kind(), ErrorKind::NoImage);
    }

    #[test]
    fn test_response_without_content_is_no_image_data() {
        let resp = parse(r#"{"candidates": [{"finishReason": "STOP"}]}"#);
        assert!(matches!(
            extract_image(resp).unwrap_err(),
            PhotoForgeError::NoImageData
        ));

        let resp = parse(r#"{"candidates": [{"finishReason": "NO_IMAGE"}]}"#);
        assert!(matches!(
            extract_image(resp).unwrap_err(),
            PhotoForgeError::NoImageData
        ));
    }

    #[test]
    fn test_response_without_candidates() {
        let err = extract_image(parse("{}")).unwrap_err();
        assert!(matches!(err, PhotoForgeError::UnexpectedResponse(_)));
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let resp = parse(
            r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#,
        );
        let err = extract_image(resp).unwrap_err();
        assert_eq!(
            err.to_string(),
            "content blocked: Prompt was blocked due to safety"
        );
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let resp = parse(r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#);
        let err = extract_image(resp).unwrap_err();
        assert!(matches!(err, PhotoForgeError::ContentBlocked(_)));
    }

    #[test]
    fn test_parse_error_statuses() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(401, "bad key", &headers),
            PhotoForgeError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            PhotoForgeError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(400, "Request blocked by safety settings", &headers),
            PhotoForgeError::ContentBlocked(_)
        ));
        assert!(matches!(
            parse_error(500, "boom", &headers),
            PhotoForgeError::Api { status: 500, .. }
        ));

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "7".parse().unwrap());
        assert!(matches!(
            parse_error(429, "quota", &headers),
            PhotoForgeError::RateLimited { retry_after: Some(d) } if d.as_secs() == 7
        ));
    }

    #[tokio::test]
    async fn test_transform_returns_png_data_uri() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"parts": [
                            {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                        ]},
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let image = transformer(&server.url())
            .transform(&request())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            image.data,
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        );
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(
            image.metadata.model.as_deref(),
            Some("gemini-2.5-flash-image")
        );
    }

    #[tokio::test]
    async fn test_transform_without_image_part() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "no"}]}}]}"#)
            .create_async()
            .await;

        let err = transformer(&server.url())
            .transform(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoForgeError::NoImageData));
        assert_eq!(err.user_message(), "No image data found in the response.");
    }

    #[tokio::test]
    async fn test_transform_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let err = transformer(&server.url())
            .transform(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoForgeError::Auth(_)));
        assert!(err.user_message().starts_with("Failed to process image:"));
        assert!(err.user_message().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_transform_malformed_base64() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_body(
                r#"{"candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "!!not base64!!"}}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let err = transformer(&server.url())
            .transform(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoForgeError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[tokio::test]
    async fn test_transform_network_failure() {
        // Nothing listens on port 1
        let err = transformer("http://127.0.0.1:1")
            .transform(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoForgeError::Network(_)));
        assert!(!err.user_message().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/v1beta/models/gemini-2.5-flash-image")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        transformer(&server.url()).health_check().await.unwrap();

        let bad = GeminiTransformer::builder()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .base_url(server.url())
            .build()
            .unwrap();
        let _missing = server
            .mock("GET", "/v1beta/models/nano-banana-pro-preview")
            .with_status(404)
            .create_async()
            .await;
        assert!(matches!(
            bad.health_check().await.unwrap_err(),
            PhotoForgeError::InvalidRequest(_)
        ));
    }
}
