//! Vision model backend behind a trait seam.
//!
//! Production backend is the Gemini `generateContent` REST API with the
//! image inlined as base64 PNG, a structured-JSON response mime type,
//! and a fixed low temperature for reproducible diagnostic output. The
//! mock implementation scripts outcomes for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Default production model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Low temperature biases toward deterministic output. Diagnostic
/// consistency is worth more than creative variance here.
const TEMPERATURE: f32 = 0.4;

/// Failure of a single model call. All variants are treated as
/// transient by the retry loop.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Connection(String),
    #[error("model returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Seam between the analysis service and the remote vision model.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Whether credentials are present. `false` short-circuits analysis
    /// to the degraded path without any network attempt.
    fn is_configured(&self) -> bool {
        true
    }

    /// Submit one image + prompt and return the model's structured
    /// JSON output.
    async fn analyze_image(
        &self,
        png_bytes: &[u8],
        prompt: &str,
    ) -> Result<serde_json::Value, ModelError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Gemini REST client.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }

    /// Read `GOOGLE_API_KEY` from the environment.
    pub fn from_env() -> Self {
        Self::new(crate::config::google_api_key())
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl VisionModel for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn analyze_image(
        &self,
        png_bytes: &[u8],
        prompt: &str,
    ) -> Result<serde_json::Value, ModelError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::Connection("GOOGLE_API_KEY not set".into()))?;

        let url = format!(
            "{}/models/{}:generateContent?key={key}",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/png",
                            data: base64::engine::general_purpose::STANDARD.encode(png_bytes),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .ok_or_else(|| ModelError::MalformedResponse("no candidate text".into()))?;

        parse_model_json(&text)
    }
}

/// Parse the model's output text as JSON.
///
/// The response mime type requests bare JSON, but models still wrap
/// output in Markdown code fences often enough that stripping them
/// first is cheaper than a retry.
pub fn parse_model_json(text: &str) -> Result<serde_json::Value, ModelError> {
    let trimmed = text.trim();
    let inner = if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        match after.find("```") {
            Some(end) => after[..end].trim(),
            None => after.trim(),
        }
    } else if let Some(stripped) = trimmed
        .strip_prefix("```")
        .and_then(|s| s.strip_suffix("```"))
    {
        stripped.trim()
    } else {
        trimmed
    };

    serde_json::from_str(inner).map_err(|e| ModelError::MalformedResponse(e.to_string()))
}

// ---------------------------------------------------------------------------
// MockVisionModel
// ---------------------------------------------------------------------------

/// Mock vision backend: returns scripted outcomes in order, then the
/// configured fallback (if any).
pub struct MockVisionModel {
    configured: bool,
    outcomes: Mutex<VecDeque<Result<serde_json::Value, String>>>,
    fallback: Option<serde_json::Value>,
    calls: AtomicU32,
}

impl MockVisionModel {
    /// Always answer with `value`.
    pub fn with_response(value: serde_json::Value) -> Self {
        Self {
            configured: true,
            outcomes: Mutex::new(VecDeque::new()),
            fallback: Some(value),
            calls: AtomicU32::new(0),
        }
    }

    /// Answer with `outcomes` in order; further calls fail.
    pub fn with_outcomes(outcomes: Vec<Result<serde_json::Value, String>>) -> Self {
        Self {
            configured: true,
            outcomes: Mutex::new(outcomes.into()),
            fallback: None,
            calls: AtomicU32::new(0),
        }
    }

    /// A backend with no credentials.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            outcomes: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze_image(
        &self,
        _png_bytes: &[u8],
        _prompt: &str,
    ) -> Result<serde_json::Value, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ModelError::Connection(message)),
            None => match &self.fallback {
                Some(value) => Ok(value.clone()),
                None => Err(ModelError::Connection("no scripted outcome".into())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_json() {
        let value = parse_model_json(r#"{"findings": []}"#).unwrap();
        assert!(value["findings"].is_array());
    }

    #[test]
    fn parse_fenced_json() {
        let value = parse_model_json("```json\n{\"severity\": \"ROUTINE\"}\n```").unwrap();
        assert_eq!(value["severity"], "ROUTINE");
    }

    #[test]
    fn parse_fenced_without_language_tag() {
        let value = parse_model_json("```\n{\"severity\": \"URGENT\"}\n```").unwrap();
        assert_eq!(value["severity"], "URGENT");
    }

    #[test]
    fn parse_invalid_json_fails() {
        assert!(matches!(
            parse_model_json("not json at all"),
            Err(ModelError::MalformedResponse(_))
        ));
    }

    #[test]
    fn unconfigured_client_reports_missing_credentials() {
        let client = GeminiClient::new(None);
        assert!(!client.is_configured());
        let client = GeminiClient::new(Some("test-key".into()));
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn request_without_key_never_reaches_the_network() {
        // Base URL points nowhere routable; the key check must fire first
        let client = GeminiClient::new(None).with_base_url("http://127.0.0.1:1");
        let err = client.analyze_image(b"png", "prompt").await.unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn mock_scripted_outcomes_in_order() {
        let mock = MockVisionModel::with_outcomes(vec![
            Err("connect timeout".into()),
            Ok(serde_json::json!({"severity": "ROUTINE"})),
        ]);

        assert!(mock.analyze_image(b"", "").await.is_err());
        let value = mock.analyze_image(b"", "").await.unwrap();
        assert_eq!(value["severity"], "ROUTINE");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn mock_fallback_repeats() {
        let mock = MockVisionModel::with_response(serde_json::json!({"findings": []}));
        for _ in 0..3 {
            assert!(mock.analyze_image(b"", "").await.is_ok());
        }
        assert_eq!(mock.call_count(), 3);
    }
}
