//! Oracle client — the single point of entry for all generative-AI calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All oracle interactions MUST go through this module, behind the
//! [`Oracle`] trait so the pipeline never depends on the concrete client.
//!
//! Model: gemini-2.0-flash (hardcoded — do not make configurable to prevent drift)
//!
//! Calls are NOT retried: a failed field request degrades to an empty
//! field upstream instead of blocking the rest of the document.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all oracle calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("oracle returned empty content")]
    EmptyContent,
}

/// A text-completion oracle: free text in, free text out.
///
/// The concrete client is swapped for a canned implementation in tests —
/// the pipeline only ever sees this trait.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// One text-only completion call.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;

    /// One completion call over an inline image plus an instruction.
    async fn complete_with_image(
        &self,
        prompt: &str,
        mime: &str,
        image: &[u8],
    ) -> Result<String, OracleError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Joined text of the first candidate's text parts.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production oracle client wrapping the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn call(&self, parts: Vec<Part<'_>>) -> Result<String, OracleError> {
        let request_body = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_URL}/{MODEL}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the structured error message when the body parses.
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text().ok_or(OracleError::EmptyContent)?;

        debug!("oracle call succeeded: {} chars returned", text.len());
        Ok(text)
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.call(vec![Part::Text { text: prompt }]).await
    }

    async fn complete_with_image(
        &self,
        prompt: &str,
        mime: &str,
        image: &[u8],
    ) -> Result<String, OracleError> {
        let inline = Part::InlineData {
            inline_data: InlineData {
                mime_type: mime.to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(image),
            },
        };
        self.call(vec![inline, Part::Text { text: prompt }]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Jane "}, {"text": "Doe"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_response_with_textless_parts_is_empty() {
        let json = r#"{"candidates": [{"content": {"parts": [{}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_text_part_serializes_flat() {
        let part = Part::Text { text: "hello" };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn test_inline_data_part_carries_mime_and_base64() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/png".to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(b"abc"),
            },
        };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["inline_data"]["mime_type"], "image/png");
        assert_eq!(value["inline_data"]["data"], "YWJj");
    }

    #[test]
    fn test_error_body_parses_message() {
        let json = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        let parsed: GeminiError = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "API key not valid");
    }
}
