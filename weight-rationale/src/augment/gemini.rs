//! Google Gemini `generateContent` generator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AugmentError, ProviderKind, TextGenerator};
use weight_common::util::{sanitize_for_log, truncate_with_ellipsis};

/// Generator backed by `POST {base}/v1beta/models/{model}:generateContent`.
///
/// The key travels in the `x-goog-api-key` header so it never shows up in
/// transport error messages.
pub struct GeminiGenerator {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

// ══════════════════════════════════════════════════════════════════════════════
// API REQUEST/RESPONSE TYPES
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
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

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        let model_name = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/v1beta/{model_name}:generateContent", self.base_url)
    }

    fn request_failed(message: impl std::fmt::Display) -> AugmentError {
        AugmentError::Request {
            provider: ProviderKind::Gemini,
            message: sanitize_for_log(&message.to_string()),
        }
    }
}

/// First non-blank text part across all candidates.
fn first_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .find(|text| !text.trim().is_empty())
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AugmentError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AugmentError::Status {
                provider: ProviderKind::Gemini,
                status: status.as_u16(),
                message: sanitize_for_log(&truncate_with_ellipsis(&body, 300)),
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(Self::request_failed)?;

        if let Some(err) = parsed.error {
            return Err(Self::request_failed(err.message));
        }

        first_text(parsed).ok_or(AugmentError::EmptyResponse {
            provider: ProviderKind::Gemini,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_adds_models_prefix() {
        let generator = GeminiGenerator::new("key", "https://example.test/", 5);
        assert_eq!(
            generator.endpoint("gemini-2.0-flash"),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            generator.endpoint("models/gemini-1.5-pro"),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_first_text_skips_blank_parts() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "  "}]}},
                {"content": {"parts": [{"text": "- Maintain the weight"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_text(parsed).as_deref(), Some("- Maintain the weight"));
    }

    #[test]
    fn test_first_text_none_when_blocked() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(first_text(parsed).is_none());
    }
}
