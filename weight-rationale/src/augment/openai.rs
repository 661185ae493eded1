//! OpenAI chat-completions generator.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::{AugmentError, ProviderKind, TextGenerator};
use weight_common::util::{sanitize_for_log, truncate_with_ellipsis};

/// Generator backed by `POST {base}/v1/chat/completions`.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request_failed(message: impl std::fmt::Display) -> AugmentError {
        AugmentError::Request {
            provider: ProviderKind::OpenAi,
            message: sanitize_for_log(&message.to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AugmentError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(Self::request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AugmentError::Status {
                provider: ProviderKind::OpenAi,
                status: status.as_u16(),
                message: sanitize_for_log(&truncate_with_ellipsis(&body, 300)),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(Self::request_failed)?;

        parsed
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .find(|text| !text.trim().is_empty())
            .ok_or(AugmentError::EmptyResponse {
                provider: ProviderKind::OpenAi,
            })
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
