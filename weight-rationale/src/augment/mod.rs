//! Optional language-model augmentation.
//!
//! Every report works without this layer. When a caller opts in, the
//! [`AugmentationLayer`] resolves the model to a provider, sends one prompt,
//! and turns the reply into bullet points. Any failure comes back as
//! [`AugmentOutcome::Declined`] and the caller keeps its rule-based output.

mod gemini;
mod openai;
pub mod prompts;
mod selector;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use weight_common::config::LlmConfig;

pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;
pub use selector::{ModelSelection, ProviderKind};

// ============================================================================
// Errors
// ============================================================================

/// Why an augmentation attempt produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    #[error("No model provided")]
    NoModel,

    #[error("{provider} client unavailable or {} missing", .provider.credential_env())]
    Unavailable { provider: ProviderKind },

    #[error("{provider} request failed: {message}")]
    Request {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} request failed: HTTP {status}: {message}")]
    Status {
        provider: ProviderKind,
        status: u16,
        message: String,
    },

    #[error("{provider} response contained no text output")]
    EmptyResponse { provider: ProviderKind },
}

// ============================================================================
// Provider Trait
// ============================================================================

/// A text-generation backend for one provider family.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send one prompt and return the raw reply text.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AugmentError>;
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of one augmentation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AugmentOutcome {
    Generated {
        points: Vec<String>,
        provider: ProviderKind,
        model: String,
    },
    Declined {
        reason: String,
    },
}

impl AugmentOutcome {
    fn declined(err: &AugmentError) -> Self {
        Self::Declined {
            reason: err.to_string(),
        }
    }

    /// The generated points, if any.
    pub fn points(&self) -> Option<&[String]> {
        match self {
            Self::Generated { points, .. } => Some(points),
            Self::Declined { .. } => None,
        }
    }

    /// Collapse into the status attached to a report.
    pub fn status(&self) -> AugmentationStatus {
        match self {
            Self::Generated { provider, model, .. } => AugmentationStatus::Generated {
                provider: *provider,
                model: model.clone(),
            },
            Self::Declined { reason } => AugmentationStatus::Declined {
                reason: reason.clone(),
            },
        }
    }
}

/// Per-report record of whether augmentation ran and how it went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AugmentationStatus {
    #[default]
    NotRequested,
    Generated {
        provider: ProviderKind,
        model: String,
    },
    Declined {
        reason: String,
    },
}

impl AugmentationStatus {
    pub fn generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }

    /// Reason for a declined attempt.
    pub fn declined_reason(&self) -> Option<&str> {
        match self {
            Self::Declined { reason } => Some(reason),
            _ => None,
        }
    }
}

// ============================================================================
// Augmentation Layer
// ============================================================================

/// Routes prompts to the provider that owns the requested model.
#[derive(Clone)]
pub struct AugmentationLayer {
    default_model: String,
    generators: HashMap<ProviderKind, Arc<dyn TextGenerator>>,
}

impl std::fmt::Debug for AugmentationLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AugmentationLayer")
            .field("default_model", &self.default_model)
            .field("providers", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AugmentationLayer {
    /// A layer with no providers registered. Every attempt is declined.
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            generators: HashMap::new(),
        }
    }

    /// Register a provider for each credential present in the config.
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut layer = Self::new(config.default_model.clone());

        if let Some(key) = non_blank(config.openai_api_key.as_deref()) {
            layer = layer.with_generator(Arc::new(OpenAiGenerator::new(
                key,
                config.openai_base_url.clone(),
                config.timeout_secs,
            )));
        }
        if let Some(key) = non_blank(config.google_api_key.as_deref()) {
            layer = layer.with_generator(Arc::new(GeminiGenerator::new(
                key,
                config.gemini_base_url.clone(),
                config.timeout_secs,
            )));
        }

        tracing::debug!(
            default_model = %layer.default_model,
            openai = layer.supports(ProviderKind::OpenAi),
            gemini = layer.supports(ProviderKind::Gemini),
            "Augmentation layer configured"
        );
        layer
    }

    /// Register (or replace) the generator for its provider family.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generators.insert(generator.kind(), generator);
        self
    }

    /// True when at least one provider is registered.
    pub fn is_available(&self) -> bool {
        !self.generators.is_empty()
    }

    pub fn supports(&self, kind: ProviderKind) -> bool {
        self.generators.contains_key(&kind)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Generate up to `max_points` bullets for `prompt`.
    ///
    /// `model` overrides the default model when it is set and non-blank.
    pub async fn generate_bullets(
        &self,
        prompt: &str,
        max_points: usize,
        model: Option<&str>,
    ) -> AugmentOutcome {
        let requested = non_blank(model).unwrap_or(&self.default_model);

        let Some(selection) = ModelSelection::resolve(requested) else {
            return self.decline(AugmentError::NoModel);
        };

        let Some(generator) = self.generators.get(&selection.provider) else {
            return self.decline(AugmentError::Unavailable {
                provider: selection.provider,
            });
        };

        tracing::debug!(
            provider = %selection.provider,
            model = %selection.model,
            prompt_chars = prompt.chars().count(),
            "Requesting augmentation"
        );

        let raw = match generator.generate(prompt, &selection.model).await {
            Ok(raw) => raw,
            Err(err) => return self.decline(err),
        };

        let points = normalize_bullets(&raw, max_points);
        if points.is_empty() {
            return self.decline(AugmentError::EmptyResponse {
                provider: selection.provider,
            });
        }

        tracing::info!(
            provider = %selection.provider,
            model = %selection.model,
            points = points.len(),
            "Augmentation generated"
        );

        AugmentOutcome::Generated {
            points,
            provider: selection.provider,
            model: selection.model,
        }
    }

    fn decline(&self, err: AugmentError) -> AugmentOutcome {
        tracing::warn!(reason = %err, "Augmentation declined");
        AugmentOutcome::declined(&err)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Split reply text into bullets: trim, drop list markers, skip blanks, cap.
pub fn normalize_bullets(raw: &str, max_points: usize) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim().trim_start_matches(['-', '•', '*']).trim())
        .filter(|line| !line.is_empty())
        .take(max_points)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CannedGenerator {
        kind: ProviderKind,
        reply: Result<String, AugmentError>,
        calls: AtomicU32,
    }

    impl CannedGenerator {
        fn ok(kind: ProviderKind, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                kind,
                reply: Ok(reply.to_string()),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, AugmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[test]
    fn test_normalize_bullets() {
        let raw = "- First point\n\n• Second point\n  * Third point  \n--\nFourth\nFifth";
        assert_eq!(
            normalize_bullets(raw, 4),
            vec!["First point", "Second point", "Third point", "Fourth"]
        );
        assert!(normalize_bullets("\n - \n", 3).is_empty());
        assert!(normalize_bullets("- one", 0).is_empty());
    }

    #[tokio::test]
    async fn test_routes_to_matching_provider() {
        let gemini = CannedGenerator::ok(ProviderKind::Gemini, "- Hold steady\n- Watch margins");
        let openai = CannedGenerator::ok(ProviderKind::OpenAi, "- wrong provider");
        let layer = AugmentationLayer::new("gemini-2.0-flash")
            .with_generator(gemini.clone())
            .with_generator(openai.clone());

        let outcome = layer.generate_bullets("prompt", 6, None).await;
        assert_eq!(
            outcome,
            AugmentOutcome::Generated {
                points: vec!["Hold steady".into(), "Watch margins".into()],
                provider: ProviderKind::Gemini,
                model: "gemini-2.0-flash".into(),
            }
        );
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 1);
        assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_override() {
        let openai = CannedGenerator::ok(ProviderKind::OpenAi, "- Trim");
        let layer = AugmentationLayer::new("gemini-2.0-flash").with_generator(openai);
        let outcome = layer.generate_bullets("prompt", 6, Some("gpt-4o-mini")).await;
        assert!(matches!(
            outcome,
            AugmentOutcome::Generated { provider: ProviderKind::OpenAi, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_declined() {
        let layer = AugmentationLayer::new("gemini-2.0-flash");
        assert!(!layer.is_available());
        let outcome = layer.generate_bullets("prompt", 6, None).await;
        assert_eq!(
            outcome,
            AugmentOutcome::Declined {
                reason: "Gemini client unavailable or GOOGLE_API_KEY/GEMINI_API_KEY missing".into()
            }
        );
    }

    #[tokio::test]
    async fn test_blank_default_model_declined() {
        let layer = AugmentationLayer::new("  ");
        let outcome = layer.generate_bullets("prompt", 6, Some("")).await;
        assert_eq!(outcome.status().declined_reason(), Some("No model provided"));
    }

    #[tokio::test]
    async fn test_provider_error_declined() {
        let failing = Arc::new(CannedGenerator {
            kind: ProviderKind::OpenAi,
            reply: Err(AugmentError::Request {
                provider: ProviderKind::OpenAi,
                message: "connection reset".into(),
            }),
            calls: AtomicU32::new(0),
        });
        let layer = AugmentationLayer::new("gpt-4o").with_generator(failing);
        let outcome = layer.generate_bullets("prompt", 6, None).await;
        assert_eq!(
            outcome.status().declined_reason(),
            Some("OpenAI request failed: connection reset")
        );
        assert!(outcome.points().is_none());
    }

    #[tokio::test]
    async fn test_blank_reply_declined() {
        let gemini = CannedGenerator::ok(ProviderKind::Gemini, "\n  - \n");
        let layer = AugmentationLayer::new("gemini-pro").with_generator(gemini);
        let outcome = layer.generate_bullets("prompt", 6, None).await;
        assert_eq!(
            outcome.status().declined_reason(),
            Some("Gemini response contained no text output")
        );
    }

    #[test]
    fn test_from_config_requires_keys() {
        let mut config = LlmConfig::default();
        config.openai_api_key = Some("   ".into());
        config.google_api_key = None;
        assert!(!AugmentationLayer::from_config(&config).is_available());

        config.google_api_key = Some("AIza-test".into());
        let layer = AugmentationLayer::from_config(&config);
        assert!(layer.supports(ProviderKind::Gemini));
        assert!(!layer.supports(ProviderKind::OpenAi));
    }

    #[test]
    fn test_status_serialization() {
        let status = AugmentationStatus::Generated {
            provider: ProviderKind::Gemini,
            model: "gemini-2.0-flash".into(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "generated");
        assert_eq!(json["provider"], "gemini");
        assert!(!AugmentationStatus::NotRequested.generated());
    }
}
