//! Maps a configured model identifier to exactly one provider family.
//!
//! Resolution order:
//! 1. An explicit `provider:model` prefix (`openai:`, `gemini:`, `google:`)
//! 2. The family prefix table below (case-insensitive)
//! 3. OpenAI, for any name the table does not recognise

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text-generation provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Environment variable(s) that carry this provider's credential.
    pub fn credential_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY/GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("OpenAI"),
            Self::Gemini => f.write_str("Gemini"),
        }
    }
}

/// Family prefixes, checked in order against the lower-cased model name.
const MODEL_FAMILIES: &[(&str, ProviderKind)] = &[
    ("gemini", ProviderKind::Gemini),
    ("models/gemini", ProviderKind::Gemini),
    ("flash-", ProviderKind::Gemini),
    ("gpt-", ProviderKind::OpenAi),
    ("chatgpt", ProviderKind::OpenAi),
    ("o1", ProviderKind::OpenAi),
    ("o3", ProviderKind::OpenAi),
    ("o4", ProviderKind::OpenAi),
];

const EXPLICIT_PREFIXES: &[(&str, ProviderKind)] = &[
    ("openai:", ProviderKind::OpenAi),
    ("gemini:", ProviderKind::Gemini),
    ("google:", ProviderKind::Gemini),
];

/// A resolved provider plus the model name to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

impl ModelSelection {
    /// Resolve a model identifier. Returns `None` for a blank identifier.
    pub fn resolve(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();

        for (prefix, provider) in EXPLICIT_PREFIXES {
            let head_matches = trimmed
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if head_matches {
                let model = trimmed[prefix.len()..].trim();
                if model.is_empty() {
                    return None;
                }
                return Some(Self {
                    provider: *provider,
                    model: model.to_string(),
                });
            }
        }

        let provider = MODEL_FAMILIES
            .iter()
            .find(|(prefix, _)| lowered.starts_with(prefix))
            .map_or(ProviderKind::OpenAi, |(_, provider)| *provider);

        Some(Self {
            provider,
            model: trimmed.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("gemini-2.0-flash", ProviderKind::Gemini ; "gemini default")]
    #[test_case("Gemini-1.5-Pro", ProviderKind::Gemini ; "mixed case")]
    #[test_case("flash-lite", ProviderKind::Gemini ; "flash alias")]
    #[test_case("models/gemini-1.5-flash", ProviderKind::Gemini ; "resource path")]
    #[test_case("gpt-4o-mini", ProviderKind::OpenAi ; "gpt")]
    #[test_case("o3-mini", ProviderKind::OpenAi ; "reasoning model")]
    #[test_case("llama3", ProviderKind::OpenAi ; "unknown falls back to openai")]
    fn test_family_table(model: &str, expected: ProviderKind) {
        let selection = ModelSelection::resolve(model).unwrap();
        assert_eq!(selection.provider, expected);
        assert_eq!(selection.model, model);
    }

    #[test]
    fn test_explicit_prefix_overrides_table() {
        let selection = ModelSelection::resolve("openai:gemini-lookalike").unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenAi);
        assert_eq!(selection.model, "gemini-lookalike");

        let selection = ModelSelection::resolve(" Google: gemini-exp ").unwrap();
        assert_eq!(selection.provider, ProviderKind::Gemini);
        assert_eq!(selection.model, "gemini-exp");
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("gemini:" ; "prefix only")]
    fn test_blank_model_unresolved(model: &str) {
        assert!(ModelSelection::resolve(model).is_none());
    }

    #[test]
    fn test_display_and_credentials() {
        assert_eq!(ProviderKind::OpenAi.to_string(), "OpenAI");
        assert_eq!(ProviderKind::Gemini.credential_env(), "GOOGLE_API_KEY/GEMINI_API_KEY");
    }
}
