//! AI models and the providers that own them.

use serde::{Deserialize, Serialize};

/// LLM vendor behind a model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions (primary)
    OpenAi,
    /// Groq LPU inference (secondary)
    Groq,
}

impl ProviderKind {
    /// Cheapest, fastest model this provider serves.
    pub fn cheapest_model(&self) -> AiModel {
        match self {
            ProviderKind::OpenAi => AiModel::Gpt4oMini,
            ProviderKind::Groq => AiModel::Llama3_8b,
        }
    }
}

/// Model names accepted on the generation API.
///
/// # Examples
///
/// ```
/// use domainforge_core::{AiModel, ProviderKind};
/// use std::str::FromStr;
///
/// let model = AiModel::from_str("llama-3-70b").unwrap();
/// assert_eq!(model.provider(), ProviderKind::Groq);
/// assert_eq!(model.provider_model_id(), "llama3-70b-8192");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum AiModel {
    /// OpenAI GPT-4o mini
    #[serde(rename = "gpt-4o-mini")]
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    /// OpenAI GPT-4o
    #[serde(rename = "gpt-4o")]
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    /// Meta LLaMA 3 70B on Groq
    #[serde(rename = "llama-3-70b")]
    #[strum(serialize = "llama-3-70b")]
    Llama3_70b,
    /// Meta LLaMA 3 8B on Groq
    #[serde(rename = "llama-3-8b")]
    #[strum(serialize = "llama-3-8b")]
    Llama3_8b,
}

impl AiModel {
    /// Provider that serves this model.
    pub fn provider(&self) -> ProviderKind {
        match self {
            AiModel::Gpt4oMini | AiModel::Gpt4o => ProviderKind::OpenAi,
            AiModel::Llama3_70b | AiModel::Llama3_8b => ProviderKind::Groq,
        }
    }

    /// Identifier sent on the wire to the provider.
    pub fn provider_model_id(&self) -> &'static str {
        match self {
            AiModel::Gpt4o => "gpt-4o",
            AiModel::Gpt4oMini => "gpt-4o-mini",
            AiModel::Llama3_70b => "llama3-70b-8192",
            AiModel::Llama3_8b => "llama3-8b-8192",
        }
    }
}
