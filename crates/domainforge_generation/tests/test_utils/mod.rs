//! Mock completion providers.

#![allow(dead_code)]

use async_trait::async_trait;
use domainforge_core::{AiModel, ProviderKind};
use domainforge_error::{DomainforgeResult, ProviderError, ProviderErrorKind};
use domainforge_interface::CompletionProvider;
use domainforge_rate_limit::{TierConfig, TiersConfig, UsageLimit};
use parking_lot::Mutex;

/// Provider that returns a canned reply or fails, recording each call.
pub struct MockProvider {
    kind: ProviderKind,
    reply: Option<String>,
    calls: Mutex<Vec<(String, String, AiModel)>>,
}

impl MockProvider {
    pub fn replying(kind: ProviderKind, reply: &str) -> Self {
        Self {
            kind,
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(kind: ProviderKind) -> Self {
        Self {
            kind,
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn models_called(&self) -> Vec<AiModel> {
        self.calls.lock().iter().map(|(_, _, m)| *m).collect()
    }

    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.calls
            .lock()
            .last()
            .map(|(s, u, _)| (s.clone(), u.clone()))
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        model: AiModel,
    ) -> DomainforgeResult<String> {
        self.calls
            .lock()
            .push((system.to_string(), user.to_string(), model));
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::new(
                self.provider_name(),
                ProviderErrorKind::Api {
                    status: 500,
                    message: "boom".to_string(),
                },
            ))?,
        }
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn provider_name(&self) -> &'static str {
        match self.kind {
            ProviderKind::OpenAi => "mock-openai",
            ProviderKind::Groq => "mock-groq",
        }
    }
}

pub fn default_tiers() -> TiersConfig {
    TiersConfig {
        free: TierConfig {
            limit: UsageLimit::Limited(2),
            model: AiModel::Llama3_8b,
        },
        mid: TierConfig {
            limit: UsageLimit::Limited(100),
            model: AiModel::Gpt4oMini,
        },
        premium: TierConfig {
            limit: UsageLimit::Unlimited,
            model: AiModel::Gpt4o,
        },
    }
}
