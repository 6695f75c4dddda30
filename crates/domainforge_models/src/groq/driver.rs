//! Groq AI LPU Inference API driver using the OpenAI-compatible client.

use crate::openai_compat::{OpenAiCompatibleClient, SamplingParams};
use async_trait::async_trait;
use domainforge_core::{AiModel, ProviderKind};
use domainforge_error::{DomainforgeResult, ProviderError, ProviderErrorKind};
use domainforge_interface::CompletionProvider;
use tracing::instrument;

/// Chat completions endpoint.
pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq AI LPU Inference API driver, the secondary generation provider.
#[derive(Debug, Clone)]
pub struct GroqDriver {
    inner: OpenAiCompatibleClient,
}

impl GroqDriver {
    /// Creates a new Groq driver.
    ///
    /// Reads API token from `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if API token is not set.
    #[instrument]
    pub fn new() -> DomainforgeResult<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(
                    "groq",
                    ProviderErrorKind::MissingApiKey("GROQ_API_KEY".to_string()),
                )
            })?;

        Ok(Self::with_api_key(api_key))
    }

    /// Creates a new Groq driver with explicit API key.
    #[instrument(skip(api_key))]
    pub fn with_api_key(api_key: String) -> Self {
        let inner = OpenAiCompatibleClient::new(
            api_key,
            GROQ_ENDPOINT.to_string(),
            "groq",
            SamplingParams::default(),
        );
        Self { inner }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.inner = self.inner.with_http_client(client);
        self
    }

    /// Underlying protocol client.
    pub fn client(&self) -> &OpenAiCompatibleClient {
        &self.inner
    }

    /// Wire model id; anything but LLaMA 3 70B maps to the 8B model.
    pub fn model_id(model: AiModel) -> &'static str {
        match model {
            AiModel::Llama3_70b => AiModel::Llama3_70b.provider_model_id(),
            _ => AiModel::Llama3_8b.provider_model_id(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GroqDriver {
    #[instrument(skip(self, system, user), fields(provider = "groq", model = %model))]
    async fn complete(
        &self,
        system: &str,
        user: &str,
        model: AiModel,
    ) -> DomainforgeResult<String> {
        self.inner.complete(Self::model_id(model), system, user).await
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
