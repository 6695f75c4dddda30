//! OpenAI chat completions driver using the OpenAI-compatible client.

use crate::openai_compat::{OpenAiCompatibleClient, SamplingParams};
use async_trait::async_trait;
use domainforge_core::{AiModel, ProviderKind};
use domainforge_error::{DomainforgeResult, ProviderError, ProviderErrorKind};
use domainforge_interface::CompletionProvider;
use tracing::instrument;

/// Chat completions endpoint.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI driver, the primary generation provider.
#[derive(Debug, Clone)]
pub struct OpenAiDriver {
    inner: OpenAiCompatibleClient,
}

impl OpenAiDriver {
    /// Sampling parameters used for name generation.
    pub fn sampling_params() -> SamplingParams {
        SamplingParams {
            frequency_penalty: Some(0.5),
            presence_penalty: Some(0.3),
            ..SamplingParams::default()
        }
    }

    /// Creates a new OpenAI driver.
    ///
    /// Reads the API key from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not set or empty.
    #[instrument]
    pub fn new() -> DomainforgeResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(
                    "openai",
                    ProviderErrorKind::MissingApiKey("OPENAI_API_KEY".to_string()),
                )
            })?;

        Ok(Self::with_api_key(api_key))
    }

    /// Creates a new OpenAI driver with an explicit API key.
    #[instrument(skip(api_key))]
    pub fn with_api_key(api_key: String) -> Self {
        let inner = OpenAiCompatibleClient::new(
            api_key,
            OPENAI_ENDPOINT.to_string(),
            "openai",
            Self::sampling_params(),
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

    /// Wire model id for a requested model; anything but GPT-4o maps to GPT-4o mini.
    pub fn model_id(model: AiModel) -> &'static str {
        match model {
            AiModel::Gpt4o => AiModel::Gpt4o.provider_model_id(),
            _ => AiModel::Gpt4oMini.provider_model_id(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiDriver {
    #[instrument(skip(self, system, user), fields(provider = "openai", model = %model))]
    async fn complete(
        &self,
        system: &str,
        user: &str,
        model: AiModel,
    ) -> DomainforgeResult<String> {
        self.inner.complete(Self::model_id(model), system, user).await
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
