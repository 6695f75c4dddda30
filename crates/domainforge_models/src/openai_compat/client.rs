use super::{ChatCompletionRequest, ChatCompletionResponse, SamplingParams};
use domainforge_error::{DomainforgeResult, ProviderError, ProviderErrorKind};
use reqwest::Client;
use tracing::{debug, error, instrument};

/// HTTP client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    endpoint: String,
    provider: &'static str,
    params: SamplingParams,
}

impl OpenAiCompatibleClient {
    /// Create a client for `endpoint` authenticated with `api_key`.
    pub fn new(
        api_key: String,
        endpoint: String,
        provider: &'static str,
        params: SamplingParams,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint,
            provider,
            params,
        }
    }

    /// Replace the HTTP client (e.g. one with a request timeout).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Replace the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Provider name used in errors and logs.
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sampling parameters sent with each request.
    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    /// Build the request body for a prompt pair.
    pub fn build_request(&self, model: &str, system: &str, user: &str) -> ChatCompletionRequest {
        ChatCompletionRequest::new(model, system, user, &self.params)
    }

    fn error(&self, kind: ProviderErrorKind) -> ProviderError {
        ProviderError::new(self.provider, kind)
    }

    /// Send a completion request and return the first choice's text.
    #[instrument(skip(self, system, user), fields(provider = self.provider))]
    pub async fn complete(&self, model: &str, system: &str, user: &str) -> DomainforgeResult<String> {
        let request = self.build_request(model, system, user);
        debug!(endpoint = %self.endpoint, "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Request failed");
                self.error(ProviderErrorKind::Http(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Provider returned error");
            let kind = if status.as_u16() == 429 {
                ProviderErrorKind::RateLimit
            } else {
                ProviderErrorKind::Api {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(self.error(kind).into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse response");
            self.error(ProviderErrorKind::ResponseParsing(e.to_string()))
        })?;

        let content = body
            .first_content()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| self.error(ProviderErrorKind::EmptyCompletion))?;

        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion successful"
            );
        }
        Ok(content.to_string())
    }
}
