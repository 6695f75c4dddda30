//! Provider selection and fallback.

use crate::{parse_domain_suggestions, system_prompt, user_prompt};
use chrono::Utc;
use domainforge_core::{AiModel, GenerationOptions, GenerationResult, ProviderKind, Tier};
use domainforge_error::{DomainforgeResult, NotConfiguredError, ValidationError};
use domainforge_interface::CompletionProvider;
use domainforge_rate_limit::TiersConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Longest accepted business description, in characters.
pub const MAX_PROMPT_CHARS: usize = 500;

/// One provider call in an attempt plan.
#[derive(Clone)]
pub struct Attempt {
    provider: Arc<dyn CompletionProvider>,
    model: AiModel,
}

impl Attempt {
    /// Provider to call.
    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    /// Model to request.
    pub fn model(&self) -> AiModel {
        self.model
    }
}

impl std::fmt::Debug for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attempt")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .finish()
    }
}

/// Check a business description before any provider is involved.
///
/// # Errors
///
/// Fails when the trimmed prompt is empty or longer than 500 characters.
pub fn validate_prompt(prompt: &str) -> DomainforgeResult<()> {
    if prompt.trim().is_empty() {
        Err(ValidationError::new("Prompt is required"))?
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        Err(ValidationError::new(format!(
            "Prompt must be at most {} characters",
            MAX_PROMPT_CHARS
        )))?
    }
    Ok(())
}

/// Turns a business description into names using the configured providers.
///
/// The primary provider (OpenAI) serves `gpt-*` models, the secondary (Groq)
/// serves `llama-*` models. A failed primary call is retried once on the
/// secondary's cheapest model when the secondary is configured.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    primary: Option<Arc<dyn CompletionProvider>>,
    secondary: Option<Arc<dyn CompletionProvider>>,
    tiers: TiersConfig,
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("primary", &self.primary.as_ref().map(|p| p.provider_name()))
            .field("secondary", &self.secondary.as_ref().map(|p| p.provider_name()))
            .finish()
    }
}

impl GenerationOrchestrator {
    /// Create an orchestrator over the available providers.
    pub fn new(
        primary: Option<Arc<dyn CompletionProvider>>,
        secondary: Option<Arc<dyn CompletionProvider>>,
        tiers: TiersConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            tiers,
        }
    }

    /// Whether any provider is configured.
    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// Whether the primary provider is configured.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Model used when the request names none.
    pub fn model_for_tier(&self, tier: Tier) -> AiModel {
        self.tiers.model(tier)
    }

    /// Ordered provider calls for a requested model.
    ///
    /// # Errors
    ///
    /// Returns a not-configured error when no provider is available.
    pub fn plan(&self, model: AiModel) -> DomainforgeResult<Vec<Attempt>> {
        if !self.is_configured() {
            Err(NotConfiguredError::new("No AI provider configured"))?
        }

        let attempt = |provider: &Arc<dyn CompletionProvider>, model| Attempt {
            provider: Arc::clone(provider),
            model,
        };

        let plan = match model.provider() {
            ProviderKind::Groq => match (&self.secondary, &self.primary) {
                (Some(secondary), _) => vec![attempt(secondary, model)],
                (None, Some(primary)) => {
                    warn!(
                        requested = %model,
                        "Secondary provider not configured, falling back to primary"
                    );
                    vec![attempt(primary, ProviderKind::OpenAi.cheapest_model())]
                }
                (None, None) => Vec::new(),
            },
            ProviderKind::OpenAi => {
                let mut plan = Vec::with_capacity(2);
                if let Some(primary) = &self.primary {
                    plan.push(attempt(primary, model));
                }
                if let Some(secondary) = &self.secondary {
                    plan.push(attempt(secondary, ProviderKind::Groq.cheapest_model()));
                }
                plan
            }
        };

        Ok(plan)
    }

    /// Generate up to five names for a business description.
    ///
    /// # Errors
    ///
    /// - Validation error for an empty or over-long prompt (no provider is called)
    /// - Not-configured error when no provider exists
    /// - The last provider error when every attempt fails
    #[instrument(skip(self, prompt, options), fields(tier = %tier, prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        tier: Tier,
        options: &GenerationOptions,
    ) -> DomainforgeResult<GenerationResult> {
        validate_prompt(prompt)?;

        let requested = options.model().unwrap_or_else(|| self.model_for_tier(tier));
        let plan = self.plan(requested)?;

        let system = system_prompt(options);
        let user = user_prompt(prompt, options);

        let mut last_error = None;
        for (index, attempt) in plan.iter().enumerate() {
            if index > 0 {
                warn!(
                    provider = attempt.provider.provider_name(),
                    model = %attempt.model,
                    "Primary generation failed, retrying on secondary provider"
                );
            }
            debug!(
                provider = attempt.provider.provider_name(),
                model = %attempt.model,
                "Calling provider"
            );

            match attempt.provider.complete(&system, &user, attempt.model).await {
                Ok(text) => {
                    let domains = parse_domain_suggestions(&text);
                    info!(
                        provider = attempt.provider.provider_name(),
                        model = %attempt.model,
                        count = domains.len(),
                        "Generated domain suggestions"
                    );
                    return Ok(GenerationResult {
                        domains,
                        model_used: attempt.model,
                        generated_at: Utc::now(),
                    });
                }
                Err(e) => {
                    warn!(
                        provider = attempt.provider.provider_name(),
                        error = %e,
                        "Provider call failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Err(NotConfiguredError::new("No AI provider configured"))?,
        }
    }
}
