//! `/api/domains` handlers.

use crate::{
    ApiError, ApiResponse, ApiResult, AppState, AuthenticatedUser, SanitizedJson, client_ip,
    header_email, local_user, success,
};
use axum::{
    extract::{Query, State},
    http::{Extensions, HeaderMap},
};
use chrono::{DateTime, Utc};
use domainforge_core::{
    AiModel, AvailabilityRecord, CallerIdentity, GenerationOptions, GenerationOptionsBuilder,
    SessionWithSuggestions, Tier,
};
use domainforge_error::{DomainforgeError, ValidationError};
use domainforge_generation::MAX_PROMPT_CHARS;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const MAX_KEYWORDS: usize = 20;
const MAX_KEYWORD_CHARS: usize = 64;
const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Body of `POST /api/domains/generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Business description
    pub prompt: String,
    /// Local user id; enables history and keys the quota
    #[serde(default)]
    pub user_id: Option<String>,
    /// Industry
    #[serde(default)]
    pub business_type: Option<String>,
    /// Naming style
    #[serde(default)]
    pub style: Option<String>,
    /// Keywords to weave in
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    /// Explicit model
    #[serde(default)]
    pub model: Option<AiModel>,
    /// Requested tier; honored only when `usage.trust_request_tier` is set
    #[serde(default)]
    pub tier: Option<Tier>,
}

impl GenerateRequest {
    /// Check field shapes, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns a validation error with the problems joined by `"; "`.
    pub fn validate(&self) -> Result<Option<Uuid>, ValidationError> {
        let mut issues = Vec::new();

        let prompt_len = self.prompt.chars().count();
        if self.prompt.trim().is_empty() {
            issues.push("Prompt is required".to_string());
        } else if prompt_len > MAX_PROMPT_CHARS {
            issues.push(format!(
                "Prompt must be at most {} characters",
                MAX_PROMPT_CHARS
            ));
        }

        let user_id = match self.user_id.as_deref() {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    issues.push("Invalid uuid".to_string());
                    None
                }
            },
            None => None,
        };

        if let Some(keywords) = &self.keywords {
            if keywords.len() > MAX_KEYWORDS {
                issues.push(format!("At most {} keywords are allowed", MAX_KEYWORDS));
            }
            if keywords
                .iter()
                .any(|k| k.is_empty() || k.chars().count() > MAX_KEYWORD_CHARS)
            {
                issues.push(format!(
                    "Keywords must be between 1 and {} characters",
                    MAX_KEYWORD_CHARS
                ));
            }
        }

        if issues.is_empty() {
            Ok(user_id)
        } else {
            Err(ValidationError::new(issues.join("; ")))
        }
    }

    fn options(&self) -> GenerationOptions {
        let mut builder = GenerationOptionsBuilder::default();
        builder
            .business_type(self.business_type.clone().filter(|s| !s.is_empty()))
            .style(self.style.clone().filter(|s| !s.is_empty()))
            .keywords(self.keywords.clone().unwrap_or_default())
            .model(self.model);
        builder.build().unwrap_or_default()
    }
}

/// Data of a successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// Suggested names
    pub domains: Vec<String>,
    /// Stored session, when history was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Model that produced the names
    pub model_used: AiModel,
    /// Completion time
    pub generated_at: DateTime<Utc>,
}

/// Generate names for a business description.
#[instrument(skip_all, fields(prompt_len = request.prompt.len()))]
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    SanitizedJson(request): SanitizedJson<GenerateRequest>,
) -> ApiResult<ApiResponse<GenerateResponse>> {
    let user_id = request.validate().map_err(DomainforgeError::from)?;
    let email = header_email(&headers);

    let canonical_user = user_id.map(|id| id.to_string());
    let identity = CallerIdentity::resolve(
        canonical_user.as_deref(),
        email.as_deref(),
        &client_ip(&extensions),
    );

    let tier = match request.tier {
        Some(tier) if state.config.usage.trust_request_tier => tier,
        _ => state.resolver.resolve(user_id, email.as_deref()).await,
    };

    state.ledger.enforce(&identity.to_string(), tier)?;

    let result = state
        .orchestrator
        .generate(&request.prompt, tier, &request.options())
        .await?;

    if result.domains.is_empty() {
        warn!(%identity, "Generation produced no names");
        return Err(ApiError::internal("Failed to generate domains"));
    }

    let session_id = match user_id {
        Some(user_id) => {
            save_history(
                &state,
                user_id,
                &request.prompt,
                &result.domains,
                result.model_used,
            )
            .await
        }
        None => None,
    };

    info!(
        %identity,
        %tier,
        model = %result.model_used,
        count = result.domains.len(),
        "Generated domains"
    );

    Ok(success(GenerateResponse {
        domains: result.domains,
        session_id,
        model_used: result.model_used,
        generated_at: result.generated_at,
    }))
}

async fn save_history(
    state: &AppState,
    user_id: Uuid,
    prompt: &str,
    domains: &[String],
    model: AiModel,
) -> Option<Uuid> {
    let session = match state
        .history
        .create_session(user_id, prompt, model.as_ref())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!(%user_id, error = %e, "Failed to save generation session");
            return None;
        }
    };

    if let Err(e) = state.history.save_suggestions(session.id, domains).await {
        warn!(session_id = %session.id, error = %e, "Failed to save domain suggestions");
    }
    Some(session.id)
}

/// Body of `POST /api/domains/check-availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    /// Name to look up
    pub domain_name: String,
}

/// Look up one domain.
#[instrument(skip_all, fields(domain = %request.domain_name))]
pub async fn check_availability(
    State(state): State<AppState>,
    SanitizedJson(request): SanitizedJson<AvailabilityRequest>,
) -> ApiResult<ApiResponse<AvailabilityRecord>> {
    let record = state.checker.check(&request.domain_name).await?;

    if record.is_confirmed()
        && let Err(e) = state
            .history
            .update_availability(&record.domain_name, record.is_available)
            .await
    {
        warn!(error = %e, "Failed to record availability on stored suggestions");
    }

    Ok(success(record))
}

/// Body of `POST /api/domains/batch-check-availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchAvailabilityRequest {
    /// Names to look up
    #[serde(default)]
    pub domains: Vec<String>,
}

/// Look up up to ten domains concurrently.
#[instrument(skip_all, fields(count = request.domains.len()))]
pub async fn batch_check_availability(
    State(state): State<AppState>,
    SanitizedJson(request): SanitizedJson<BatchAvailabilityRequest>,
) -> ApiResult<ApiResponse<Vec<AvailabilityRecord>>> {
    let records = state.checker.check_batch(&request.domains).await?;
    Ok(success(records))
}

/// Query of `GET /api/domains/history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Page size, 1..=50
    pub limit: Option<i64>,
    /// Sessions to skip
    pub offset: Option<i64>,
}

/// Generation history of the authenticated caller.
#[instrument(skip_all, fields(user = %user.email))]
pub async fn history(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<ApiResponse<Vec<SessionWithSuggestions>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let offset = query.offset.unwrap_or(0);
    if !(1..=domainforge_database::MAX_PAGE_SIZE).contains(&limit) || offset < 0 {
        Err(DomainforgeError::from(ValidationError::new(format!(
            "limit must be between 1 and {} and offset must not be negative",
            domainforge_database::MAX_PAGE_SIZE
        ))))?
    }

    let local = local_user(&state, &user).await?;
    let sessions = state.history.list_sessions(local.id, limit, offset).await?;
    Ok(success(sessions))
}
