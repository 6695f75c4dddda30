//! Generation options and results.

use crate::AiModel;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Optional knobs for a generation call.
///
/// # Examples
///
/// ```
/// use domainforge_core::{AiModel, GenerationOptionsBuilder};
///
/// let options = GenerationOptionsBuilder::default()
///     .business_type(Some("bakery".to_string()))
///     .keywords(vec!["bread".to_string()])
///     .model(Some(AiModel::Gpt4o))
///     .build()
///     .unwrap();
///
/// assert_eq!(options.business_type().as_deref(), Some("bakery"));
/// assert!(options.style().is_none());
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder,
)]
pub struct GenerationOptions {
    /// Industry of the business
    #[builder(default)]
    #[serde(default)]
    business_type: Option<String>,

    /// Naming style preference
    #[builder(default)]
    #[serde(default)]
    style: Option<String>,

    /// Keywords the names should consider
    #[builder(default)]
    #[serde(default)]
    keywords: Vec<String>,

    /// Explicit model overriding the tier default
    #[builder(default)]
    #[serde(default)]
    model: Option<AiModel>,
}

/// Parsed names returned by the generation orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// At most five candidate names
    pub domains: Vec<String>,
    /// Model that produced the names
    pub model_used: AiModel,
    /// Completion timestamp
    pub generated_at: DateTime<Utc>,
}
