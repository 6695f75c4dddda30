//! Users, generation sessions and stored suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: Uuid,
    /// Lower-cased unique email
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One generation call recorded for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSession {
    /// Primary key
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Business description sent to the model
    pub prompt: String,
    /// Model identifier that answered
    pub model_used: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A single suggested name within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSuggestion {
    /// Primary key
    pub id: Uuid,
    /// Owning session
    pub session_id: Uuid,
    /// Lower-cased name
    pub domain_name: String,
    /// Last known availability
    pub is_available: Option<bool>,
    /// When availability was last checked
    pub checked_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A session with its suggestions, as returned by history queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWithSuggestions {
    /// The session
    #[serde(flatten)]
    pub session: GenerationSession,
    /// Suggestions produced in it
    pub domain_suggestions: Vec<DomainSuggestion>,
}
