//! Row types and conversions to the shared records.

use crate::DatabaseResult;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use domainforge_core::{
    DomainSuggestion, GenerationSession, Subscription, SubscriptionStatus, SubscriptionUpdate,
    SubscriptionUpsert, Tier, User,
};
use domainforge_error::{DatabaseError, DatabaseErrorKind};
use std::str::FromStr;
use uuid::Uuid;

/// Row from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Row from `generation_sessions`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::generation_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub model_used: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::generation_sessions)]
pub struct NewSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub model_used: String,
}

impl From<SessionRow> for GenerationSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            prompt: row.prompt,
            model_used: row.model_used,
            created_at: row.created_at,
        }
    }
}

/// Row from `domain_suggestions`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::domain_suggestions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SuggestionRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub domain_name: String,
    pub is_available: Option<bool>,
    pub checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable suggestion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::domain_suggestions)]
pub struct NewSuggestionRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub domain_name: String,
}

impl From<SuggestionRow> for DomainSuggestion {
    fn from(row: SuggestionRow) -> Self {
        Self {
            id: row.id,
            session_id: row.session_id,
            domain_name: row.domain_name,
            is_available: row.is_available,
            checked_at: row.checked_at,
            created_at: row.created_at,
        }
    }
}

/// Row from `subscriptions`. Tier and status are stored as text.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub tier: String,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DatabaseError;

    fn try_from(row: SubscriptionRow) -> DatabaseResult<Self> {
        let tier = Tier::from_str(&row.tier).map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::CorruptRow {
                table: "subscriptions",
                detail: format!("unknown tier '{}' on {}", row.tier, row.id),
            })
        })?;
        let status = SubscriptionStatus::from_str(&row.status).map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::CorruptRow {
                table: "subscriptions",
                detail: format!("unknown status '{}' on {}", row.status, row.id),
            })
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            tier,
            status,
            current_period_end: row.current_period_end,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable subscription.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct NewSubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub tier: String,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
}

impl From<&SubscriptionUpsert> for NewSubscriptionRow {
    fn from(values: &SubscriptionUpsert) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: values.user_id,
            stripe_customer_id: values.stripe_customer_id.clone(),
            stripe_subscription_id: values.stripe_subscription_id.clone(),
            tier: values.tier.to_string(),
            status: values.status.to_string(),
            current_period_end: values.current_period_end,
        }
    }
}

/// Full overwrite applied when an upsert hits an existing row.
///
/// `None` columns are written as NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(treat_none_as_null = true)]
pub struct SubscriptionOverwrite {
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub tier: String,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SubscriptionUpsert> for SubscriptionOverwrite {
    fn from(values: &SubscriptionUpsert) -> Self {
        Self {
            stripe_customer_id: values.stripe_customer_id.clone(),
            stripe_subscription_id: values.stripe_subscription_id.clone(),
            tier: values.tier.to_string(),
            status: values.status.to_string(),
            current_period_end: values.current_period_end,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update; `None` columns are left alone.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct SubscriptionChangeset {
    pub status: Option<String>,
    pub tier: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SubscriptionUpdate> for SubscriptionChangeset {
    fn from(update: &SubscriptionUpdate) -> Self {
        Self {
            status: update.status.map(|s| s.to_string()),
            tier: update.tier.map(|t| t.to_string()),
            current_period_end: update.current_period_end,
            updated_at: Utc::now(),
        }
    }
}
