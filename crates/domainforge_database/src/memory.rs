//! In-memory store for tests and database-less runs.

use crate::{filter_suggestions, validate_page};
use async_trait::async_trait;
use chrono::Utc;
use domainforge_core::{
    DomainSuggestion, GenerationSession, SessionWithSuggestions, Subscription, SubscriptionStatus,
    SubscriptionUpdate, SubscriptionUpsert, User,
};
use domainforge_error::{DatabaseError, DatabaseErrorKind, DomainforgeResult};
use domainforge_interface::{HistoryRepository, StoreHealth, SubscriptionRepository, UserRepository};
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<GenerationSession>,
    suggestions: Vec<DomainSuggestion>,
    subscriptions: Vec<Subscription>,
}

impl Tables {
    /// Newest matching subscription; later inserts win ties.
    fn latest_subscription<P>(&self, predicate: P) -> Option<Subscription>
    where
        P: Fn(&Subscription) -> bool,
    {
        self.subscriptions
            .iter()
            .filter(|s| predicate(s))
            .max_by_key(|s| s.created_at)
            .cloned()
    }
}

/// Repositories held in process memory.
///
/// Behaves like [`PgStore`](crate::PgStore) for every repository operation,
/// including input filtering and ordering.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subscription row as-is.
    pub fn insert_subscription(&self, subscription: Subscription) {
        self.tables.lock().subscriptions.push(subscription);
    }

    /// Snapshot of every stored subscription.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.tables.lock().subscriptions.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> DomainforgeResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, email: &str, name: Option<&str>) -> DomainforgeResult<User> {
        let email = email.to_lowercase();
        let mut tables = self.tables.lock();
        if tables.users.iter().any(|u| u.email == email) {
            Err(DatabaseError::new(DatabaseErrorKind::Duplicate(format!(
                "user with email {}",
                email
            ))))?
        }
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: name.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        prompt: &str,
        model_used: &str,
    ) -> DomainforgeResult<GenerationSession> {
        let session = GenerationSession {
            id: Uuid::new_v4(),
            user_id,
            prompt: prompt.to_string(),
            model_used: model_used.to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().sessions.push(session.clone());
        Ok(session)
    }

    async fn save_suggestions(
        &self,
        session_id: Uuid,
        names: &[String],
    ) -> DomainforgeResult<Vec<DomainSuggestion>> {
        let now = Utc::now();
        let saved: Vec<DomainSuggestion> = filter_suggestions(names)?
            .into_iter()
            .map(|domain_name| DomainSuggestion {
                id: Uuid::new_v4(),
                session_id,
                domain_name,
                is_available: None,
                checked_at: None,
                created_at: now,
            })
            .collect();
        self.tables.lock().suggestions.extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn update_availability(
        &self,
        domain: &str,
        available: bool,
    ) -> DomainforgeResult<usize> {
        let domain = domain.to_lowercase();
        let now = Utc::now();
        let mut tables = self.tables.lock();
        let mut touched = 0;
        for suggestion in tables
            .suggestions
            .iter_mut()
            .filter(|s| s.domain_name == domain)
        {
            suggestion.is_available = Some(available);
            suggestion.checked_at = Some(now);
            touched += 1;
        }
        Ok(touched)
    }

    async fn list_sessions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DomainforgeResult<Vec<SessionWithSuggestions>> {
        validate_page(limit, offset)?;
        let tables = self.tables.lock();

        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut sessions: Vec<&GenerationSession> = tables
            .sessions
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(sessions
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|session| SessionWithSuggestions {
                session: session.clone(),
                domain_suggestions: tables
                    .suggestions
                    .iter()
                    .filter(|s| s.session_id == session.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn latest_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>> {
        Ok(self
            .tables
            .lock()
            .latest_subscription(|s| s.user_id == user_id))
    }

    async fn latest_for_email(&self, email: &str) -> DomainforgeResult<Option<Subscription>> {
        let email = email.to_lowercase();
        let tables = self.tables.lock();
        let Some(user_id) = tables.users.iter().find(|u| u.email == email).map(|u| u.id) else {
            return Ok(None);
        };
        Ok(tables.latest_subscription(|s| s.user_id == user_id))
    }

    async fn find_by_stripe_id(
        &self,
        stripe_id: &str,
    ) -> DomainforgeResult<Option<Subscription>> {
        Ok(self
            .tables
            .lock()
            .subscriptions
            .iter()
            .find(|s| s.stripe_subscription_id.as_deref() == Some(stripe_id))
            .cloned())
    }

    async fn active_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>> {
        Ok(self
            .tables
            .lock()
            .latest_subscription(|s| s.user_id == user_id && s.status.is_current()))
    }

    async fn canceled_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>> {
        Ok(self.tables.lock().latest_subscription(|s| {
            s.user_id == user_id && s.status == SubscriptionStatus::Canceled
        }))
    }

    async fn upsert_for_user(&self, values: SubscriptionUpsert) -> DomainforgeResult<Subscription> {
        let now = Utc::now();
        let mut tables = self.tables.lock();
        let existing = tables
            .latest_subscription(|s| s.user_id == values.user_id)
            .map(|s| s.id);

        if let Some(id) = existing
            && let Some(row) = tables.subscriptions.iter_mut().find(|s| s.id == id)
        {
            row.stripe_customer_id = values.stripe_customer_id;
            row.stripe_subscription_id = values.stripe_subscription_id;
            row.tier = values.tier;
            row.status = values.status;
            row.current_period_end = values.current_period_end;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = Subscription {
            id: Uuid::new_v4(),
            user_id: values.user_id,
            stripe_customer_id: values.stripe_customer_id,
            stripe_subscription_id: values.stripe_subscription_id,
            tier: values.tier,
            status: values.status,
            current_period_end: values.current_period_end,
            created_at: now,
            updated_at: now,
        };
        tables.subscriptions.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        update: SubscriptionUpdate,
    ) -> DomainforgeResult<Subscription> {
        let mut tables = self.tables.lock();
        let Some(row) = tables.subscriptions.iter_mut().find(|s| s.id == id) else {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound).into());
        };
        if let Some(status) = update.status {
            row.status = status;
        }
        if let Some(tier) = update.tier {
            row.tier = tier;
        }
        if let Some(end) = update.current_period_end {
            row.current_period_end = Some(end);
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> DomainforgeResult<()> {
        Ok(())
    }
}
