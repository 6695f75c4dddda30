//! PostgreSQL store.

use crate::models::{
    NewSessionRow, NewSubscriptionRow, NewSuggestionRow, NewUserRow, SessionRow,
    SubscriptionChangeset, SubscriptionOverwrite, SubscriptionRow, SuggestionRow, UserRow,
};
use crate::schema::{domain_suggestions, generation_sessions, subscriptions, users};
use crate::{
    DEFAULT_POOL_SIZE, DatabaseResult, PgPool, establish_pool, filter_suggestions, run_migrations,
    validate_page,
};
use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use domainforge_core::{
    DomainSuggestion, GenerationSession, SessionWithSuggestions, Subscription, SubscriptionStatus,
    SubscriptionUpdate, SubscriptionUpsert, User,
};
use domainforge_error::{DatabaseError, DatabaseErrorKind, DomainforgeResult};
use domainforge_interface::{HistoryRepository, StoreHealth, SubscriptionRepository, UserRepository};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Repositories backed by PostgreSQL through an r2d2 pool.
///
/// Diesel is synchronous, so every query runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with the default pool size.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the pool cannot be built.
    pub fn connect(database_url: &str) -> DatabaseResult<Self> {
        Ok(Self::new(establish_pool(database_url, DEFAULT_POOL_SIZE)?))
    }

    /// Connect using the `DATABASE_URL` environment variable.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the variable is unset or the pool cannot
    /// be built.
    pub fn from_env() -> DatabaseResult<Self> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Connection(
                "DATABASE_URL environment variable not set".to_string(),
            ))
        })?;
        Self::connect(&database_url)
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a migration error if any migration fails.
    pub fn migrate(&self) -> DatabaseResult<()> {
        run_migrations(&self.pool)
    }

    async fn with_conn<T, F>(&self, f: F) -> DomainforgeResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || -> DatabaseResult<T> {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Query(format!("Task join error: {}", e)))
        })?;
        Ok(result?)
    }
}

fn to_subscription(row: Option<SubscriptionRow>) -> DatabaseResult<Option<Subscription>> {
    row.map(Subscription::try_from).transpose()
}

#[async_trait]
impl UserRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> DomainforgeResult<Option<User>> {
        let email = email.to_lowercase();
        self.with_conn(move |conn| {
            let row = users::table
                .filter(users::email.eq(&email))
                .select(UserRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(User::from))
        })
        .await
    }

    #[instrument(skip(self, name))]
    async fn create_user(&self, email: &str, name: Option<&str>) -> DomainforgeResult<User> {
        let new_user = NewUserRow {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            name: name.map(str::to_string),
        };
        self.with_conn(move |conn| {
            let row = diesel::insert_into(users::table)
                .values(&new_user)
                .returning(UserRow::as_returning())
                .get_result(conn)?;
            debug!(user_id = %row.id, "Created user");
            Ok(User::from(row))
        })
        .await
    }
}

#[async_trait]
impl HistoryRepository for PgStore {
    #[instrument(skip(self, prompt))]
    async fn create_session(
        &self,
        user_id: Uuid,
        prompt: &str,
        model_used: &str,
    ) -> DomainforgeResult<GenerationSession> {
        let new_session = NewSessionRow {
            id: Uuid::new_v4(),
            user_id,
            prompt: prompt.to_string(),
            model_used: model_used.to_string(),
        };
        self.with_conn(move |conn| {
            let row = diesel::insert_into(generation_sessions::table)
                .values(&new_session)
                .returning(SessionRow::as_returning())
                .get_result(conn)?;
            Ok(GenerationSession::from(row))
        })
        .await
    }

    #[instrument(skip(self, names), fields(count = names.len()))]
    async fn save_suggestions(
        &self,
        session_id: Uuid,
        names: &[String],
    ) -> DomainforgeResult<Vec<DomainSuggestion>> {
        let rows: Vec<NewSuggestionRow> = filter_suggestions(names)?
            .into_iter()
            .map(|domain_name| NewSuggestionRow {
                id: Uuid::new_v4(),
                session_id,
                domain_name,
            })
            .collect();
        self.with_conn(move |conn| {
            let saved = diesel::insert_into(domain_suggestions::table)
                .values(&rows)
                .returning(SuggestionRow::as_returning())
                .get_results(conn)?;
            Ok(saved.into_iter().map(DomainSuggestion::from).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_availability(
        &self,
        domain: &str,
        available: bool,
    ) -> DomainforgeResult<usize> {
        let domain = domain.to_lowercase();
        self.with_conn(move |conn| {
            let touched = diesel::update(
                domain_suggestions::table.filter(domain_suggestions::domain_name.eq(&domain)),
            )
            .set((
                domain_suggestions::is_available.eq(available),
                domain_suggestions::checked_at.eq(Utc::now()),
            ))
            .execute(conn)?;
            Ok(touched)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_sessions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DomainforgeResult<Vec<SessionWithSuggestions>> {
        validate_page(limit, offset)?;
        self.with_conn(move |conn| {
            let sessions = generation_sessions::table
                .filter(generation_sessions::user_id.eq(user_id))
                .order(generation_sessions::created_at.desc())
                .limit(limit)
                .offset(offset)
                .select(SessionRow::as_select())
                .load(conn)?;

            let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
            let suggestions = domain_suggestions::table
                .filter(domain_suggestions::session_id.eq_any(&ids))
                .order(domain_suggestions::created_at.asc())
                .select(SuggestionRow::as_select())
                .load(conn)?;

            let mut grouped: HashMap<Uuid, Vec<DomainSuggestion>> = HashMap::new();
            for row in suggestions {
                grouped
                    .entry(row.session_id)
                    .or_default()
                    .push(DomainSuggestion::from(row));
            }

            Ok(sessions
                .into_iter()
                .map(|row| {
                    let domain_suggestions = grouped.remove(&row.id).unwrap_or_default();
                    SessionWithSuggestions {
                        session: GenerationSession::from(row),
                        domain_suggestions,
                    }
                })
                .collect())
        })
        .await
    }
}

#[async_trait]
impl SubscriptionRepository for PgStore {
    #[instrument(skip(self))]
    async fn latest_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>> {
        self.with_conn(move |conn| {
            let row = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .order(subscriptions::created_at.desc())
                .select(SubscriptionRow::as_select())
                .first(conn)
                .optional()?;
            to_subscription(row)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn latest_for_email(&self, email: &str) -> DomainforgeResult<Option<Subscription>> {
        let email = email.to_lowercase();
        self.with_conn(move |conn| {
            let row = subscriptions::table
                .inner_join(users::table)
                .filter(users::email.eq(&email))
                .order(subscriptions::created_at.desc())
                .select(SubscriptionRow::as_select())
                .first(conn)
                .optional()?;
            to_subscription(row)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_stripe_id(
        &self,
        stripe_id: &str,
    ) -> DomainforgeResult<Option<Subscription>> {
        let stripe_id = stripe_id.to_string();
        self.with_conn(move |conn| {
            let row = subscriptions::table
                .filter(subscriptions::stripe_subscription_id.eq(&stripe_id))
                .select(SubscriptionRow::as_select())
                .first(conn)
                .optional()?;
            to_subscription(row)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn active_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>> {
        let current: Vec<String> = SubscriptionStatus::CURRENT
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.with_conn(move |conn| {
            let row = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::status.eq_any(&current))
                .order(subscriptions::created_at.desc())
                .select(SubscriptionRow::as_select())
                .first(conn)
                .optional()?;
            to_subscription(row)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn canceled_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>> {
        self.with_conn(move |conn| {
            let row = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::status.eq(SubscriptionStatus::Canceled.to_string()))
                .order(subscriptions::created_at.desc())
                .select(SubscriptionRow::as_select())
                .first(conn)
                .optional()?;
            to_subscription(row)
        })
        .await
    }

    #[instrument(skip(self, values), fields(user_id = %values.user_id, tier = %values.tier))]
    async fn upsert_for_user(&self, values: SubscriptionUpsert) -> DomainforgeResult<Subscription> {
        self.with_conn(move |conn| {
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let existing: Option<Uuid> = subscriptions::table
                    .filter(subscriptions::user_id.eq(values.user_id))
                    .order(subscriptions::created_at.desc())
                    .select(subscriptions::id)
                    .first(conn)
                    .optional()?;

                let row = match existing {
                    Some(id) => diesel::update(subscriptions::table.find(id))
                        .set(&SubscriptionOverwrite::from(&values))
                        .returning(SubscriptionRow::as_returning())
                        .get_result(conn)?,
                    None => diesel::insert_into(subscriptions::table)
                        .values(&NewSubscriptionRow::from(&values))
                        .returning(SubscriptionRow::as_returning())
                        .get_result(conn)?,
                };
                Subscription::try_from(row)
            })
        })
        .await
    }

    #[instrument(skip(self, update))]
    async fn update(
        &self,
        id: Uuid,
        update: SubscriptionUpdate,
    ) -> DomainforgeResult<Subscription> {
        let changes = SubscriptionChangeset::from(&update);
        self.with_conn(move |conn| {
            let row = diesel::update(subscriptions::table.find(id))
                .set(&changes)
                .returning(SubscriptionRow::as_returning())
                .get_result(conn)?;
            Subscription::try_from(row)
        })
        .await
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> DomainforgeResult<()> {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(())
        })
        .await
    }
}
