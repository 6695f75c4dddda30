//! Trait definitions for external services and stores.

use async_trait::async_trait;
use domainforge_core::{
    AiModel, AuthUser, CheckoutParams, CheckoutSession, DomainSuggestion, GatewaySubscription,
    GenerationSession, ProviderKind, SessionWithSuggestions, Subscription, SubscriptionSummary,
    SubscriptionUpdate, SubscriptionUpsert, User,
};
use domainforge_error::DomainforgeResult;
use uuid::Uuid;

/// A chat-completion backend able to turn a prompt pair into text.
///
/// The generation orchestrator holds an ordered list of these and tries them
/// with first-success semantics.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete the conversation and return the raw assistant text.
    async fn complete(&self, system: &str, user: &str, model: AiModel)
    -> DomainforgeResult<String>;

    /// Which vendor this provider talks to.
    fn provider(&self) -> ProviderKind;

    /// Provider name for logs (e.g. "openai", "groq").
    fn provider_name(&self) -> &'static str;
}

/// Registry status lookup for a single domain.
#[async_trait]
pub trait AvailabilityLookup: Send + Sync {
    /// Whether the domain can be registered.
    ///
    /// Errors mean the answer is unknown, not that the domain is taken.
    async fn is_available(&self, domain: &str) -> DomainforgeResult<bool>;

    /// Provider name for logs.
    fn provider_name(&self) -> &'static str;
}

/// Bearer token verification and account proxying.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to its user.
    async fn verify_token(&self, token: &str) -> DomainforgeResult<AuthUser>;

    /// Create an account, returning the provider's user/session payload.
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> DomainforgeResult<serde_json::Value>;

    /// Password sign-in, returning the provider's session payload.
    async fn login(&self, email: &str, password: &str) -> DomainforgeResult<serde_json::Value>;

    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> DomainforgeResult<serde_json::Value>;

    /// Revoke the session behind the token.
    async fn logout(&self, token: &str) -> DomainforgeResult<()>;
}

/// Hosted billing operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a hosted checkout for a recurring price.
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> DomainforgeResult<CheckoutSession>;

    /// Fetch a remote subscription.
    async fn retrieve_subscription(&self, id: &str) -> DomainforgeResult<GatewaySubscription>;

    /// Schedule or unschedule cancellation at period end.
    async fn set_cancel_at_period_end(
        &self,
        id: &str,
        cancel: bool,
    ) -> DomainforgeResult<GatewaySubscription>;

    /// Swap the price on a subscription item, invoicing the proration immediately.
    async fn change_price(
        &self,
        id: &str,
        item_id: &str,
        price_id: &str,
    ) -> DomainforgeResult<GatewaySubscription>;

    /// Raw subscription object, as returned by the gateway.
    async fn subscription_object(&self, id: &str) -> DomainforgeResult<serde_json::Value>;

    /// Upcoming invoice for a customer.
    async fn upcoming_invoice(&self, customer_id: &str) -> DomainforgeResult<serde_json::Value>;

    /// Card payment methods on file for a customer.
    async fn payment_methods(&self, customer_id: &str)
    -> DomainforgeResult<Vec<serde_json::Value>>;
}

/// User records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> DomainforgeResult<Option<User>>;

    /// Insert a user. The email is stored lower-cased.
    async fn create_user(&self, email: &str, name: Option<&str>) -> DomainforgeResult<User>;

    /// Return the user for `email`, creating one if absent.
    async fn get_or_create(&self, email: &str, name: Option<&str>) -> DomainforgeResult<User> {
        match self.find_by_email(email).await? {
            Some(user) => Ok(user),
            None => self.create_user(email, name).await,
        }
    }
}

/// Generation sessions and their suggestions.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Record a generation call.
    async fn create_session(
        &self,
        user_id: Uuid,
        prompt: &str,
        model_used: &str,
    ) -> DomainforgeResult<GenerationSession>;

    /// Store suggested names for a session.
    ///
    /// Entries that are empty, longer than 255 characters or contain anything
    /// outside `[A-Za-z0-9.-]` are dropped; names are lower-cased. Fails when
    /// nothing valid remains.
    async fn save_suggestions(
        &self,
        session_id: Uuid,
        names: &[String],
    ) -> DomainforgeResult<Vec<DomainSuggestion>>;

    /// Record an availability answer on every stored suggestion with this name.
    ///
    /// Returns the number of suggestions touched.
    async fn update_availability(&self, domain: &str, available: bool)
    -> DomainforgeResult<usize>;

    /// Sessions for a user, newest first, with suggestions.
    ///
    /// `limit` must be within 1..=50.
    async fn list_sessions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DomainforgeResult<Vec<SessionWithSuggestions>>;
}

/// Subscription records.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Most recently created subscription for a user.
    async fn latest_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>>;

    /// Most recently created subscription for the user with this email.
    async fn latest_for_email(&self, email: &str) -> DomainforgeResult<Option<Subscription>>;

    /// Subscription carrying a Stripe subscription id.
    async fn find_by_stripe_id(&self, stripe_id: &str)
    -> DomainforgeResult<Option<Subscription>>;

    /// Latest subscription in an active, trialing or past-due state.
    async fn active_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>>;

    /// Latest canceled subscription.
    async fn canceled_for_user(&self, user_id: Uuid) -> DomainforgeResult<Option<Subscription>>;

    /// Create or overwrite the subscription for a user.
    async fn upsert_for_user(&self, values: SubscriptionUpsert) -> DomainforgeResult<Subscription>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, update: SubscriptionUpdate)
    -> DomainforgeResult<Subscription>;

    /// Tier and status for a user; free/none when missing or on error.
    async fn status_for(&self, user_id: Uuid) -> SubscriptionSummary {
        match self.latest_for_user(user_id).await {
            Ok(Some(sub)) => SubscriptionSummary::from(&sub),
            _ => SubscriptionSummary::default(),
        }
    }
}

/// Liveness probe for a backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Run a trivial round trip against the store.
    async fn ping(&self) -> DomainforgeResult<()>;
}
