//! Shared application state.

use domainforge_billing::{BillingService, PriceConfig, TierResolver, WebhookProcessor};
use domainforge_cache::{AvailabilityCache, AvailabilityCacheConfig};
use domainforge_domains::AvailabilityChecker;
use domainforge_generation::GenerationOrchestrator;
use domainforge_interface::{
    AvailabilityLookup, CompletionProvider, HistoryRepository, IdentityProvider, PaymentGateway,
    StoreHealth, SubscriptionRepository, UserRepository,
};
use domainforge_rate_limit::{DomainforgeConfig, IpRateLimiter, UsageLedger};
use std::sync::Arc;

/// External collaborators the server is assembled from.
///
/// Optional members are absent when their credentials are missing; the
/// routes depending on them answer 501.
#[derive(Clone)]
pub struct AppServices {
    /// OpenAI-backed provider
    pub primary: Option<Arc<dyn CompletionProvider>>,
    /// Groq-backed provider
    pub secondary: Option<Arc<dyn CompletionProvider>>,
    /// Registry status lookup
    pub availability: Option<Arc<dyn AvailabilityLookup>>,
    /// Bearer token verification and account proxying
    pub identity: Option<Arc<dyn IdentityProvider>>,
    /// Hosted billing
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    /// User records
    pub users: Arc<dyn UserRepository>,
    /// Generation history
    pub history: Arc<dyn HistoryRepository>,
    /// Subscription records
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// Database probe; `None` when running on in-memory repositories
    pub store_health: Option<Arc<dyn StoreHealth>>,
    /// Stripe price ids
    pub prices: PriceConfig,
    /// Webhook signing secret
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("primary", &self.primary.as_ref().map(|p| p.provider_name()))
            .field("secondary", &self.secondary.as_ref().map(|p| p.provider_name()))
            .field("availability", &self.availability.is_some())
            .field("identity", &self.identity.is_some())
            .field("gateway", &self.gateway.is_some())
            .field("database", &self.store_health.is_some())
            .field("prices", &self.prices)
            .finish()
    }
}

/// State handed to every handler.
///
/// Cheap to clone; every member is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<DomainforgeConfig>,
    pub(crate) orchestrator: Arc<GenerationOrchestrator>,
    pub(crate) ledger: Arc<UsageLedger>,
    pub(crate) checker: Arc<AvailabilityChecker>,
    pub(crate) resolver: Arc<TierResolver>,
    pub(crate) billing: Arc<BillingService>,
    pub(crate) webhooks: Arc<WebhookProcessor>,
    pub(crate) identity: Option<Arc<dyn IdentityProvider>>,
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) history: Arc<dyn HistoryRepository>,
    pub(crate) store_health: Option<Arc<dyn StoreHealth>>,
    pub(crate) domain_limiter: Arc<IpRateLimiter>,
    pub(crate) subscription_limiter: Arc<IpRateLimiter>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("orchestrator", &self.orchestrator)
            .field("checker", &self.checker)
            .field("billing", &self.billing)
            .field("identity", &self.identity.is_some())
            .field("database", &self.store_health.is_some())
            .finish()
    }
}

impl AppState {
    /// Assemble the services, stores and limiters from configuration.
    pub fn new(config: DomainforgeConfig, services: AppServices) -> Self {
        let cache = Arc::new(AvailabilityCache::new(AvailabilityCacheConfig::from(
            &config.availability,
        )));

        let orchestrator =
            GenerationOrchestrator::new(services.primary, services.secondary, config.tiers);
        let billing = BillingService::new(
            services.gateway.clone(),
            Arc::clone(&services.subscriptions),
            services.prices,
        );
        let webhooks = WebhookProcessor::new(
            services.gateway,
            Arc::clone(&services.subscriptions),
            services.webhook_secret,
        );

        Self {
            orchestrator: Arc::new(orchestrator),
            ledger: Arc::new(UsageLedger::new(config.tiers)),
            checker: Arc::new(AvailabilityChecker::new(services.availability, cache)),
            resolver: Arc::new(TierResolver::new(services.subscriptions)),
            billing: Arc::new(billing),
            webhooks: Arc::new(webhooks),
            identity: services.identity,
            users: services.users,
            history: services.history,
            store_health: services.store_health,
            domain_limiter: Arc::new(IpRateLimiter::from_config(&config.rate_limit.domains)),
            subscription_limiter: Arc::new(IpRateLimiter::from_config(
                &config.rate_limit.subscriptions,
            )),
            config: Arc::new(config),
        }
    }

    /// Loaded configuration.
    pub fn config(&self) -> &DomainforgeConfig {
        &self.config
    }

    /// Monthly usage counters.
    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }

    /// Availability checker and its cache.
    pub fn checker(&self) -> &Arc<AvailabilityChecker> {
        &self.checker
    }
}
