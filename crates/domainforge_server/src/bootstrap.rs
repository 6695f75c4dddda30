//! Assemble services from the environment.

use crate::{AppServices, SupabaseClient};
use domainforge_billing::{PriceConfig, StripeClient};
use domainforge_database::{InMemoryStore, PgStore};
use domainforge_domains::DomainrClient;
use domainforge_error::{DatabaseError, DatabaseErrorKind, DomainforgeResult, HttpError, Upstream};
use domainforge_interface::{
    AvailabilityLookup, CompletionProvider, IdentityProvider, PaymentGateway,
};
use domainforge_models::{GroqDriver, OpenAiDriver};
use domainforge_rate_limit::DomainforgeConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Outbound HTTP client carrying the configured request timeout.
///
/// # Errors
///
/// Returns an HTTP error if the TLS backend cannot be initialized.
pub fn http_client(config: &DomainforgeConfig) -> DomainforgeResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.request_timeout_secs))
        .build()
        .map_err(|e| {
            HttpError::new(Upstream::SharedClient, format!("Failed to build: {}", e)).into()
        })
}

fn optional<T>(name: &str, result: DomainforgeResult<T>) -> Option<T> {
    match result {
        Ok(value) => {
            info!(service = name, "Configured");
            Some(value)
        }
        Err(e) => {
            warn!(service = name, reason = %e, "Not configured");
            None
        }
    }
}

/// Build every collaborator from environment variables.
///
/// Missing credentials leave the matching service unset. With `DATABASE_URL`
/// set, the PostgreSQL store is connected and migrated; otherwise in-memory
/// repositories are used.
///
/// # Errors
///
/// Fails when the HTTP client cannot be built or the database is configured
/// but unreachable.
#[instrument(skip_all)]
pub async fn services_from_env(config: &DomainforgeConfig) -> DomainforgeResult<AppServices> {
    let client = http_client(config)?;

    let primary = optional("openai", OpenAiDriver::new())
        .map(|d| Arc::new(d.with_http_client(client.clone())) as Arc<dyn CompletionProvider>);
    let secondary = optional("groq", GroqDriver::new())
        .map(|d| Arc::new(d.with_http_client(client.clone())) as Arc<dyn CompletionProvider>);
    let availability = optional("domainr", DomainrClient::new())
        .map(|d| Arc::new(d.with_http_client(client.clone())) as Arc<dyn AvailabilityLookup>);
    let identity = optional("supabase", SupabaseClient::new())
        .map(|c| Arc::new(c.with_http_client(client.clone())) as Arc<dyn IdentityProvider>);
    let gateway = optional("stripe", StripeClient::new())
        .map(|c| Arc::new(c.with_http_client(client.clone())) as Arc<dyn PaymentGateway>);

    let prices = PriceConfig::from_env();
    if gateway.is_some() && !prices.is_complete() {
        warn!("STRIPE_PRICE_MID or STRIPE_PRICE_PREMIUM not set");
    }
    let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty());

    let services = match std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let store = tokio::task::spawn_blocking(move || -> DomainforgeResult<PgStore> {
                let store = PgStore::connect(&url)?;
                store.migrate()?;
                Ok(store)
            })
            .await
            .map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Connection(format!(
                    "Database setup task failed: {}",
                    e
                )))
            })??;
            info!("Using PostgreSQL store");
            let store = Arc::new(store);
            AppServices {
                primary,
                secondary,
                availability,
                identity,
                gateway,
                users: store.clone(),
                history: store.clone(),
                subscriptions: store.clone(),
                store_health: Some(store),
                prices,
                webhook_secret,
            }
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            AppServices {
                primary,
                secondary,
                availability,
                identity,
                gateway,
                users: store.clone(),
                history: store.clone(),
                subscriptions: store,
                store_health: None,
                prices,
                webhook_secret,
            }
        }
    };

    Ok(services)
}
