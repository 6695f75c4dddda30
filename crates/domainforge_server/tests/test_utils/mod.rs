//! Mock services and request helpers for router tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
};
use domainforge_billing::PriceConfig;
use domainforge_core::{
    AiModel, AuthUser, CheckoutParams, CheckoutSession, GatewaySubscription, ProviderKind,
};
use domainforge_database::InMemoryStore;
use domainforge_error::{
    AuthError, AuthErrorKind, DatabaseError, DatabaseErrorKind, DomainforgeResult, ProviderError,
    ProviderErrorKind,
};
use domainforge_interface::{
    AvailabilityLookup, CompletionProvider, IdentityProvider, PaymentGateway, StoreHealth,
};
use domainforge_rate_limit::DomainforgeConfig;
use domainforge_server::{AppServices, AppState, create_router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test";

/// Completion provider answering with fixed text, or failing.
pub struct MockProvider {
    kind: ProviderKind,
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, AiModel)>>,
}

impl MockProvider {
    pub fn replying(kind: ProviderKind, reply: &str) -> Self {
        Self {
            kind,
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(kind: ProviderKind) -> Self {
        Self {
            kind,
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts and models received, in order.
    pub fn prompts(&self) -> Vec<(String, AiModel)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        user: &str,
        model: AiModel,
    ) -> DomainforgeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push((user.to_string(), model));
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(ProviderError::new(
                self.provider_name(),
                ProviderErrorKind::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                },
            ))?,
        }
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn provider_name(&self) -> &'static str {
        match self.kind {
            ProviderKind::OpenAi => "mock-openai",
            ProviderKind::Groq => "mock-groq",
        }
    }
}

/// Availability lookup with a fixed set of free names.
#[derive(Default)]
pub struct MockLookup {
    available: Vec<String>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl MockLookup {
    pub fn with_available(mut self, domain: &str) -> Self {
        self.available.push(domain.to_string());
        self
    }

    pub fn with_failing(mut self, domain: &str) -> Self {
        self.failing.push(domain.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvailabilityLookup for MockLookup {
    async fn is_available(&self, domain: &str) -> DomainforgeResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|d| d == domain) {
            Err(ProviderError::new(
                "mock",
                ProviderErrorKind::Http("timeout".to_string()),
            ))?
        }
        Ok(self.available.iter().any(|d| d == domain))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Identity provider with a fixed token table and one valid password.
#[derive(Default)]
pub struct MockIdentity {
    tokens: HashMap<String, AuthUser>,
    logouts: Mutex<Vec<String>>,
}

pub const PASSWORD: &str = "correct horse";

impl MockIdentity {
    pub fn with_token(mut self, token: &str, email: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            AuthUser {
                id: format!("auth-{}", email),
                email: email.to_string(),
                name: None,
            },
        );
        self
    }

    pub fn logouts(&self) -> Vec<String> {
        self.logouts.lock().clone()
    }

    fn session(email: &str) -> Value {
        json!({
            "user": { "id": format!("auth-{}", email), "email": email },
            "session": { "access_token": "at", "refresh_token": "rt" },
        })
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn verify_token(&self, token: &str) -> DomainforgeResult<AuthUser> {
        match self.tokens.get(token) {
            Some(user) => Ok(user.clone()),
            None => Err(AuthError::new(AuthErrorKind::InvalidToken))?,
        }
    }

    async fn register(
        &self,
        email: &str,
        _password: &str,
        _name: Option<&str>,
    ) -> DomainforgeResult<Value> {
        if email.starts_with("taken@") {
            Err(AuthError::new(AuthErrorKind::Rejected(
                "User already registered".to_string(),
            )))?
        }
        Ok(Self::session(email))
    }

    async fn login(&self, email: &str, password: &str) -> DomainforgeResult<Value> {
        if password != PASSWORD {
            Err(AuthError::new(AuthErrorKind::Rejected(
                "Invalid login credentials".to_string(),
            )))?
        }
        Ok(Self::session(email))
    }

    async fn refresh(&self, refresh_token: &str) -> DomainforgeResult<Value> {
        if refresh_token != "rt" {
            Err(AuthError::new(AuthErrorKind::Rejected(
                "Invalid Refresh Token".to_string(),
            )))?
        }
        Ok(json!({ "user": null, "session": { "access_token": "at2" } }))
    }

    async fn logout(&self, token: &str) -> DomainforgeResult<()> {
        self.logouts.lock().push(token.to_string());
        Ok(())
    }
}

/// Gateway answering with an active remote subscription.
#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<String>>,
    checkouts: Mutex<Vec<CheckoutParams>>,
}

impl MockGateway {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn checkouts(&self) -> Vec<CheckoutParams> {
        self.checkouts.lock().clone()
    }

    fn remote(id: &str) -> GatewaySubscription {
        GatewaySubscription {
            id: id.to_string(),
            customer_id: Some("cus_remote".to_string()),
            status: "active".to_string(),
            current_period_end: None,
            cancel_at_period_end: false,
            item_id: Some("si_1".to_string()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> DomainforgeResult<CheckoutSession> {
        self.checkouts.lock().push(params.clone());
        Ok(CheckoutSession {
            id: "cs_test".to_string(),
            url: Some("https://checkout.stripe.com/c/cs_test".to_string()),
        })
    }

    async fn retrieve_subscription(&self, id: &str) -> DomainforgeResult<GatewaySubscription> {
        self.calls.lock().push(format!("retrieve:{}", id));
        Ok(Self::remote(id))
    }

    async fn set_cancel_at_period_end(
        &self,
        id: &str,
        cancel: bool,
    ) -> DomainforgeResult<GatewaySubscription> {
        self.calls
            .lock()
            .push(format!("cancel_at_period_end:{}:{}", id, cancel));
        Ok(Self::remote(id))
    }

    async fn change_price(
        &self,
        id: &str,
        item_id: &str,
        price_id: &str,
    ) -> DomainforgeResult<GatewaySubscription> {
        self.calls
            .lock()
            .push(format!("change_price:{}:{}:{}", id, item_id, price_id));
        Ok(Self::remote(id))
    }

    async fn subscription_object(&self, id: &str) -> DomainforgeResult<Value> {
        Ok(json!({ "id": id, "object": "subscription" }))
    }

    async fn upcoming_invoice(&self, _customer_id: &str) -> DomainforgeResult<Value> {
        Ok(json!({ "amount_due": 1900 }))
    }

    async fn payment_methods(&self, _customer_id: &str) -> DomainforgeResult<Vec<Value>> {
        Ok(vec![json!({ "id": "pm_1" })])
    }
}

/// Store probe that always fails.
pub struct DownStore;

#[async_trait]
impl StoreHealth for DownStore {
    async fn ping(&self) -> DomainforgeResult<()> {
        Err(DatabaseError::new(DatabaseErrorKind::Connection(
            "refused".to_string(),
        )))?
    }
}

/// Bundled configuration with generous rate limits.
pub fn test_config() -> DomainforgeConfig {
    let mut config = DomainforgeConfig::bundled().expect("bundled config parses");
    config.rate_limit.domains.max_requests = 1_000;
    config.rate_limit.subscriptions.max_requests = 1_000;
    config
}

/// Services over a fresh in-memory store with nothing else configured.
pub fn bare_services(store: &Arc<InMemoryStore>) -> AppServices {
    AppServices {
        primary: None,
        secondary: None,
        availability: None,
        identity: None,
        gateway: None,
        users: store.clone(),
        history: store.clone(),
        subscriptions: store.clone(),
        store_health: None,
        prices: PriceConfig::default(),
        webhook_secret: None,
    }
}

/// Prices for both paid tiers.
pub fn test_prices() -> PriceConfig {
    PriceConfig {
        mid: Some("price_mid".to_string()),
        premium: Some("price_premium".to_string()),
    }
}

pub fn router(config: DomainforgeConfig, services: AppServices) -> Router {
    create_router(AppState::new(config, services))
}

fn peer(ip: &str) -> ConnectInfo<SocketAddr> {
    ConnectInfo(
        format!("{}:40000", ip)
            .parse()
            .expect("valid socket address"),
    )
}

/// Request builder preset with a peer address.
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .extension(peer("10.0.0.1"))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    request(method, uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    request(method, uri).body(Body::empty()).expect("valid request")
}

pub fn from_ip(mut req: Request<Body>, ip: &str) -> Request<Body> {
    req.extensions_mut().insert(peer(ip));
    req
}

pub fn with_header(mut req: Request<Body>, name: &'static str, value: &str) -> Request<Body> {
    req.headers_mut().insert(
        name,
        value.parse().expect("valid header value"),
    );
    req
}

pub fn with_bearer(req: Request<Body>, token: &str) -> Request<Body> {
    with_header(req, "authorization", &format!("Bearer {}", token))
}

/// Drive one request and decode the JSON body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("infallible router");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}
