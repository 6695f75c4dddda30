//! Mock payment gateway and failing store.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domainforge_core::{
    CheckoutParams, CheckoutSession, GatewaySubscription, Subscription, SubscriptionUpdate,
    SubscriptionUpsert,
};
use domainforge_error::{
    BillingError, BillingErrorKind, DatabaseError, DatabaseErrorKind, DomainforgeResult,
};
use domainforge_interface::{PaymentGateway, SubscriptionRepository};
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;

/// Gateway that answers from a fixed remote subscription and records calls.
pub struct MockGateway {
    remote: Mutex<GatewaySubscription>,
    calls: Mutex<Vec<String>>,
    checkouts: Mutex<Vec<CheckoutParams>>,
    fail_invoice: bool,
}

impl MockGateway {
    pub fn new(status: &str) -> Self {
        Self {
            remote: Mutex::new(GatewaySubscription {
                id: "sub_remote".to_string(),
                customer_id: Some("cus_remote".to_string()),
                status: status.to_string(),
                current_period_end: DateTime::from_timestamp(1_900_000_000, 0),
                cancel_at_period_end: false,
                item_id: Some("si_1".to_string()),
            }),
            calls: Mutex::new(Vec::new()),
            checkouts: Mutex::new(Vec::new()),
            fail_invoice: false,
        }
    }

    pub fn without_items(self) -> Self {
        self.remote.lock().item_id = None;
        self
    }

    pub fn failing_invoice(mut self) -> Self {
        self.fail_invoice = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn checkouts(&self) -> Vec<CheckoutParams> {
        self.checkouts.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> DomainforgeResult<CheckoutSession> {
        self.record("checkout".to_string());
        self.checkouts.lock().push(params.clone());
        Ok(CheckoutSession {
            id: "cs_test".to_string(),
            url: Some("https://checkout.stripe.com/c/cs_test".to_string()),
        })
    }

    async fn retrieve_subscription(&self, id: &str) -> DomainforgeResult<GatewaySubscription> {
        self.record(format!("retrieve:{}", id));
        let mut remote = self.remote.lock().clone();
        remote.id = id.to_string();
        Ok(remote)
    }

    async fn set_cancel_at_period_end(
        &self,
        id: &str,
        cancel: bool,
    ) -> DomainforgeResult<GatewaySubscription> {
        self.record(format!("cancel_at_period_end:{}:{}", id, cancel));
        let mut remote = self.remote.lock();
        remote.cancel_at_period_end = cancel;
        Ok(remote.clone())
    }

    async fn change_price(
        &self,
        id: &str,
        item_id: &str,
        price_id: &str,
    ) -> DomainforgeResult<GatewaySubscription> {
        self.record(format!("change_price:{}:{}:{}", id, item_id, price_id));
        Ok(self.remote.lock().clone())
    }

    async fn subscription_object(&self, id: &str) -> DomainforgeResult<Value> {
        Ok(json!({"id": id, "object": "subscription"}))
    }

    async fn upcoming_invoice(&self, customer_id: &str) -> DomainforgeResult<Value> {
        if self.fail_invoice {
            Err(BillingError::new(BillingErrorKind::Api("No upcoming invoices".to_string())))?
        }
        Ok(json!({"customer": customer_id, "amount_due": 900}))
    }

    async fn payment_methods(&self, _customer_id: &str) -> DomainforgeResult<Vec<Value>> {
        Ok(vec![json!({"id": "pm_1", "card": {"last4": "4242"}})])
    }
}

/// Store whose every call fails.
pub struct BrokenStore;

fn broken<T>() -> DomainforgeResult<T> {
    Err(DatabaseError::new(DatabaseErrorKind::Connection("refused".to_string())))?
}

#[async_trait]
impl SubscriptionRepository for BrokenStore {
    async fn latest_for_user(&self, _: Uuid) -> DomainforgeResult<Option<Subscription>> {
        broken()
    }
    async fn latest_for_email(&self, _: &str) -> DomainforgeResult<Option<Subscription>> {
        broken()
    }
    async fn find_by_stripe_id(&self, _: &str) -> DomainforgeResult<Option<Subscription>> {
        broken()
    }
    async fn active_for_user(&self, _: Uuid) -> DomainforgeResult<Option<Subscription>> {
        broken()
    }
    async fn canceled_for_user(&self, _: Uuid) -> DomainforgeResult<Option<Subscription>> {
        broken()
    }
    async fn upsert_for_user(&self, _: SubscriptionUpsert) -> DomainforgeResult<Subscription> {
        broken()
    }
    async fn update(&self, _: Uuid, _: SubscriptionUpdate) -> DomainforgeResult<Subscription> {
        broken()
    }
}

/// Subscription row for seeding a store.
pub fn stored(
    user_id: Uuid,
    tier: domainforge_core::Tier,
    status: domainforge_core::SubscriptionStatus,
) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: Uuid::new_v4(),
        user_id,
        stripe_customer_id: Some("cus_local".to_string()),
        stripe_subscription_id: Some(format!("sub_{}", user_id.simple())),
        tier,
        status,
        current_period_end: None,
        created_at: now,
        updated_at: now,
    }
}
