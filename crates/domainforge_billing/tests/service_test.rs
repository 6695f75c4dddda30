mod test_utils;

use domainforge_billing::{BillingService, PriceConfig};
use domainforge_core::{SubscriptionStatus, SubscriptionSummary, Tier};
use domainforge_database::InMemoryStore;
use domainforge_error::{BillingErrorKind, DomainforgeErrorKind};
use domainforge_interface::{PaymentGateway, SubscriptionRepository, UserRepository};
use std::sync::Arc;
use test_utils::{BrokenStore, MockGateway, stored};
use uuid::Uuid;

fn prices() -> PriceConfig {
    PriceConfig {
        mid: Some("price_mid".to_string()),
        premium: Some("price_premium".to_string()),
    }
}

fn service(store: Arc<InMemoryStore>, gateway: Arc<MockGateway>) -> BillingService {
    BillingService::new(
        Some(gateway as Arc<dyn PaymentGateway>),
        store as Arc<dyn SubscriptionRepository>,
        prices(),
    )
}

fn billing_kind(err: &domainforge_error::DomainforgeError) -> Option<BillingErrorKind> {
    match err.kind() {
        DomainforgeErrorKind::Billing(e) => Some(e.kind.clone()),
        _ => None,
    }
}

#[tokio::test]
async fn checkout_reuses_existing_customer() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));
    let user_id = Uuid::new_v4();
    store.insert_subscription(stored(user_id, Tier::Mid, SubscriptionStatus::Canceled));

    let session = service(store, gateway.clone())
        .checkout(
            Tier::Premium,
            Some(user_id),
            Some("a@b.io"),
            "https://app/success",
            "https://app/cancel",
        )
        .await
        .unwrap();

    assert_eq!(session.id, "cs_test");
    let params = &gateway.checkouts()[0];
    assert_eq!(params.price_id, "price_premium");
    assert_eq!(params.customer_id.as_deref(), Some("cus_local"));
    assert_eq!(params.customer_email, None);
    assert_eq!(params.tier, "premium");
    assert_eq!(params.user_id, Some(user_id.to_string()));
}

#[tokio::test]
async fn checkout_falls_back_to_email() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));

    service(store, gateway.clone())
        .checkout(Tier::Mid, None, Some("a@b.io"), "https://s", "https://c")
        .await
        .unwrap();

    let params = &gateway.checkouts()[0];
    assert_eq!(params.price_id, "price_mid");
    assert_eq!(params.customer_id, None);
    assert_eq!(params.customer_email.as_deref(), Some("a@b.io"));
    assert_eq!(params.user_id, None);
}

#[tokio::test]
async fn checkout_rejects_free_tier() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));

    let err = service(store, gateway.clone())
        .checkout(Tier::Free, None, None, "https://s", "https://c")
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), DomainforgeErrorKind::Validation(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn checkout_without_stripe_or_price_is_not_configured() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());

    let no_gateway = BillingService::new(None, store.clone(), prices());
    let err = no_gateway
        .checkout(Tier::Mid, None, None, "https://s", "https://c")
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), DomainforgeErrorKind::NotConfigured(_)));
    assert!(!no_gateway.is_configured());

    let no_price = BillingService::new(
        Some(Arc::new(MockGateway::new("active"))),
        store,
        PriceConfig {
            mid: Some("price_mid".to_string()),
            premium: None,
        },
    );
    let err = no_price
        .checkout(Tier::Premium, None, None, "https://s", "https://c")
        .await
        .unwrap_err();
    assert_eq!(err.public_message(), "Price ID not set");
    assert!(!no_price.is_configured());
}

#[tokio::test]
async fn current_falls_back_to_email_then_free() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.create_user("pay@example.com", None).await.unwrap();
    store.insert_subscription(stored(user.id, Tier::Premium, SubscriptionStatus::Active));
    let service = service(store, Arc::new(MockGateway::new("active")));

    let by_email = service.current(None, Some("pay@example.com")).await;
    assert_eq!(by_email.tier, Tier::Premium);

    let anonymous = service.current(None, None).await;
    assert_eq!(anonymous, SubscriptionSummary::default());
}

#[tokio::test]
async fn current_is_free_when_store_fails() {
    let service = BillingService::new(None, Arc::new(BrokenStore), prices());

    assert_eq!(
        service.current(Some(Uuid::new_v4()), None).await,
        SubscriptionSummary::default()
    );
    assert_eq!(
        service.current(None, Some("a@b.io")).await,
        SubscriptionSummary::default()
    );
}

#[tokio::test]
async fn cancel_schedules_remote_and_marks_canceled() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));
    let user_id = Uuid::new_v4();
    let sub = stored(user_id, Tier::Mid, SubscriptionStatus::Active);
    let remote_id = sub.stripe_subscription_id.clone().unwrap();
    store.insert_subscription(sub);

    service(store.clone(), gateway.clone()).cancel(user_id).await.unwrap();

    assert_eq!(
        gateway.calls(),
        vec![format!("cancel_at_period_end:{}:true", remote_id)]
    );
    let sub = store.latest_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Canceled);
}

#[tokio::test]
async fn cancel_without_active_subscription_fails() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));
    let user_id = Uuid::new_v4();
    store.insert_subscription(stored(user_id, Tier::Mid, SubscriptionStatus::Unpaid));

    let err = service(store, gateway.clone()).cancel(user_id).await.unwrap_err();

    assert_eq!(
        billing_kind(&err),
        Some(BillingErrorKind::NoSubscription("No active subscription found".to_string()))
    );
    assert_eq!(err.public_message(), "No active subscription found");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn upgrade_swaps_price_and_tier() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));
    let user_id = Uuid::new_v4();
    let sub = stored(user_id, Tier::Mid, SubscriptionStatus::Trialing);
    let remote_id = sub.stripe_subscription_id.clone().unwrap();
    store.insert_subscription(sub);

    service(store.clone(), gateway.clone())
        .upgrade(user_id, Tier::Premium)
        .await
        .unwrap();

    assert_eq!(
        gateway.calls(),
        vec![
            format!("retrieve:{}", remote_id),
            format!("change_price:{}:si_1:price_premium", remote_id),
        ]
    );
    let sub = store.latest_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(sub.tier, Tier::Premium);
}

#[tokio::test]
async fn upgrade_requires_subscription_items() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active").without_items());
    let user_id = Uuid::new_v4();
    store.insert_subscription(stored(user_id, Tier::Mid, SubscriptionStatus::Active));

    let err = service(store, gateway)
        .upgrade(user_id, Tier::Premium)
        .await
        .unwrap_err();

    assert_eq!(billing_kind(&err), Some(BillingErrorKind::InvalidStructure));
}

#[tokio::test]
async fn reactivate_requires_canceled_subscription() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active"));
    let user_id = Uuid::new_v4();
    let service = service(store.clone(), gateway.clone());

    let err = service.reactivate(user_id).await.unwrap_err();
    assert_eq!(err.public_message(), "No canceled subscription found");

    store.insert_subscription(stored(user_id, Tier::Mid, SubscriptionStatus::Canceled));
    service.reactivate(user_id).await.unwrap();

    let sub = store.latest_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Active);
    assert!(gateway.calls()[0].ends_with(":false"));
}

#[tokio::test]
async fn details_are_best_effort() {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(MockGateway::new("active").failing_invoice());
    let user_id = Uuid::new_v4();
    store.insert_subscription(stored(user_id, Tier::Mid, SubscriptionStatus::Active));

    let details = service(store, gateway).details(user_id).await.unwrap();

    assert!(details.subscription.is_some());
    assert!(details.upcoming_invoice.is_none());
    assert_eq!(details.payment_methods.len(), 1);

    let json = serde_json::to_value(&details).unwrap();
    assert!(json.get("upcomingInvoice").is_some());
    assert!(json.get("paymentMethods").is_some());
}

#[tokio::test]
async fn details_without_subscription_fails() {
    let store = Arc::new(InMemoryStore::new());
    let err = service(store, Arc::new(MockGateway::new("active")))
        .details(Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err.public_message(), "No subscription found");
}
