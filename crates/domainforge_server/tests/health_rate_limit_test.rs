//! Tests for `/health`, per-IP rate limiting and the fallback route.

mod test_utils;

use axum::http::{StatusCode, header};
use domainforge_core::ProviderKind;
use domainforge_database::InMemoryStore;
use serde_json::json;
use std::sync::Arc;
use test_utils::*;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_reports_configuration() {
    let store = Arc::new(InMemoryStore::new());
    let mut services = bare_services(&store);
    services.store_health = Some(store.clone());
    services.primary = Some(Arc::new(MockProvider::replying(ProviderKind::OpenAi, "x")));
    let app = router(test_config(), services);

    let (status, body) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    assert_eq!(
        body["services"],
        json!({
            "database": "healthy",
            "ai": "configured",
            "domain_api": "not_configured",
            "stripe": "not_configured",
        })
    );
}

#[tokio::test]
async fn test_stripe_needs_gateway_and_prices() {
    let store = Arc::new(InMemoryStore::new());
    let mut services = bare_services(&store);
    services.gateway = Some(Arc::new(MockGateway::default()));
    let partial = router(test_config(), services.clone());

    let (_, body) = send(&partial, empty_request("GET", "/health")).await;
    assert_eq!(body["services"]["stripe"], "not_configured");

    services.prices = test_prices();
    let complete = router(test_config(), services);
    let (_, body) = send(&complete, empty_request("GET", "/health")).await;
    assert_eq!(body["services"]["stripe"], "configured");
}

#[tokio::test]
async fn test_failing_store_degrades_health() {
    let store = Arc::new(InMemoryStore::new());
    let mut services = bare_services(&store);
    services.store_health = Some(Arc::new(DownStore));
    let app = router(test_config(), services);

    let (status, body) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"], "unhealthy");
}

#[tokio::test]
async fn test_domain_routes_are_rate_limited_per_ip() {
    let store = Arc::new(InMemoryStore::new());
    let mut config = test_config();
    config.rate_limit.domains.max_requests = 2;
    let app = router(config, bare_services(&store));

    let check = || {
        json_request(
            "POST",
            "/api/domains/check-availability",
            json!({ "domain_name": "example.com" }),
        )
    };

    for _ in 0..2 {
        let (status, _) = send(&app, check()).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    let response = app.clone().oneshot(check()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=900).contains(&retry_after));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Too many requests. Please try again later.");

    // Another peer has its own window.
    let (status, _) = send(&app, from_ip(check(), "10.0.0.2")).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    // Health is outside the limited groups.
    let (status, _) = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let store = Arc::new(InMemoryStore::new());
    let app = router(test_config(), bare_services(&store));

    let (status, body) = send(&app, empty_request("GET", "/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": "error", "error": "Not found" }));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let store = Arc::new(InMemoryStore::new());
    let app = router(test_config(), bare_services(&store));

    let req = request("POST", "/api/domains/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}
