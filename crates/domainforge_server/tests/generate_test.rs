//! Tests for `POST /api/domains/generate`.

mod test_utils;

use axum::http::StatusCode;
use chrono::Utc;
use domainforge_core::{AiModel, ProviderKind, Subscription, SubscriptionStatus, Tier};
use domainforge_database::InMemoryStore;
use domainforge_interface::{HistoryRepository, UserRepository};
use serde_json::json;
use std::sync::Arc;
use test_utils::*;
use uuid::Uuid;

const FIVE_NAMES: &str = "Brightly\nNovaCraft\nLumenly\nZestio\nQuillo\nExtra";

fn generate(body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    json_request("POST", "/api/domains/generate", body)
}

#[tokio::test]
async fn test_generate_returns_five_names_and_model() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    let app = router(test_config(), services);

    let (status, body) = send(&app, generate(json!({ "prompt": "A bakery for dogs" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["data"]["domains"],
        json!(["Brightly", "NovaCraft", "Lumenly", "Zestio", "Quillo"])
    );
    // Free tier prefers llama-3-8b; without Groq the primary's cheapest model is used.
    assert_eq!(body["data"]["model_used"], "gpt-4o-mini");
    assert!(body["data"].get("session_id").is_none());
    assert!(body["data"]["generated_at"].is_string());
    assert_eq!(primary.call_count(), 1);
}

#[tokio::test]
async fn test_free_tier_quota_is_enforced_per_email() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    let app = router(test_config(), services);

    for _ in 0..2 {
        let req = with_header(
            generate(json!({ "prompt": "coffee roastery" })),
            "x-user-email",
            "Ann@Example.com",
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = with_header(
        generate(json!({ "prompt": "coffee roastery" })),
        "x-user-email",
        "ann@example.com",
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["error"],
        "Monthly usage limit reached for your tier. Please upgrade or wait until next month."
    );
    assert_eq!(primary.call_count(), 2);

    // A different caller has its own counter.
    let req = with_header(
        generate(json!({ "prompt": "coffee roastery" })),
        "x-user-email",
        "bob@example.com",
    );
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_id_spellings_share_one_quota() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    let app = router(test_config(), services);

    let id = Uuid::new_v4();
    for spelling in [id.to_string(), id.to_string().to_uppercase()] {
        let (status, _) = send(
            &app,
            generate(json!({ "prompt": "bike repair", "user_id": spelling })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(
        &app,
        generate(json!({ "prompt": "bike repair", "user_id": id.simple().to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(primary.call_count(), 2);
}

#[tokio::test]
async fn test_active_paid_subscription_raises_quota_and_model() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.create_user("pro@example.com", None).await.unwrap();
    store.insert_subscription(Subscription {
        id: Uuid::new_v4(),
        user_id: user.id,
        stripe_customer_id: Some("cus_1".to_string()),
        stripe_subscription_id: Some("sub_1".to_string()),
        tier: Tier::Premium,
        status: SubscriptionStatus::Active,
        current_period_end: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });

    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    let app = router(test_config(), services);

    for _ in 0..5 {
        let req = generate(json!({ "prompt": "tax advisory", "user_id": user.id.to_string() }));
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["model_used"], "gpt-4o");
    }
    assert_eq!(primary.call_count(), 5);
}

#[tokio::test]
async fn test_request_tier_ignored_unless_trusted() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());

    let untrusted = router(test_config(), services.clone());
    for expected in [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS] {
        let (status, _) = send(
            &untrusted,
            generate(json!({ "prompt": "florist", "tier": "premium" })),
        )
        .await;
        assert_eq!(status, expected);
    }

    let mut config = test_config();
    config.usage.trust_request_tier = true;
    let trusted = router(config, services);
    for _ in 0..5 {
        let (status, body) = send(
            &trusted,
            generate(json!({ "prompt": "florist", "tier": "premium" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["model_used"], "gpt-4o");
    }
}

#[tokio::test]
async fn test_primary_failure_falls_back_to_secondary() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::failing(ProviderKind::OpenAi));
    let secondary = Arc::new(MockProvider::replying(ProviderKind::Groq, "alpha\nbeta"));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    services.secondary = Some(secondary.clone());
    let app = router(test_config(), services);

    let (status, body) = send(
        &app,
        generate(json!({ "prompt": "bike repair", "model": "gpt-4o" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["domains"], json!(["alpha", "beta"]));
    assert_eq!(body["data"]["model_used"], "llama-3-8b");
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.prompts()[0].1, AiModel::Llama3_8b);
}

#[tokio::test]
async fn test_provider_failure_without_fallback_is_500() {
    let store = Arc::new(InMemoryStore::new());
    let mut services = bare_services(&store);
    services.primary = Some(Arc::new(MockProvider::failing(ProviderKind::OpenAi)));
    let app = router(test_config(), services);

    let (status, body) = send(&app, generate(json!({ "prompt": "bike repair" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate domains");
}

#[tokio::test]
async fn test_no_provider_is_not_configured() {
    let store = Arc::new(InMemoryStore::new());
    let app = router(test_config(), bare_services(&store));

    let (status, body) = send(&app, generate(json!({ "prompt": "bike repair" }))).await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"], "No AI provider configured");
}

#[tokio::test]
async fn test_empty_completion_is_500() {
    let store = Arc::new(InMemoryStore::new());
    let mut services = bare_services(&store);
    services.primary = Some(Arc::new(MockProvider::replying(
        ProviderKind::OpenAi,
        "\n  \n",
    )));
    let app = router(test_config(), services);

    let (status, body) = send(&app, generate(json!({ "prompt": "bike repair" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate domains");
}

#[tokio::test]
async fn test_invalid_bodies_rejected_before_provider() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    let app = router(test_config(), services);

    let long_prompt = "a".repeat(501);
    let too_many_keywords: Vec<String> = (0..21).map(|i| format!("k{}", i)).collect();

    let cases = [
        (json!({ "prompt": long_prompt }), "Prompt must be at most 500 characters"),
        (json!({ "prompt": "   " }), "Prompt is required"),
        (
            json!({ "prompt": "ok", "user_id": "not-a-uuid" }),
            "Invalid uuid",
        ),
        (
            json!({ "prompt": "ok", "keywords": too_many_keywords }),
            "At most 20 keywords are allowed",
        ),
    ];

    for (body, message) in cases {
        let (status, response) = send(&app, generate(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], "error");
        assert!(
            response["error"].as_str().unwrap().contains(message),
            "expected {:?} in {:?}",
            message,
            response["error"]
        );
    }

    let (status, _) = send(&app, generate(json!({ "prompt": "ok", "model": "gpt-5" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(primary.call_count(), 0);
}

#[tokio::test]
async fn test_prompt_is_sanitized_before_generation() {
    let store = Arc::new(InMemoryStore::new());
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, FIVE_NAMES));
    let mut services = bare_services(&store);
    services.primary = Some(primary.clone());
    let app = router(test_config(), services);

    let body = json!({
        "prompt": "<b>Dog</b> bakery<script>alert('x')</script>; ",
        "keywords": ["treats"],
    });
    let (status, _) = send(&app, generate(body)).await;

    assert_eq!(status, StatusCode::OK);
    let (user_prompt, _) = &primary.prompts()[0];
    assert!(user_prompt.starts_with("Business concept: Dog bakery"));
    assert!(user_prompt.contains("Keywords to consider: treats"));
    assert!(!user_prompt.contains("script"));
}

#[tokio::test]
async fn test_history_saved_for_known_user() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.create_user("ann@example.com", None).await.unwrap();
    let mut services = bare_services(&store);
    services.primary = Some(Arc::new(MockProvider::replying(
        ProviderKind::OpenAi,
        "Alpha.io\nbad name!\nBeta",
    )));
    let app = router(test_config(), services);

    let req = generate(json!({ "prompt": "surf school", "user_id": user.id.to_string() }));
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();

    let sessions = store.list_sessions(user.id, 10, 0).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session.id.to_string(), session_id);
    assert_eq!(sessions[0].session.prompt, "surf school");
    assert_eq!(sessions[0].session.model_used, "gpt-4o-mini");
    let names: Vec<&str> = sessions[0]
        .domain_suggestions
        .iter()
        .map(|s| s.domain_name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha.io", "beta"]);
}

#[tokio::test]
async fn test_unstorable_names_do_not_fail_generation() {
    let store = Arc::new(InMemoryStore::new());
    let user = store.create_user("ann@example.com", None).await.unwrap();
    let mut services = bare_services(&store);
    services.primary = Some(Arc::new(MockProvider::replying(
        ProviderKind::OpenAi,
        "Sunny Side!
Wave & Co",
    )));
    let app = router(test_config(), services);

    let req = generate(json!({ "prompt": "surf school", "user_id": user.id.to_string() }));
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["domains"], json!(["Sunny Side!", "Wave & Co"]));
    assert!(body["data"]["session_id"].is_string());

    let sessions = store.list_sessions(user.id, 10, 0).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].domain_suggestions.is_empty());
}
