use chrono::Utc;
use domainforge_core::{
    AiModel, AvailabilityRecord, CallerIdentity, ProviderKind, SubscriptionStatus,
    SubscriptionSummary, Tier,
};
use std::str::FromStr;

#[test]
fn models_belong_to_their_providers() {
    assert_eq!(AiModel::Gpt4o.provider(), ProviderKind::OpenAi);
    assert_eq!(AiModel::Gpt4oMini.provider(), ProviderKind::OpenAi);
    assert_eq!(AiModel::Llama3_70b.provider(), ProviderKind::Groq);
    assert_eq!(AiModel::Llama3_8b.provider(), ProviderKind::Groq);
}

#[test]
fn cheapest_models_per_provider() {
    assert_eq!(ProviderKind::OpenAi.cheapest_model(), AiModel::Gpt4oMini);
    assert_eq!(ProviderKind::Groq.cheapest_model(), AiModel::Llama3_8b);
}

#[test]
fn model_wire_ids() {
    assert_eq!(AiModel::Gpt4o.provider_model_id(), "gpt-4o");
    assert_eq!(AiModel::Gpt4oMini.provider_model_id(), "gpt-4o-mini");
    assert_eq!(AiModel::Llama3_70b.provider_model_id(), "llama3-70b-8192");
    assert_eq!(AiModel::Llama3_8b.provider_model_id(), "llama3-8b-8192");
}

#[test]
fn model_names_round_trip_through_json() {
    let json = serde_json::to_string(&AiModel::Llama3_8b).unwrap();
    assert_eq!(json, "\"llama-3-8b\"");
    let parsed: AiModel = serde_json::from_str("\"gpt-4o-mini\"").unwrap();
    assert_eq!(parsed, AiModel::Gpt4oMini);
    assert!(serde_json::from_str::<AiModel>("\"gpt-5\"").is_err());
}

#[test]
fn tier_parsing() {
    assert_eq!(Tier::from_str("free").unwrap(), Tier::Free);
    assert_eq!(Tier::from_str("mid").unwrap(), Tier::Mid);
    assert!(Tier::from_str("enterprise").is_err());
    assert!(Tier::Premium.is_paid());
}

#[test]
fn stripe_statuses_map_onto_local_set() {
    assert_eq!(
        SubscriptionStatus::from_stripe("active"),
        SubscriptionStatus::Active
    );
    assert_eq!(
        SubscriptionStatus::from_stripe("trialing"),
        SubscriptionStatus::Trialing
    );
    assert_eq!(
        SubscriptionStatus::from_stripe("incomplete"),
        SubscriptionStatus::PastDue
    );
    assert_eq!(
        SubscriptionStatus::from_stripe("paused"),
        SubscriptionStatus::Unpaid
    );
    assert_eq!(SubscriptionStatus::PastDue.to_string(), "past_due");
}

#[test]
fn current_statuses() {
    assert!(SubscriptionStatus::Active.is_current());
    assert!(SubscriptionStatus::PastDue.is_current());
    assert!(!SubscriptionStatus::Canceled.is_current());
    assert!(!SubscriptionStatus::None.is_current());
}

#[test]
fn default_summary_is_free_without_subscription() {
    let summary = SubscriptionSummary::default();
    assert_eq!(summary.tier, Tier::Free);
    assert_eq!(summary.status, SubscriptionStatus::None);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["tier"], "free");
    assert_eq!(json["status"], "none");
}

#[test]
fn caller_identity_prefers_user_then_email_then_ip() {
    assert_eq!(
        CallerIdentity::resolve(Some("u1"), Some("a@b.c"), "1.2.3.4"),
        CallerIdentity::User("u1".into())
    );
    assert_eq!(
        CallerIdentity::resolve(Some("  "), Some("A@B.C"), "1.2.3.4"),
        CallerIdentity::Email("a@b.c".into())
    );
    assert_eq!(
        CallerIdentity::resolve(None, None, "1.2.3.4").to_string(),
        "ip:1.2.3.4"
    );
}

#[test]
fn availability_record_hides_outcome_on_the_wire() {
    let record = AvailabilityRecord::confirmed("example.com", true, Utc::now());
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["domain_name"], "example.com");
    assert_eq!(json["is_available"], true);
    assert!(json.get("outcome").is_none());
}
