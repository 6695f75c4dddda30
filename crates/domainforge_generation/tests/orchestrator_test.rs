mod test_utils;

use domainforge_core::{AiModel, GenerationOptions, GenerationOptionsBuilder, ProviderKind, Tier};
use domainforge_error::DomainforgeErrorKind;
use domainforge_generation::GenerationOrchestrator;
use domainforge_interface::CompletionProvider;
use std::sync::Arc;
use test_utils::{MockProvider, default_tiers};

fn orchestrator(
    primary: Option<Arc<MockProvider>>,
    secondary: Option<Arc<MockProvider>>,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(
        primary.map(|p| p as Arc<dyn CompletionProvider>),
        secondary.map(|p| p as Arc<dyn CompletionProvider>),
        default_tiers(),
    )
}

fn with_model(model: AiModel) -> GenerationOptions {
    GenerationOptionsBuilder::default()
        .model(Some(model))
        .build()
        .unwrap()
}

#[tokio::test]
async fn over_long_prompt_is_rejected_before_any_provider_call() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "a\nb"));
    let secondary = Arc::new(MockProvider::replying(ProviderKind::Groq, "c"));
    let orch = orchestrator(Some(primary.clone()), Some(secondary.clone()));

    let prompt = "x".repeat(501);
    let err = orch
        .generate(&prompt, Tier::Premium, &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), DomainforgeErrorKind::Validation(_)));
    assert_eq!(primary.call_count(), 0);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn blank_prompt_is_rejected() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "a"));
    let orch = orchestrator(Some(primary.clone()), None);

    let err = orch
        .generate("   ", Tier::Mid, &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), DomainforgeErrorKind::Validation(_)));
    assert_eq!(primary.call_count(), 0);
}

#[tokio::test]
async fn prompt_of_exactly_500_chars_is_accepted() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "a"));
    let orch = orchestrator(Some(primary.clone()), None);

    let prompt = "é".repeat(500);
    let result = orch
        .generate(&prompt, Tier::Mid, &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(result.domains, vec!["a"]);
}

#[tokio::test]
async fn no_providers_is_a_configuration_error() {
    let orch = orchestrator(None, None);

    let err = orch
        .generate("coffee shop", Tier::Free, &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), DomainforgeErrorKind::NotConfigured(_)));
}

#[tokio::test]
async fn primary_failure_falls_back_to_secondary_cheapest_model() {
    let primary = Arc::new(MockProvider::failing(ProviderKind::OpenAi));
    let secondary = Arc::new(MockProvider::replying(
        ProviderKind::Groq,
        "brewly\nbeanly\n",
    ));
    let orch = orchestrator(Some(primary.clone()), Some(secondary.clone()));

    let result = orch
        .generate("coffee shop", Tier::Premium, &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(result.domains, vec!["brewly", "beanly"]);
    assert_eq!(result.model_used, AiModel::Llama3_8b);
    assert_eq!(primary.models_called(), vec![AiModel::Gpt4o]);
    assert_eq!(secondary.models_called(), vec![AiModel::Llama3_8b]);
}

#[tokio::test]
async fn primary_failure_without_secondary_surfaces_provider_error() {
    let primary = Arc::new(MockProvider::failing(ProviderKind::OpenAi));
    let orch = orchestrator(Some(primary.clone()), None);

    let err = orch
        .generate("coffee shop", Tier::Mid, &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), DomainforgeErrorKind::Provider(_)));
    assert_eq!(primary.call_count(), 1);
}

#[tokio::test]
async fn missing_primary_uses_secondary_for_gpt_models() {
    let secondary = Arc::new(MockProvider::replying(ProviderKind::Groq, "zesty"));
    let orch = orchestrator(None, Some(secondary.clone()));

    let result = orch
        .generate("juice bar", Tier::Mid, &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(result.model_used, AiModel::Llama3_8b);
    assert_eq!(secondary.call_count(), 1);
}

#[tokio::test]
async fn secondary_model_without_secondary_uses_primary_cheapest() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "nimbly"));
    let orch = orchestrator(Some(primary.clone()), None);

    let result = orch
        .generate(
            "running shoes",
            Tier::Free,
            &with_model(AiModel::Llama3_70b),
        )
        .await
        .unwrap();

    assert_eq!(result.model_used, AiModel::Gpt4oMini);
    assert_eq!(primary.models_called(), vec![AiModel::Gpt4oMini]);
}

#[tokio::test]
async fn secondary_failure_is_surfaced_without_retry() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "never"));
    let secondary = Arc::new(MockProvider::failing(ProviderKind::Groq));
    let orch = orchestrator(Some(primary.clone()), Some(secondary.clone()));

    let err = orch
        .generate("tea house", Tier::Free, &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), DomainforgeErrorKind::Provider(_)));
    assert_eq!(secondary.call_count(), 1);
    assert_eq!(primary.call_count(), 0);
}

#[tokio::test]
async fn explicit_model_overrides_tier_default() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "one"));
    let secondary = Arc::new(MockProvider::replying(ProviderKind::Groq, "two"));
    let orch = orchestrator(Some(primary.clone()), Some(secondary.clone()));

    let result = orch
        .generate("bakery", Tier::Free, &with_model(AiModel::Gpt4o))
        .await
        .unwrap();

    assert_eq!(result.model_used, AiModel::Gpt4o);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn tier_defaults_select_models() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "p"));
    let secondary = Arc::new(MockProvider::replying(ProviderKind::Groq, "s"));
    let orch = orchestrator(Some(primary.clone()), Some(secondary.clone()));
    let none = GenerationOptions::default();

    assert_eq!(
        orch.generate("x", Tier::Free, &none).await.unwrap().model_used,
        AiModel::Llama3_8b
    );
    assert_eq!(
        orch.generate("x", Tier::Mid, &none).await.unwrap().model_used,
        AiModel::Gpt4oMini
    );
    assert_eq!(
        orch.generate("x", Tier::Premium, &none).await.unwrap().model_used,
        AiModel::Gpt4o
    );
}

#[tokio::test]
async fn output_is_parsed_to_at_most_five_names() {
    let primary = Arc::new(MockProvider::replying(
        ProviderKind::OpenAi,
        "alpha\n\nbeta\nBeta again\n \ngamma\ndelta\nepsilon\nzeta",
    ));
    let orch = orchestrator(Some(primary), None);

    let result = orch
        .generate("anything", Tier::Mid, &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(
        result.domains,
        vec!["alpha", "beta", "Beta again", "gamma", "delta"]
    );
}

#[tokio::test]
async fn prompts_carry_options() {
    let primary = Arc::new(MockProvider::replying(ProviderKind::OpenAi, "a"));
    let orch = orchestrator(Some(primary.clone()), None);
    let options = GenerationOptionsBuilder::default()
        .business_type(Some("bakery".to_string()))
        .style(Some("modern".to_string()))
        .keywords(vec!["bread".to_string(), "oven".to_string()])
        .build()
        .unwrap();

    orch.generate("artisan bread", Tier::Mid, &options)
        .await
        .unwrap();

    let (system, user) = primary.last_prompts().unwrap();
    assert!(system.contains("Generate exactly 5 domain names"));
    assert!(system.ends_with("CONTEXT:\nBusiness Type: bakery\nStyle Preference: modern"));
    assert_eq!(
        user,
        "Business concept: artisan bread\nIndustry: bakery\nKeywords to consider: bread, oven"
    );
}
