//! Tests for the failure policy's strict-gating side: a failed optimization
//! or validation call yields a `success = false` report and the run does not
//! advance, while analysis failures only degrade per-model.

use async_trait::async_trait;
use promptforge_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse,
};
use promptforge_core::{ModelLineup, StepId, WorkflowEngine, WorkflowError, WorkflowRun};
use promptforge_models::{Credentials, Provider, ProviderRegistry};
use std::sync::Arc;

/// A backend whose every call fails at the transport level.
struct FailingModel;

#[async_trait]
impl Model for FailingModel {
    async fn generate_chat_completion(
        &self,
        _messages: &[ChatMessage],
        _parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        Err(ModelError::RequestError("connection refused".to_string()))
    }

    fn model_id(&self) -> &str {
        "failing-model"
    }
}

#[tokio::test]
async fn test_optimization_failure_reports_and_halts() {
    let lineup = ModelLineup::default();
    // Provider B is configured, so the optimization stage takes the live path
    // and reaches the failing backend seeded in the registry.
    let registry =
        ProviderRegistry::new(Credentials::empty().with_key(Provider::OpenAi, "sk-test"));
    registry.register(Provider::OpenAi, &lineup.reference_model, Arc::new(FailingModel));
    let engine = WorkflowEngine::new(Arc::new(registry));

    let mut run = WorkflowRun::new();
    engine.start(&mut run);
    engine.execute_step(&mut run, StepId::Profiles).await.unwrap();
    engine.execute_step(&mut run, StepId::Analysis).await.unwrap();

    let report = engine.execute_step(&mut run, StepId::Optimization).await.unwrap();
    assert!(!report.success);
    assert!(report.message.contains("Prompt optimization failed"));
    assert!(report.data.is_none());

    // The failed stage must not advance the run.
    assert_eq!(run.completed_steps, vec![StepId::Profiles, StepId::Analysis]);
    assert_eq!(run.current_step, Some(StepId::Optimization));
    assert!(run.optimized_prompt.is_none());
    assert!(run.report(StepId::Optimization).is_none());

    // With no optimization on record, the validation step is refused.
    let err = engine.execute_step(&mut run, StepId::Results).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Precondition { step: StepId::Results, .. }));
}

#[tokio::test]
async fn test_validation_trial_failure_reports_without_advancing() {
    let lineup = ModelLineup::default();
    let registry = ProviderRegistry::new(
        Credentials::empty()
            .with_key(Provider::Novita, "nv-test")
            .with_key(Provider::OpenAi, "sk-test"),
    );
    registry.register(Provider::Novita, &lineup.small_model, Arc::new(FailingModel));
    let engine = WorkflowEngine::new(Arc::new(registry));

    let report = engine.validate("improved {profiles}", None).await.unwrap();
    assert!(!report.success);
    assert!(report.message.contains("Improved prompt testing failed"));
    assert!(report.data.is_none());
}

#[tokio::test]
async fn test_validation_rejects_prompt_without_marker() {
    let engine = WorkflowEngine::new(Arc::new(ProviderRegistry::new(Credentials::empty())));
    let report = engine.validate("no marker here", None).await.unwrap();
    assert!(!report.success);
    assert!(report.message.contains("Improved prompt testing failed"));
}

#[tokio::test]
async fn test_analysis_failures_degrade_without_halting() {
    let lineup = ModelLineup::default();
    let registry =
        ProviderRegistry::new(Credentials::empty().with_key(Provider::Novita, "nv-test"));
    registry.register(Provider::Novita, &lineup.large_model, Arc::new(FailingModel));
    registry.register(Provider::Novita, &lineup.small_model, Arc::new(FailingModel));
    let engine = WorkflowEngine::new(Arc::new(registry));

    let mut run = WorkflowRun::new();
    engine.start(&mut run);
    engine.execute_step(&mut run, StepId::Profiles).await.unwrap();

    let report = engine.execute_step(&mut run, StepId::Analysis).await.unwrap();
    assert!(report.success);

    let bundle = run.analysis_results.as_ref().unwrap();
    assert!(bundle.llama_70b_analysis.starts_with("Error:"));
    assert!(bundle.llama_70b_usage.is_none());
    assert_eq!(bundle.llama_70b_energy, 0.0);
    assert!(bundle.llama_8b_analysis.starts_with("Error:"));

    assert_eq!(run.completed_steps, vec![StepId::Profiles, StepId::Analysis]);
    assert_eq!(run.current_step, Some(StepId::Optimization));
}
