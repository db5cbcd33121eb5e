//! The workflow engine: four stage functions and the stepwise driver.
//!
//! Stages run one code path whether credentials are configured or not; mock
//! mode only swaps the injected model for a deterministic stub. The failure
//! policy is deliberately asymmetric: the analysis stage degrades per-model,
//! while optimization and validation failures halt the pipeline.

use crate::config::ModelLineup;
use crate::energy::estimate_energy_wh;
use crate::error::WorkflowError;
use crate::fallback;
use crate::profiles::{default_profiles, render_template, ORIGINAL_TASK_PROMPT, PROFILE_MARKER};
use crate::report::{
    AnalysisBundle, ProfileCollection, PromptOptimization, StageData, StageReport, StepId,
    ValidationOutcome,
};
use crate::state::{StatusSnapshot, WorkflowRun};
use promptforge_abstraction::{ChatMessage, Model, ModelParameters, ModelResponse, ModelUsage};
use promptforge_models::{Provider, ProviderRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed notice when the evaluation baseline is unavailable.
pub const EVALUATION_SKIPPED: &str = "Evaluation skipped - original response not available";

/// Fixed improvement themes reported by the optimization stage.
const IMPROVEMENTS: [&str; 4] = [
    "More specific structure guidance",
    "Clearer output format requirements",
    "Focus on actionable insights",
    "Better context for academic planning",
];

const MOCK_SUFFIX: &str = " (mock mode - API keys not available)";

/// Drives the four-stage prompt optimization pipeline.
///
/// The engine itself is stateless across calls; all run progress lives in the
/// `WorkflowRun` the caller owns.
pub struct WorkflowEngine {
    registry: Arc<ProviderRegistry>,
    profiles: Vec<String>,
    task_prompt: String,
    lineup: ModelLineup,
}

impl WorkflowEngine {
    /// Creates an engine over the given registry with the fixed deployment
    /// profiles, the original task prompt, and the default model lineup.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            profiles: default_profiles(),
            task_prompt: ORIGINAL_TASK_PROMPT.to_string(),
            lineup: ModelLineup::default(),
        }
    }

    /// Replaces the profile set.
    #[must_use]
    pub fn with_profiles(mut self, profiles: Vec<String>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Replaces the task prompt template.
    #[must_use]
    pub fn with_task_prompt(mut self, task_prompt: impl Into<String>) -> Self {
        self.task_prompt = task_prompt.into();
        self
    }

    /// The configured profile set.
    #[must_use]
    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    // ---- Stage 1: Collect ------------------------------------------------

    /// Formats the task prompt with the fixed profile set.
    ///
    /// Pure: no I/O, no credentials. Fails only on a malformed template.
    pub fn collect_profiles(&self) -> Result<StageReport, WorkflowError> {
        info!("Stage 1: collecting and formatting profiles");
        let formatted_prompt = render_template(&self.task_prompt, &self.profiles)?;

        Ok(StageReport::success(
            "Profile collection completed",
            StageData::Profiles(ProfileCollection {
                profiles: self.profiles.clone(),
                profile_count: self.profiles.len(),
                formatted_prompt,
            }),
        ))
    }

    // ---- Stage 2: Analyze ------------------------------------------------

    /// Sends the materialized task prompt to the large and small models.
    ///
    /// The two calls are independent and issued concurrently; a failed call
    /// degrades to inline error text for that model only. The stage itself
    /// succeeds as long as it runs.
    pub async fn analyze(&self) -> Result<StageReport, WorkflowError> {
        let mock = !self.registry.has_credential(Provider::Novita);
        info!(mock, "Stage 2: running model analysis");

        let (large, small) = if mock {
            fallback::analysis_stubs(&self.lineup)
        } else {
            (
                self.registry.client(Provider::Novita, &self.lineup.large_model)?,
                self.registry.client(Provider::Novita, &self.lineup.small_model)?,
            )
        };

        let formatted_prompt = render_template(&self.task_prompt, &self.profiles)?;
        let params = ModelParameters::bounded(2000, 0.7);

        let (large_result, small_result) = tokio::join!(
            large.generate_text(&formatted_prompt, Some(params.clone())),
            small.generate_text(&formatted_prompt, Some(params)),
        );

        let (llama_70b_analysis, llama_70b_usage, llama_70b_energy) =
            Self::per_model_outcome(large_result, &self.lineup.large_model);
        let (llama_8b_analysis, llama_8b_usage, llama_8b_energy) =
            Self::per_model_outcome(small_result, &self.lineup.small_model);

        let message = if mock {
            format!("AI model analysis completed{MOCK_SUFFIX}")
        } else {
            "AI model analysis completed".to_string()
        };

        Ok(StageReport::success(
            message,
            StageData::Analysis(AnalysisBundle {
                llama_70b_analysis,
                llama_70b_usage,
                llama_70b_energy,
                llama_8b_analysis,
                llama_8b_usage,
                llama_8b_energy,
            }),
        ))
    }

    /// Collapses a per-model result into (analysis text, usage, energy).
    /// Failures become inline error text with null usage.
    fn per_model_outcome(
        result: Result<ModelResponse, promptforge_abstraction::ModelError>,
        model_id: &str,
    ) -> (String, Option<ModelUsage>, f64) {
        match result {
            Ok(response) => {
                let energy = estimate_energy_wh(response.usage.as_ref(), model_id);
                (response.content, response.usage, energy)
            }
            Err(e) => {
                warn!(model_id = %model_id, error = %e, "Model analysis call failed");
                (format!("Error: {e}"), None, 0.0)
            }
        }
    }

    // ---- Stage 3: Optimize -----------------------------------------------

    /// Asks the reference model to critique the two analyses, then to emit an
    /// improved prompt template.
    ///
    /// Missing provider B credential substitutes the deterministic stub; any
    /// live-call failure produces a `success = false` report, which halts the
    /// pipeline.
    pub async fn optimize(
        &self,
        analysis: &AnalysisBundle,
    ) -> Result<StageReport, WorkflowError> {
        let mock = !self.registry.has_credential(Provider::OpenAi);
        info!(mock, "Stage 3: optimizing prompt");

        let reference = if mock {
            fallback::optimization_stub(&self.lineup)
        } else {
            self.registry.client(Provider::OpenAi, &self.lineup.reference_model)?
        };

        let comparison_prompt = self.build_comparison_prompt(
            &analysis.llama_70b_analysis,
            &analysis.llama_8b_analysis,
        );

        let mut messages = vec![ChatMessage::user(comparison_prompt)];
        let critique = match reference
            .generate_chat_completion(&messages, Some(ModelParameters::bounded(3000, 0.3)))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Prompt comparison call failed");
                return Ok(StageReport::failure(format!("Prompt optimization failed: {e}")));
            }
        };

        messages.push(ChatMessage::assistant(critique.content));
        messages.push(ChatMessage::user(format!(
            "Please provide the improved prompt only. IMPORTANT: In the improved prompt, use \
             the placeholder {PROFILE_MARKER} exactly where the professor profiles should be \
             inserted. Do NOT include the actual profiles in your response."
        )));

        let improved = match reference
            .generate_chat_completion(&messages, Some(ModelParameters::bounded(1000, 0.3)))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Improved prompt call failed");
                return Ok(StageReport::failure(format!("Prompt optimization failed: {e}")));
            }
        };

        let improved_prompt = clean_improved_prompt(&improved.content);
        let comparison_energy =
            estimate_energy_wh(improved.usage.as_ref(), &self.lineup.reference_model);

        let message = if mock {
            format!("Prompt optimization completed{MOCK_SUFFIX}")
        } else {
            "Prompt optimization completed".to_string()
        };

        Ok(StageReport::success(
            message,
            StageData::Optimization(PromptOptimization {
                original_prompt: self.task_prompt.clone(),
                improved_prompt,
                comparison_usage: improved.usage,
                comparison_energy,
                improvements: IMPROVEMENTS.iter().map(ToString::to_string).collect(),
            }),
        ))
    }

    fn build_comparison_prompt(&self, response_a: &str, response_b: &str) -> String {
        format!(
            "You are an expert in prompt engineering and AI model optimization. I have two \
             responses to the same prompt from different AI models:\n\n\
             ORIGINAL PROMPT:\n{}\n\n\
             RESPONSE A:\n{response_a}\n\n\
             RESPONSE B:\n{response_b}\n\n\
             Please analyze these responses and:\n\n\
             1. Identify the key differences in quality, depth, and structure between the two \
             responses\n\
             2. Determine what specific aspects of response B could be improved\n\n\
             Focus on making the prompt more specific, providing better structure guidance, and \
             addressing any weaknesses you observe in response B.",
            self.task_prompt
        )
    }

    // ---- Stage 4: Validate -----------------------------------------------

    /// Trials the improved prompt on the small model and, when a baseline is
    /// available, asks the reference model for a closeness verdict.
    ///
    /// Missing credentials or an absent baseline degrade gracefully; only a
    /// failed trial run fails the stage.
    pub async fn validate(
        &self,
        improved_prompt: &str,
        baseline: Option<&AnalysisBundle>,
    ) -> Result<StageReport, WorkflowError> {
        let mock = !(self.registry.has_credential(Provider::Novita)
            && self.registry.has_credential(Provider::OpenAi));
        info!(mock, "Stage 4: testing improved prompt");

        let (small, reference) = if mock {
            fallback::validation_stubs(&self.lineup)
        } else {
            (
                self.registry.client(Provider::Novita, &self.lineup.small_model)?,
                self.registry.client(Provider::OpenAi, &self.lineup.reference_model)?,
            )
        };

        let formatted = match render_template(improved_prompt, &self.profiles) {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!(error = %e, "Improved prompt could not be rendered");
                return Ok(StageReport::failure(format!("Improved prompt testing failed: {e}")));
            }
        };

        let trial = match small
            .generate_text(&formatted, Some(ModelParameters::bounded(2000, 0.7)))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Improved prompt trial run failed");
                return Ok(StageReport::failure(format!("Improved prompt testing failed: {e}")));
            }
        };

        let evaluation = match baseline.filter(|b| !b.llama_70b_analysis.is_empty()) {
            Some(bundle) => {
                self.evaluate_closeness(&reference, &bundle.llama_70b_analysis, &trial.content)
                    .await
            }
            None => EVALUATION_SKIPPED.to_string(),
        };

        let energy = estimate_energy_wh(trial.usage.as_ref(), &self.lineup.small_model);
        let message = if mock {
            format!("Improved prompt testing completed{MOCK_SUFFIX}")
        } else {
            "Improved prompt testing completed".to_string()
        };

        Ok(StageReport::success(
            message,
            StageData::Validation(ValidationOutcome {
                improved_prompt: improved_prompt.to_string(),
                improved_output: trial.content,
                evaluation,
                usage: trial.usage,
                energy,
            }),
        ))
    }

    /// Asks the reference model whether the new output is satisfactorily
    /// close to the baseline. Failures degrade to inline text; the stage is
    /// not failed over an evaluation error.
    async fn evaluate_closeness(
        &self,
        reference: &Arc<dyn Model>,
        baseline: &str,
        candidate: &str,
    ) -> String {
        let prompt = format!(
            "You are an expert academic reviewer. Below are two AI-generated analyses of \
             professor profiles.\n\n\
             RESPONSE A (baseline):\n{baseline}\n\n\
             RESPONSE B (improved prompt):\n{candidate}\n\n\
             Is RESPONSE B satisfactorily close in quality, depth, and structure to RESPONSE A? \
             Prioritize information retention and similar formatting."
        );

        match reference.generate_text(&prompt, Some(ModelParameters::bounded(3000, 0.2))).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Evaluation call failed");
                format!("Evaluation failed: {e}")
            }
        }
    }

    // ---- Driver ----------------------------------------------------------

    /// Resets the run and arms the first step.
    pub fn start(&self, run: &mut WorkflowRun) {
        info!("Workflow started");
        run.reset();
        run.current_step = Some(StepId::Profiles);
    }

    /// Executes one pipeline step against the run.
    ///
    /// Preconditions are enforced before the stage is attempted; a violated
    /// precondition leaves the run untouched. A stage reporting
    /// `success = false` is returned as-is without advancing the run.
    pub async fn execute_step(
        &self,
        run: &mut WorkflowRun,
        step: StepId,
    ) -> Result<StageReport, WorkflowError> {
        let report = match step {
            StepId::Profiles => self.collect_profiles()?,
            StepId::Analysis => {
                let satisfied = successful_data(run, StepId::Profiles)
                    .and_then(StageData::as_profiles)
                    .is_some();
                if !satisfied {
                    return Err(missing_predecessor(step, StepId::Profiles));
                }
                self.analyze().await?
            }
            StepId::Optimization => {
                let bundle = successful_data(run, StepId::Analysis)
                    .and_then(StageData::as_analysis)
                    .cloned()
                    .ok_or_else(|| missing_predecessor(step, StepId::Analysis))?;
                self.optimize(&bundle).await?
            }
            StepId::Results => {
                let improved = successful_data(run, StepId::Optimization)
                    .and_then(StageData::as_optimization)
                    .map(|opt| opt.improved_prompt.clone())
                    .ok_or_else(|| missing_predecessor(step, StepId::Optimization))?;
                self.validate(&improved, run.analysis_results.as_ref()).await?
            }
        };

        if report.success {
            run.record(step, report.clone());
        }
        Ok(report)
    }

    /// Read-only snapshot of the run.
    #[must_use]
    pub fn status(&self, run: &WorkflowRun) -> StatusSnapshot {
        StatusSnapshot::from(run)
    }
}

/// The payload of a step's successful report, if any.
fn successful_data(run: &WorkflowRun, step: StepId) -> Option<&StageData> {
    run.report(step).filter(|report| report.success).and_then(|report| report.data.as_ref())
}

fn missing_predecessor(step: StepId, predecessor: StepId) -> WorkflowError {
    WorkflowError::Precondition {
        step,
        requirement: format!("a completed '{predecessor}' step"),
    }
}

/// Trims surrounding whitespace, then a single layer of enclosing quote
/// characters (one pair of `"`, then one pair of `'`).
#[must_use]
pub fn clean_improved_prompt(raw: &str) -> String {
    let mut cleaned = raw.trim();
    for quote in ['"', '\''] {
        if cleaned.len() >= 2 && cleaned.starts_with(quote) && cleaned.ends_with(quote) {
            cleaned = &cleaned[1..cleaned.len() - 1];
        }
    }
    cleaned.to_string()
}
