//! Deterministic fallback content for mock mode.
//!
//! When a stage's required credential is absent, the engine swaps the live
//! clients for scripted stubs built here. Content and token counts are fixed;
//! energy figures are derived from the canned usage by the real estimator, so
//! the mock and live paths share the same derivation logic. Everything here
//! is byte-identical across invocations.

use crate::config::ModelLineup;
use promptforge_abstraction::{Model, ModelUsage};
use promptforge_models::{StubModel, StubTurn};
use std::sync::Arc;

/// Fixed large-model analysis text.
pub const MOCK_LARGE_ANALYSIS: &str = "Mock analysis: Comprehensive analysis of professor \
research interests and collaboration opportunities. The professors show strong potential for \
interdisciplinary collaboration in machine learning, statistics, and econometrics.";

/// Fixed small-model analysis text.
pub const MOCK_SMALL_ANALYSIS: &str = "Mock analysis: Detailed breakdown of research focus \
areas and potential interdisciplinary projects. Key areas include high-dimensional statistics, \
causal inference, and network modeling.";

/// Fixed first-turn critique from the reference model.
pub const MOCK_COMPARISON_CRITIQUE: &str = "Mock comparison: Response A retains more detail \
and a clearer structure than response B. The prompt should request explicit headings, concise \
per-professor summaries, and concrete collaboration proposals.";

/// Fixed improved prompt. Carries the literal `{profiles}` marker and no
/// inline profile text.
pub const MOCK_IMPROVED_PROMPT: &str = "You are an expert academic researcher specializing in interdisciplinary collaboration analysis. Please analyze the following professor profiles with a focus on:

1. **Research Focus Summary**: Provide a concise one-sentence summary of each professor's primary research focus
2. **Collaboration Opportunities**: Identify 3-4 specific collaboration projects with clear research questions
3. **Emerging Trends**: Highlight 2-3 emerging research trends in their combined fields
4. **Implementation Strategy**: Suggest practical steps for initiating these collaborations

Format your response with clear headings and bullet points for easy reading. Focus on actionable insights that would be valuable for academic planning and research strategy.

Professor profiles:
{profiles}";

/// Fixed trial-run output for the improved prompt.
pub const MOCK_IMPROVED_OUTPUT: &str = "Mock output: The improved prompt shows better \
structure and more specific guidance. The analysis reveals strong collaboration opportunities \
between the professors in machine learning, statistics, and econometrics research areas.";

/// Fixed evaluation verdict.
pub const MOCK_EVALUATION: &str = "Mock evaluation: The improved prompt produces responses \
that are satisfactorily close in quality to the baseline, with better structure and more \
actionable insights.";

/// Canned usage for the large-model analysis call (350 total).
pub const MOCK_LARGE_USAGE: ModelUsage = ModelUsage::new(200, 150);

/// Canned usage for the small-model analysis call (320 total).
pub const MOCK_SMALL_USAGE: ModelUsage = ModelUsage::new(200, 120);

/// Canned usage for the critique turn.
pub const MOCK_CRITIQUE_USAGE: ModelUsage = ModelUsage::new(500, 300);

/// Canned usage for the improved-prompt turn (700 total).
pub const MOCK_COMPARISON_USAGE: ModelUsage = ModelUsage::new(500, 200);

/// Canned usage for the improved-prompt trial run (350 total).
pub const MOCK_VALIDATION_USAGE: ModelUsage = ModelUsage::new(250, 100);

/// Canned usage for the evaluation verdict.
pub const MOCK_EVALUATION_USAGE: ModelUsage = ModelUsage::new(400, 80);

/// Stub pair for the analysis stage: (large, small).
#[must_use]
pub fn analysis_stubs(lineup: &ModelLineup) -> (Arc<dyn Model>, Arc<dyn Model>) {
    (
        Arc::new(StubModel::single(
            lineup.large_model.clone(),
            StubTurn::new(MOCK_LARGE_ANALYSIS, MOCK_LARGE_USAGE),
        )),
        Arc::new(StubModel::single(
            lineup.small_model.clone(),
            StubTurn::new(MOCK_SMALL_ANALYSIS, MOCK_SMALL_USAGE),
        )),
    )
}

/// Scripted two-turn stub for the optimization stage: critique first, then
/// the improved prompt.
#[must_use]
pub fn optimization_stub(lineup: &ModelLineup) -> Arc<dyn Model> {
    Arc::new(StubModel::scripted(
        lineup.reference_model.clone(),
        vec![
            StubTurn::new(MOCK_COMPARISON_CRITIQUE, MOCK_CRITIQUE_USAGE),
            StubTurn::new(MOCK_IMPROVED_PROMPT, MOCK_COMPARISON_USAGE),
        ],
    ))
}

/// Stub pair for the validation stage: (small trial model, reference judge).
#[must_use]
pub fn validation_stubs(lineup: &ModelLineup) -> (Arc<dyn Model>, Arc<dyn Model>) {
    (
        Arc::new(StubModel::single(
            lineup.small_model.clone(),
            StubTurn::new(MOCK_IMPROVED_OUTPUT, MOCK_VALIDATION_USAGE),
        )),
        Arc::new(StubModel::single(
            lineup.reference_model.clone(),
            StubTurn::new(MOCK_EVALUATION, MOCK_EVALUATION_USAGE),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{default_profiles, PROFILE_MARKER};

    #[test]
    fn test_mock_improved_prompt_is_marker_only() {
        assert!(MOCK_IMPROVED_PROMPT.contains(PROFILE_MARKER));
        for profile in default_profiles() {
            assert!(!MOCK_IMPROVED_PROMPT.contains(profile.as_str()));
        }
    }

    #[test]
    fn test_canned_usage_totals() {
        assert_eq!(MOCK_LARGE_USAGE.total_tokens, 350);
        assert_eq!(MOCK_SMALL_USAGE.total_tokens, 320);
        assert_eq!(MOCK_COMPARISON_USAGE.total_tokens, 700);
        assert_eq!(MOCK_VALIDATION_USAGE.total_tokens, 350);
    }
}
