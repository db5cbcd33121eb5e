//! Workflow run state.
//!
//! A `WorkflowRun` is an explicit run-context object owned by the caller and
//! passed to every driver call; nothing in the crate holds hidden global
//! state. It is never persisted and is lost on process restart.

use crate::report::{AnalysisBundle, StageData, StageReport, StepId};
use serde::Serialize;
use std::collections::HashMap;

/// Mutable record tracking pipeline progress across stage invocations.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    /// The step expected next, or `None` before start / after completion.
    pub current_step: Option<StepId>,
    /// Completed steps, always a prefix of the canonical order.
    pub completed_steps: Vec<StepId>,
    /// Set iff the optimization stage has completed successfully.
    pub optimized_prompt: Option<String>,
    /// The analysis bundle, kept for the validation stage's baseline.
    pub analysis_results: Option<AnalysisBundle>,
    /// Stage reports keyed by step.
    pub workflow_results: HashMap<StepId, StageReport>,
}

impl WorkflowRun {
    /// Creates a fresh, unstarted run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the run to its initial values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The stored report for a step, if any.
    #[must_use]
    pub fn report(&self, step: StepId) -> Option<&StageReport> {
        self.workflow_results.get(&step)
    }

    /// Records a successful stage report and advances the run.
    ///
    /// Appends the step to `completed_steps` at most once, advances
    /// `current_step`, and captures the optimization/analysis artifacts the
    /// later stages depend on.
    pub fn record(&mut self, step: StepId, report: StageReport) {
        debug_assert!(report.success, "only successful reports advance the run");

        if let Some(data) = &report.data {
            match data {
                StageData::Analysis(bundle) => {
                    self.analysis_results = Some(bundle.clone());
                }
                StageData::Optimization(opt) => {
                    self.optimized_prompt = Some(opt.improved_prompt.clone());
                }
                StageData::Profiles(_) | StageData::Validation(_) => {}
            }
        }

        self.workflow_results.insert(step, report);
        if !self.completed_steps.contains(&step) {
            self.completed_steps.push(step);
        }
        self.current_step = step.successor();
    }

    /// Whether all four steps have completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        StepId::ORDER.iter().all(|step| self.completed_steps.contains(step))
    }
}

/// Read-only snapshot of a run, as returned by the status operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// The step expected next.
    pub current_step: Option<StepId>,
    /// Completed steps in order.
    pub completed_steps: Vec<StepId>,
    /// The improved prompt, once stage 3 has run.
    pub optimized_prompt: Option<String>,
    /// The stage 2 bundle, once stage 2 has run.
    pub analysis_results: Option<AnalysisBundle>,
    /// All stage reports so far.
    pub workflow_results: HashMap<StepId, StageReport>,
    /// True iff all four steps are complete.
    pub is_complete: bool,
}

impl From<&WorkflowRun> for StatusSnapshot {
    fn from(run: &WorkflowRun) -> Self {
        Self {
            current_step: run.current_step,
            completed_steps: run.completed_steps.clone(),
            optimized_prompt: run.optimized_prompt.clone(),
            analysis_results: run.analysis_results.clone(),
            workflow_results: run.workflow_results.clone(),
            is_complete: run.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ProfileCollection;

    fn profiles_report() -> StageReport {
        StageReport::success(
            "Profile collection completed",
            StageData::Profiles(ProfileCollection {
                profiles: vec!["p".to_string()],
                profile_count: 1,
                formatted_prompt: "fp".to_string(),
            }),
        )
    }

    #[test]
    fn test_record_advances_and_deduplicates() {
        let mut run = WorkflowRun::new();
        run.current_step = Some(StepId::Profiles);

        run.record(StepId::Profiles, profiles_report());
        assert_eq!(run.completed_steps, vec![StepId::Profiles]);
        assert_eq!(run.current_step, Some(StepId::Analysis));

        // Re-running a completed step must not duplicate it.
        run.record(StepId::Profiles, profiles_report());
        assert_eq!(run.completed_steps, vec![StepId::Profiles]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut run = WorkflowRun::new();
        run.record(StepId::Profiles, profiles_report());
        run.reset();
        assert!(run.current_step.is_none());
        assert!(run.completed_steps.is_empty());
        assert!(run.workflow_results.is_empty());
    }

    #[test]
    fn test_is_complete_requires_all_four() {
        let mut run = WorkflowRun::new();
        assert!(!run.is_complete());
        for step in StepId::ORDER {
            run.completed_steps.push(step);
        }
        assert!(run.is_complete());
    }
}
