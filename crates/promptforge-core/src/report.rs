//! Stage identifiers and the tagged stage-result types.
//!
//! Each stage produces its own payload shape; consumers pattern-match on the
//! `StageData` variant instead of branching on string keys. The serialized
//! field names preserve the service's original wire format: camelCase for the
//! collection/optimization/validation payloads, snake_case inside the
//! analysis bundle.

use chrono::{DateTime, Utc};
use promptforge_abstraction::ModelUsage;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the four ordered pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    /// Stage 1: collect and format the profiles.
    Profiles,
    /// Stage 2: multi-model analysis.
    Analysis,
    /// Stage 3: prompt optimization.
    Optimization,
    /// Stage 4: validate the improved prompt.
    Results,
}

impl StepId {
    /// The canonical execution order.
    pub const ORDER: [Self; 4] =
        [Self::Profiles, Self::Analysis, Self::Optimization, Self::Results];

    /// The stable string identifier used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Analysis => "analysis",
            Self::Optimization => "optimization",
            Self::Results => "results",
        }
    }

    /// The step that follows this one, or `None` after the last.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Profiles => Some(Self::Analysis),
            Self::Analysis => Some(Self::Optimization),
            Self::Optimization => Some(Self::Results),
            Self::Results => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profiles" => Ok(Self::Profiles),
            "analysis" => Ok(Self::Analysis),
            "optimization" => Ok(Self::Optimization),
            "results" => Ok(Self::Results),
            _ => Err(()),
        }
    }
}

/// Stage 1 output: the profile set and the materialized prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCollection {
    /// The fixed ordered profile texts.
    pub profiles: Vec<String>,
    /// Number of profiles.
    pub profile_count: usize,
    /// The original template with `{profiles}` substituted.
    pub formatted_prompt: String,
}

/// Stage 2 output: one analysis per configured model.
///
/// A failed model call leaves an inline `Error: …` text in its analysis field
/// and a null usage; the bundle itself is still produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisBundle {
    /// Large-model analysis text (or inline error).
    pub llama_70b_analysis: String,
    /// Large-model token usage; absent on failure.
    pub llama_70b_usage: Option<ModelUsage>,
    /// Large-model energy estimate in Wh.
    pub llama_70b_energy: f64,
    /// Small-model analysis text (or inline error).
    pub llama_8b_analysis: String,
    /// Small-model token usage; absent on failure.
    pub llama_8b_usage: Option<ModelUsage>,
    /// Small-model energy estimate in Wh.
    pub llama_8b_energy: f64,
}

/// Stage 3 output: the improved prompt and comparison accounting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOptimization {
    /// The template the pipeline started from.
    pub original_prompt: String,
    /// The improved template; always contains the `{profiles}` marker and
    /// never inline profile text.
    pub improved_prompt: String,
    /// Usage of the improved-prompt turn.
    pub comparison_usage: Option<ModelUsage>,
    /// Energy estimate for that turn, in Wh.
    pub comparison_energy: f64,
    /// Fixed descriptive list of improvement themes.
    pub improvements: Vec<String>,
}

/// Stage 4 output: the improved prompt's trial run and its evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// The prompt under test.
    pub improved_prompt: String,
    /// The small model's output for the improved prompt.
    pub improved_output: String,
    /// Free-text verdict, or a fixed skipped/failed notice.
    pub evaluation: String,
    /// Token usage of the trial run.
    pub usage: Option<ModelUsage>,
    /// Energy estimate for the trial run, in Wh.
    pub energy: f64,
}

/// Tagged stage payload. The serialized form is the bare payload object,
/// matching the original per-stage `data` shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageData {
    /// Stage 1 payload.
    Profiles(ProfileCollection),
    /// Stage 2 payload.
    Analysis(AnalysisBundle),
    /// Stage 3 payload.
    Optimization(PromptOptimization),
    /// Stage 4 payload.
    Validation(ValidationOutcome),
}

impl StageData {
    /// The stage 1 payload, if this is one.
    #[must_use]
    pub fn as_profiles(&self) -> Option<&ProfileCollection> {
        match self {
            Self::Profiles(data) => Some(data),
            _ => None,
        }
    }

    /// The stage 2 payload, if this is one.
    #[must_use]
    pub fn as_analysis(&self) -> Option<&AnalysisBundle> {
        match self {
            Self::Analysis(data) => Some(data),
            _ => None,
        }
    }

    /// The stage 3 payload, if this is one.
    #[must_use]
    pub fn as_optimization(&self) -> Option<&PromptOptimization> {
        match self {
            Self::Optimization(data) => Some(data),
            _ => None,
        }
    }

    /// The stage 4 payload, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationOutcome> {
        match self {
            Self::Validation(data) => Some(data),
            _ => None,
        }
    }
}

/// The uniform envelope every stage call returns.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    /// Whether the stage ran to completion.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// The stage payload; absent on failure.
    pub data: Option<StageData>,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
}

impl StageReport {
    /// Creates a successful report.
    #[must_use]
    pub fn success(message: impl Into<String>, data: StageData) -> Self {
        Self { success: true, message: message.into(), data: Some(data), timestamp: Utc::now() }
    }

    /// Creates a failed report with no payload.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None, timestamp: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_and_successors() {
        assert_eq!(StepId::Profiles.successor(), Some(StepId::Analysis));
        assert_eq!(StepId::Analysis.successor(), Some(StepId::Optimization));
        assert_eq!(StepId::Optimization.successor(), Some(StepId::Results));
        assert_eq!(StepId::Results.successor(), None);
    }

    #[test]
    fn test_step_id_round_trip() {
        for step in StepId::ORDER {
            assert_eq!(StepId::from_str(step.as_str()), Ok(step));
        }
        assert_eq!(StepId::from_str("bogus"), Err(()));
    }

    #[test]
    fn test_profile_collection_wire_casing() {
        let data = ProfileCollection {
            profiles: vec!["p".to_string()],
            profile_count: 1,
            formatted_prompt: "fp".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("profileCount").is_some());
        assert!(json.get("formattedPrompt").is_some());
    }

    #[test]
    fn test_analysis_bundle_wire_casing() {
        let data = AnalysisBundle {
            llama_70b_analysis: "a".to_string(),
            llama_70b_usage: None,
            llama_70b_energy: 0.0,
            llama_8b_analysis: "b".to_string(),
            llama_8b_usage: None,
            llama_8b_energy: 0.0,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("llama_70b_analysis").is_some());
        assert!(json.get("llama_8b_usage").is_some());
    }

    #[test]
    fn test_stage_data_accessors() {
        let data = StageData::Optimization(PromptOptimization {
            original_prompt: "o".to_string(),
            improved_prompt: "i".to_string(),
            comparison_usage: None,
            comparison_energy: 0.0,
            improvements: vec![],
        });
        assert!(data.as_optimization().is_some());
        assert!(data.as_analysis().is_none());
        assert!(data.as_profiles().is_none());
        assert!(data.as_validation().is_none());
    }
}
