//! Error types for the workflow execution core.

use crate::report::StepId;
use promptforge_abstraction::ModelError;
use thiserror::Error;

/// Errors surfaced by the workflow driver and stage functions.
#[derive(Error, Debug, Clone)]
pub enum WorkflowError {
    /// A stage was invoked before its required predecessor data exists.
    /// The stage is not attempted and the run state is left untouched.
    #[error("step '{step}' requires {requirement}")]
    Precondition {
        /// The step that was refused.
        step: StepId,
        /// What was missing.
        requirement: String,
    },

    /// The prompt template is missing its `{profiles}` substitution marker.
    #[error("Template error: {0}")]
    Template(String),

    /// The step identifier is not one of the four pipeline steps.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// A model backend error that was not recovered at stage level.
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_display() {
        let err = WorkflowError::Precondition {
            step: StepId::Analysis,
            requirement: "a completed 'profiles' step".to_string(),
        };
        assert_eq!(err.to_string(), "step 'analysis' requires a completed 'profiles' step");
    }

    #[test]
    fn test_model_error_conversion() {
        let err: WorkflowError =
            ModelError::RequestError("timed out".to_string()).into();
        assert!(matches!(err, WorkflowError::Model(_)));
    }
}
