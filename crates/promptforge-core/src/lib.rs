//! Workflow execution core for PromptForge.
//!
//! A sequential, stateful, partially-resumable pipeline that collects textual
//! profiles, sends them to multiple LLM backends, compares the outputs, and
//! synthesizes an improved prompt before validating it. Stages run one code
//! path whether credentials are configured or not; when a required credential
//! is absent the engine swaps in a deterministic stub backend.

pub mod config;
pub mod energy;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod profiles;
pub mod report;
pub mod state;

pub use config::ModelLineup;
pub use energy::{estimate_energy_wh, ModelFamily, WH_PER_TOKEN_EFFICIENT, WH_PER_TOKEN_GENERAL};
pub use engine::{clean_improved_prompt, WorkflowEngine, EVALUATION_SKIPPED};
pub use error::WorkflowError;
pub use profiles::{
    default_profiles, join_profiles, render_template, ORIGINAL_TASK_PROMPT, PROFILE_MARKER,
};
pub use report::{
    AnalysisBundle, ProfileCollection, PromptOptimization, StageData, StageReport, StepId,
    ValidationOutcome,
};
pub use state::{StatusSnapshot, WorkflowRun};
