//! Model lineup configuration for the pipeline call sites.

use serde::Serialize;

/// The three model identities the pipeline talks to.
#[derive(Debug, Clone, Serialize)]
pub struct ModelLineup {
    /// Large analysis model (provider A).
    pub large_model: String,
    /// Small analysis/trial model (provider A).
    pub small_model: String,
    /// Reference model used for comparison and evaluation (provider B).
    pub reference_model: String,
}

impl Default for ModelLineup {
    fn default() -> Self {
        Self {
            large_model: "meta-llama/llama-3.3-70b-instruct".to_string(),
            small_model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            reference_model: "gpt-4".to_string(),
        }
    }
}
