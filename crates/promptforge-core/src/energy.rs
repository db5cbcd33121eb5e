//! Energy estimation from token usage.
//!
//! A pure derivation used as a proxy sustainability metric: estimated
//! watt-hours are total tokens times a fixed per-family constant. The same
//! function serves the live and stub paths so both derive energy the same way.

use promptforge_abstraction::ModelUsage;

/// Wh per token for the large/general model family (GPT-class).
pub const WH_PER_TOKEN_GENERAL: f64 = 7.0 / 1000.0;

/// Wh per token for the small/efficient model family (open Llama-class).
pub const WH_PER_TOKEN_EFFICIENT: f64 = 2.0 / 1000.0;

/// Model family, classified from the model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Large general-purpose family, billed at the higher rate.
    General,
    /// Efficient family, the default when no general-family marker is found.
    Efficient,
}

impl ModelFamily {
    /// Classifies a model identifier by case-insensitive substring match.
    #[must_use]
    pub fn classify(model_id: &str) -> Self {
        if model_id.to_lowercase().contains("gpt") {
            Self::General
        } else {
            Self::Efficient
        }
    }

    /// The Wh-per-token rate for this family.
    #[must_use]
    pub const fn rate(self) -> f64 {
        match self {
            Self::General => WH_PER_TOKEN_GENERAL,
            Self::Efficient => WH_PER_TOKEN_EFFICIENT,
        }
    }
}

/// Estimates energy consumption in Wh for a completed model call.
///
/// Returns 0.0 when usage is absent or reports no tokens.
#[must_use]
pub fn estimate_energy_wh(usage: Option<&ModelUsage>, model_id: &str) -> f64 {
    match usage {
        Some(u) if u.total_tokens > 0 => {
            f64::from(u.total_tokens) * ModelFamily::classify(model_id).rate()
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(ModelFamily::classify("gpt-4"), ModelFamily::General);
        assert_eq!(ModelFamily::classify("GPT-4o"), ModelFamily::General);
        assert_eq!(
            ModelFamily::classify("meta-llama/llama-3.1-8b-instruct"),
            ModelFamily::Efficient
        );
        assert_eq!(ModelFamily::classify("mistral-7b"), ModelFamily::Efficient);
    }

    #[test]
    fn test_absent_usage_is_zero() {
        assert_eq!(estimate_energy_wh(None, "gpt-4"), 0.0);
        let empty = ModelUsage::new(0, 0);
        assert_eq!(estimate_energy_wh(Some(&empty), "gpt-4"), 0.0);
    }

    #[test]
    fn test_rates_by_family() {
        let usage = ModelUsage::new(500, 200);
        assert_eq!(estimate_energy_wh(Some(&usage), "gpt-4"), 700.0 * WH_PER_TOKEN_GENERAL);
        assert_eq!(
            estimate_energy_wh(Some(&usage), "meta-llama/llama-3.3-70b-instruct"),
            700.0 * WH_PER_TOKEN_EFFICIENT
        );
    }

    #[test]
    fn test_monotone_in_total_tokens() {
        let mut last = 0.0;
        for total in [1_u32, 10, 100, 1000, 10_000] {
            let usage = ModelUsage::new(total, 0);
            let energy = estimate_energy_wh(Some(&usage), "gpt-4");
            assert!(energy >= last);
            last = energy;
        }
    }
}
