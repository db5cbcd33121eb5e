//! The fixed profile dataset and prompt template handling.
//!
//! Profiles are an immutable, ordered sequence for this deployment. The task
//! prompt template carries exactly one `{profiles}` substitution marker;
//! rendering joins the profiles with a blank-line separator in sequence order.

use crate::error::WorkflowError;

/// The substitution marker every prompt template must carry.
pub const PROFILE_MARKER: &str = "{profiles}";

/// The original task prompt, before any optimization.
pub const ORIGINAL_TASK_PROMPT: &str = "
You are an expert academic researcher. Please analyze the following professor profiles and provide:

1. A summary of each professor's research focus
2. Potential collaboration opportunities between them
3. Emerging research trends in their fields
4. Recommendations for interdisciplinary research projects

Here are the professor profiles:

{profiles}

Please provide a comprehensive analysis that would be valuable for academic planning and research strategy.
";

/// The professor profiles analyzed by this deployment.
#[must_use]
pub fn default_profiles() -> Vec<String> {
    vec![
        r"Matias Cattaneo
Position
Professor
Website
Matias Cattaneo's Site
Office Phone
(609) 258-8825
Email
cattaneo@princeton.edu
Office
230 - Sherrerd Hall
Bio/Description
Research Interests: Econometrics, statistics, machine learning, data science, causal inference, program evaluation, quantitative methods in the social, behavioral and biomedical sciences."
            .to_string(),
        r"Jianqing Fan
Position
Frederick L. Moore Professor in Finance
Website
Jianqing Fan's Site
Office Phone
(609) 258-7924
Email
jqfan@princeton.edu
Office
205 - Sherrerd Hall
Bio/Description
Research Interests: High-dimensional statistics, Machine Learning, financial econometrics, computational biology, biostatistics, graphical and network modeling, portfolio theory, high-frequency finance, time series."
            .to_string(),
        r"Jason Klusowski
Position
Assistant Professor
Website
Jason Klusowski's Site
Office Phone
(609) 258-5305
Email
jason.klusowski@princeton.edu
Office
327 - Sherrerd Hall
Bio/Description
Research Interests: Data science, statistical learning, deep learning, decision tree learning; high-dimensional statistics, information theory, statistical physics, network modeling"
            .to_string(),
    ]
}

/// Joins profiles with a blank-line separator, preserving sequence order.
#[must_use]
pub fn join_profiles(profiles: &[String]) -> String {
    profiles.join("\n\n")
}

/// Renders a prompt template by substituting the `{profiles}` marker.
///
/// # Errors
/// Returns `WorkflowError::Template` if the template does not contain the
/// marker.
pub fn render_template(template: &str, profiles: &[String]) -> Result<String, WorkflowError> {
    if !template.contains(PROFILE_MARKER) {
        return Err(WorkflowError::Template(format!(
            "template is missing the {PROFILE_MARKER} marker"
        )));
    }
    Ok(template.replace(PROFILE_MARKER, &join_profiles(profiles)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_are_three_in_order() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), 3);
        assert!(profiles[0].starts_with("Matias Cattaneo"));
        assert!(profiles[1].starts_with("Jianqing Fan"));
        assert!(profiles[2].starts_with("Jason Klusowski"));
    }

    #[test]
    fn test_join_profiles_blank_line_separator() {
        let profiles = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(join_profiles(&profiles), "a\n\nb\n\nc");
    }

    #[test]
    fn test_render_substitutes_every_profile() {
        let profiles = default_profiles();
        let rendered = render_template(ORIGINAL_TASK_PROMPT, &profiles).unwrap();
        for profile in &profiles {
            assert!(rendered.contains(profile.as_str()));
        }
        assert!(!rendered.contains(PROFILE_MARKER));
    }

    #[test]
    fn test_render_without_marker_is_a_template_error() {
        let err = render_template("no marker here", &default_profiles()).unwrap_err();
        assert!(matches!(err, WorkflowError::Template(_)));
    }
}
