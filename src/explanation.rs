// src/explanation.rs
use crate::config::ClientConfig;
use crate::utils::{fill_template, resource_url};

/// What the result-explanation modal shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationSource {
    /// Fetch the rendered explanation of this submission from the backend.
    Submission(u64),
    /// Explanation already rendered by the page.
    Rendered(String),
}

impl ExplanationSource {
    /// Dispatch on the JS value type: integral numbers are submission ids and
    /// strings are rendered content. A numeric string is content, not an id.
    pub fn from_js_parts(number: Option<f64>, text: Option<String>) -> Option<Self> {
        if let Some(text) = text {
            return Some(ExplanationSource::Rendered(text));
        }
        let number = number?;
        if number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number <= u64::MAX as f64 {
            Some(ExplanationSource::Submission(number as u64))
        } else {
            None
        }
    }

    pub fn url(&self, config: &ClientConfig) -> Option<String> {
        match self {
            ExplanationSource::Submission(id) => {
                let id = id.to_string();
                let path = fill_template(&config.explain_url, &[("submission", id.as_str())]);
                Some(resource_url(&config.site_prefix, &path))
            }
            ExplanationSource::Rendered(_) => None,
        }
    }

    /// Element id of the modal, unique per submission.
    pub fn dialog_id(&self) -> Option<String> {
        match self {
            ExplanationSource::Submission(id) => Some(format!("dialog-explain-{}", id)),
            ExplanationSource::Rendered(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_is_submission() {
        let source = ExplanationSource::from_js_parts(Some(315.0), None).unwrap();
        assert_eq!(source, ExplanationSource::Submission(315));
        assert_eq!(
            source.url(&ClientConfig::default()).as_deref(),
            Some("/lab/submission/315/explain/")
        );
        assert_eq!(source.dialog_id().as_deref(), Some("dialog-explain-315"));
    }

    #[test]
    fn test_string_is_rendered_content() {
        let source =
            ExplanationSource::from_js_parts(None, Some("<p>Case 1 failed</p>".to_string()))
                .unwrap();
        assert_eq!(source, ExplanationSource::Rendered("<p>Case 1 failed</p>".to_string()));
        assert_eq!(source.url(&ClientConfig::default()), None);
    }

    #[test]
    fn test_numeric_string_stays_content() {
        let source = ExplanationSource::from_js_parts(None, Some("42".to_string())).unwrap();
        assert_eq!(source, ExplanationSource::Rendered("42".to_string()));
    }

    #[test]
    fn test_unusable_values_are_rejected() {
        assert_eq!(ExplanationSource::from_js_parts(Some(1.5), None), None);
        assert_eq!(ExplanationSource::from_js_parts(Some(-3.0), None), None);
        assert_eq!(ExplanationSource::from_js_parts(Some(f64::NAN), None), None);
        assert_eq!(ExplanationSource::from_js_parts(None, None), None);
    }
}
