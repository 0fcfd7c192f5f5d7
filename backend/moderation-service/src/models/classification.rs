use serde::Deserialize;

/// Normalized reply of a text classifier.
///
/// Categories keep the classifier's own ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextClassification {
    pub flagged: bool,
    pub categories: Vec<(String, bool)>,
    pub category_scores: Vec<(String, f64)>,
}

impl TextClassification {
    /// Names of the categories the classifier marked, in classifier order
    pub fn flagged_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|(_, flagged)| *flagged)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Highest score across every returned category
    pub fn max_score(&self) -> f64 {
        self.category_scores
            .iter()
            .map(|(_, score)| *score)
            .fold(0.0, f64::max)
    }
}

/// JSON verdict the vision model is asked to reply with
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageAssessment {
    pub appropriate: bool,
    #[serde(default)]
    pub reason: String,
}
