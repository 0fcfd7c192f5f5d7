use serde::{Deserialize, Serialize};

/// Reason attached to verdicts produced by the local pattern filter
pub const FORBIDDEN_CONTENT_REASON: &str = "Contains forbidden content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Map a classifier score in `[0, 1]` to a severity
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Severity::High
        } else if score > 0.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Outcome of one moderation check. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl ModerationVerdict {
    pub fn safe() -> Self {
        Self {
            flagged: false,
            reason: None,
            severity: None,
            categories: None,
        }
    }

    /// Verdict for text caught by the local pattern filter
    pub fn forbidden_content() -> Self {
        Self {
            flagged: true,
            reason: Some(FORBIDDEN_CONTENT_REASON.to_string()),
            severity: Some(Severity::High),
            categories: None,
        }
    }

    pub fn flagged(categories: Vec<String>, severity: Severity) -> Self {
        Self {
            flagged: true,
            reason: Some(format!("Flagged for: {}", categories.join(", "))),
            severity: Some(severity),
            categories: Some(categories),
        }
    }
}

/// Which moderation path applies to a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    /// Content is an image URL
    Image,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::from_score(0.9), Severity::High);
        assert_eq!(Severity::from_score(0.6), Severity::Medium);
        assert_eq!(Severity::from_score(0.3), Severity::Low);
        // Thresholds are exclusive
        assert_eq!(Severity::from_score(0.8), Severity::Medium);
        assert_eq!(Severity::from_score(0.5), Severity::Low);
    }

    #[test]
    fn test_safe_verdict_serializes_compactly() {
        let json = serde_json::to_value(ModerationVerdict::safe()).unwrap();
        assert_eq!(json, serde_json::json!({ "flagged": false }));
    }

    #[test]
    fn test_forbidden_content_verdict() {
        let json = serde_json::to_value(ModerationVerdict::forbidden_content()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "flagged": true,
                "reason": "Contains forbidden content",
                "severity": "high"
            })
        );
    }
}
