use serde::{Deserialize, Serialize};

// ==============================================================================
// Sentiment Alert Decision
// ==============================================================================

/// Which sentiment rule produced an alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SentimentAlertKind {
    PositiveToNegative,
    NeutralToVeryNegative,
    SignificantDrop,
}

/// Outcome of comparing the current sentiment with the previous snapshot.
/// `reason` and `kind` are present iff `should_alert` is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertDecision {
    pub should_alert: bool,
    pub reason: Option<String>,
    pub kind: Option<SentimentAlertKind>,
}

impl AlertDecision {
    pub fn none() -> Self {
        Self {
            should_alert: false,
            reason: None,
            kind: None,
        }
    }

    pub fn fire(kind: SentimentAlertKind, reason: String) -> Self {
        Self {
            should_alert: true,
            reason: Some(reason),
            kind: Some(kind),
        }
    }
}

// ==============================================================================
// Severity
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    /// Severity of a sentiment alert, derived from the current score.
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            AlertSeverity::High
        } else if score < 0.4 {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fired sentiment alert attached to a dashboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentAlert {
    pub kind: SentimentAlertKind,
    pub reason: String,
    pub severity: AlertSeverity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_score() {
        assert_eq!(AlertSeverity::from_score(0.2), AlertSeverity::High);
        assert_eq!(AlertSeverity::from_score(0.35), AlertSeverity::Medium);
        assert_eq!(AlertSeverity::from_score(0.5), AlertSeverity::Low);
    }

    #[test]
    fn test_decision_constructors() {
        let none = AlertDecision::none();
        assert!(!none.should_alert);
        assert!(none.reason.is_none());

        let fired = AlertDecision::fire(SentimentAlertKind::SignificantDrop, "drop".into());
        assert!(fired.should_alert);
        assert_eq!(fired.reason.as_deref(), Some("drop"));
    }
}
