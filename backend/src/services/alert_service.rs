use chrono::{DateTime, Duration, Utc};

use crate::models::{
    AlertDecision, AlertSeverity, ScoredArticle, SentimentAlert, SentimentAlertKind, SentimentClass,
    SentimentSnapshot,
};

// ==============================================================================
// Sentiment change alerts
// ==============================================================================

const POSITIVE_DROP_THRESHOLD: f64 = 0.4;
const NEUTRAL_DROP_THRESHOLD: f64 = 0.3;
const SIGNIFICANT_DROP: f64 = 0.3;
// absorbs float noise, e.g. 0.8 - 0.5 == 0.30000000000000004
const DROP_EPSILON: f64 = 1e-9;

/// Compare the current sentiment with the latest snapshot in the lookback
/// window. Rules are checked in order and the first match wins.
pub fn decide(
    previous: Option<&SentimentSnapshot>,
    current_score: f64,
    current_class: SentimentClass,
) -> AlertDecision {
    let Some(previous) = previous else {
        return AlertDecision::none();
    };

    if previous.class == SentimentClass::Positive && current_score < POSITIVE_DROP_THRESHOLD {
        return AlertDecision::fire(
            SentimentAlertKind::PositiveToNegative,
            format!(
                "Sentiment for {} dropped from positive to negative (score {:.2}, now {})",
                previous.symbol, current_score, current_class
            ),
        );
    }

    if previous.class == SentimentClass::Neutral && current_score < NEUTRAL_DROP_THRESHOLD {
        return AlertDecision::fire(
            SentimentAlertKind::NeutralToVeryNegative,
            format!(
                "Sentiment for {} dropped from neutral to very negative (score {:.2})",
                previous.symbol, current_score
            ),
        );
    }

    let delta = previous.score - current_score;
    if delta > SIGNIFICANT_DROP + DROP_EPSILON {
        return AlertDecision::fire(
            SentimentAlertKind::SignificantDrop,
            format!(
                "Significant sentiment drop: {:.2} -> {:.2} (delta {:.2})",
                previous.score, current_score, delta
            ),
        );
    }

    AlertDecision::none()
}

/// Oldest instant a snapshot may have to count as "previous".
/// Snapshots must be strictly newer than the cutoff.
pub fn lookback_cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now - window
}

/// Turn a fired decision into the alert shown on the dashboard.
pub fn to_sentiment_alert(decision: &AlertDecision, current_score: f64) -> Option<SentimentAlert> {
    if !decision.should_alert {
        return None;
    }

    Some(SentimentAlert {
        kind: decision.kind?,
        reason: decision.reason.clone()?,
        severity: AlertSeverity::from_score(current_score),
    })
}

// ==============================================================================
// Price target and headline alerts
// ==============================================================================

/// Upper and lower target checks are independent; both can fire at once.
pub fn price_target_alerts(price: f64, target_up: Option<f64>, target_dn: Option<f64>) -> Vec<String> {
    let mut alerts = Vec::new();

    if let Some(up) = target_up {
        if price >= up {
            alerts.push(format!("🎯 Price target reached: ${:.2} >= ${:.2}", price, up));
        }
    }

    if let Some(dn) = target_dn {
        if price <= dn {
            alerts.push(format!("⚠️ Price dropped below target: ${:.2} <= ${:.2}", price, dn));
        }
    }

    alerts
}

/// One alert per negatively scored article.
pub fn negative_headline_alerts(articles: &[ScoredArticle]) -> Vec<String> {
    articles
        .iter()
        .filter(|a| a.sentiment == SentimentClass::Negative)
        .map(|a| {
            let headline: String = a.article.title.chars().take(50).collect();
            format!("⚠️ Negative sentiment: \"{}...\"", headline)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsArticle;
    use uuid::Uuid;

    fn snapshot(score: f64, class: SentimentClass) -> SentimentSnapshot {
        SentimentSnapshot {
            id: Uuid::new_v4(),
            symbol: "AAPL".to_string(),
            owner: Uuid::new_v4(),
            score,
            class,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_no_alert_without_history() {
        let decision = decide(None, 0.1, SentimentClass::Negative);
        assert_eq!(decision, AlertDecision::none());
    }

    #[test]
    fn test_positive_to_negative() {
        let prev = snapshot(0.8, SentimentClass::Positive);
        let decision = decide(Some(&prev), 0.35, SentimentClass::Negative);
        assert!(decision.should_alert);
        assert_eq!(decision.kind, Some(SentimentAlertKind::PositiveToNegative));
        assert!(decision.reason.unwrap().contains("dropped from positive to negative"));
    }

    #[test]
    fn test_positive_rule_wins_over_drop_rule() {
        // both rule 2 and rule 4 hold: 0.8 - 0.2 > 0.3
        let prev = snapshot(0.8, SentimentClass::Positive);
        let decision = decide(Some(&prev), 0.2, SentimentClass::Negative);
        assert_eq!(decision.kind, Some(SentimentAlertKind::PositiveToNegative));
    }

    #[test]
    fn test_neutral_to_very_negative_wins_over_drop_rule() {
        let prev = snapshot(0.6, SentimentClass::Neutral);
        let decision = decide(Some(&prev), 0.25, SentimentClass::Negative);
        assert_eq!(decision.kind, Some(SentimentAlertKind::NeutralToVeryNegative));
        assert!(decision.reason.unwrap().contains("dropped from neutral to very negative"));

        let prev = snapshot(0.5, SentimentClass::Neutral);
        let decision = decide(Some(&prev), 0.25, SentimentClass::Negative);
        assert_eq!(decision.kind, Some(SentimentAlertKind::NeutralToVeryNegative));
    }

    #[test]
    fn test_significant_drop_reports_scores() {
        let prev = snapshot(0.8, SentimentClass::Negative);
        let decision = decide(Some(&prev), 0.4, SentimentClass::Neutral);
        assert_eq!(decision.kind, Some(SentimentAlertKind::SignificantDrop));
        assert_eq!(
            decision.reason.as_deref(),
            Some("Significant sentiment drop: 0.80 -> 0.40 (delta 0.40)")
        );
    }

    #[test]
    fn test_exact_threshold_drop_does_not_fire() {
        let prev = snapshot(0.8, SentimentClass::Negative);
        assert!(!decide(Some(&prev), 0.5, SentimentClass::Neutral).should_alert);
    }

    #[test]
    fn test_stable_sentiment_is_quiet() {
        let prev = snapshot(0.5, SentimentClass::Neutral);
        assert!(!decide(Some(&prev), 0.5, SentimentClass::Neutral).should_alert);
        assert!(!decide(Some(&prev), 0.3, SentimentClass::Negative).should_alert);

        let prev = snapshot(0.2, SentimentClass::Negative);
        assert!(!decide(Some(&prev), 0.2, SentimentClass::Negative).should_alert);
    }

    #[test]
    fn test_lookback_cutoff() {
        let now = Utc::now();
        assert_eq!(lookback_cutoff(now, Duration::hours(24)), now - Duration::hours(24));
    }

    #[test]
    fn test_sentiment_alert_severity() {
        let prev = snapshot(0.8, SentimentClass::Positive);
        let decision = decide(Some(&prev), 0.2, SentimentClass::Negative);
        let alert = to_sentiment_alert(&decision, 0.2).unwrap();
        assert_eq!(alert.severity, AlertSeverity::High);

        assert!(to_sentiment_alert(&AlertDecision::none(), 0.2).is_none());
    }

    #[test]
    fn test_price_targets_fire_independently() {
        assert_eq!(price_target_alerts(100.0, None, None), Vec::<String>::new());
        assert_eq!(
            price_target_alerts(150.0, Some(150.0), None),
            vec!["🎯 Price target reached: $150.00 >= $150.00".to_string()]
        );
        assert_eq!(
            price_target_alerts(90.0, Some(120.0), Some(95.0)),
            vec!["⚠️ Price dropped below target: $90.00 <= $95.00".to_string()]
        );
        // overlapping targets: both fire in the same cycle
        assert_eq!(price_target_alerts(100.0, Some(90.0), Some(110.0)).len(), 2);
    }

    #[test]
    fn test_negative_headline_alerts_truncate() {
        let title = "A".repeat(80);
        let articles = vec![
            ScoredArticle {
                article: NewsArticle {
                    title: title.clone(),
                    description: String::new(),
                    url: "#".into(),
                    source: "Test".into(),
                    published_at: Utc::now(),
                },
                sentiment: SentimentClass::Negative,
                sentiment_score: 0.2,
                symbol: "AAPL".into(),
                sector: "Technology".into(),
            },
            ScoredArticle {
                article: NewsArticle {
                    title: "Fine".into(),
                    description: String::new(),
                    url: "#".into(),
                    source: "Test".into(),
                    published_at: Utc::now(),
                },
                sentiment: SentimentClass::Positive,
                sentiment_score: 0.8,
                symbol: "AAPL".into(),
                sector: "Technology".into(),
            },
        ];

        let alerts = negative_headline_alerts(&articles);
        assert_eq!(alerts, vec![format!("⚠️ Negative sentiment: \"{}...\"", "A".repeat(50))]);
    }
}
