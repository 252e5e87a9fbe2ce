use crate::db::user_queries;
use crate::errors::AppError;
use crate::models::Dashboard;
use crate::services::dashboard_service::{evaluate_for_user, fired_sentiment_alerts};
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::notification_service::{sentiment_alert_email, EmailMessage};
use tracing::{error, info, warn};

/// Re-evaluates every portfolio with the same pipeline as the dashboard
/// route and emails the sentiment alerts that fired.
///
/// Each run records a fresh snapshot per holding, so the next run (or the
/// next dashboard view) compares against it.
pub async fn monitor_all_portfolios(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("Starting portfolio sentiment monitor");

    let users = user_queries::fetch_with_holdings(&ctx.pool).await?;
    if users.is_empty() {
        info!("No portfolios to monitor");
        return Ok(JobResult {
            items_processed: 0,
            items_failed: 0,
        });
    }

    let recipient = ctx.config.mail.recipient.as_deref();
    let mut processed = 0;
    let mut failed = 0;
    let mut total_alerts = 0;

    for user in &users {
        let dashboard = match evaluate_for_user(
            &ctx.pool,
            ctx.market_data.as_ref(),
            &ctx.engine,
            &ctx.config.sentiment,
            user.id,
        )
        .await
        {
            Ok(dashboard) => dashboard,
            Err(e) => {
                error!("Failed to evaluate portfolio for {}: {}", user.username, e);
                failed += 1;
                continue;
            }
        };

        processed += 1;
        let fired = fired_sentiment_alerts(&dashboard).len();
        total_alerts += fired;

        if let Some(email) = alert_email(recipient, &user.username, &dashboard) {
            if let Err(e) = ctx.notifier.send(&email).await {
                warn!("Failed to send sentiment alerts for {}: {}", user.username, e);
            }
        } else if fired > 0 {
            info!("{} sentiment alerts for {} (no recipient configured)", fired, user.username);
        }
    }

    info!(
        "Portfolio monitor completed: {} portfolios processed, {} failed, {} sentiment alerts",
        processed, failed, total_alerts
    );

    Ok(JobResult {
        items_processed: processed,
        items_failed: failed,
    })
}

fn alert_email(recipient: Option<&str>, username: &str, dashboard: &Dashboard) -> Option<EmailMessage> {
    let to = recipient?;
    let alerts = fired_sentiment_alerts(dashboard);
    if alerts.is_empty() {
        return None;
    }
    Some(sentiment_alert_email(to, username, &alerts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AlertSeverity, DashboardRow, ImpactLevel, PortfolioSummary, SentimentAlert, SentimentAlertKind,
        SentimentClass, SentimentCounts,
    };
    use chrono::Utc;

    fn dashboard(alert: Option<SentimentAlert>) -> Dashboard {
        Dashboard {
            rows: vec![DashboardRow {
                symbol: "AAPL".into(),
                name: "Apple Inc.".into(),
                sector: "Technology".into(),
                price: 100.0,
                change: 0.0,
                change_percent: None,
                quantity: 1,
                position_value: 100.0,
                portfolio_weight: 1.0,
                gain_percent: None,
                sentiment_class: SentimentClass::Negative,
                sentiment_text: SentimentClass::Negative.label().into(),
                sentiment_score: 0.2,
                sentiment_alert: alert,
                alerts: Vec::new(),
                impact_level: ImpactLevel::Small,
                target_up: None,
                target_dn: None,
                news: Vec::new(),
                sector_news: Vec::new(),
            }],
            summary: PortfolioSummary {
                counts: SentimentCounts::default(),
                total_value: 100.0,
                mood: SentimentClass::Negative,
                message: String::new(),
                alert_count: 0,
            },
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_alert_email_needs_recipient_and_alerts() {
        let alert = SentimentAlert {
            kind: SentimentAlertKind::PositiveToNegative,
            reason: "dropped from positive to negative".into(),
            severity: AlertSeverity::High,
        };

        assert!(alert_email(None, "admin", &dashboard(Some(alert.clone()))).is_none());
        assert!(alert_email(Some("me@example.com"), "admin", &dashboard(None)).is_none());

        let email = alert_email(Some("me@example.com"), "admin", &dashboard(Some(alert))).unwrap();
        assert_eq!(email.subject, "🚨 Sentiment alert: AAPL");
    }
}
