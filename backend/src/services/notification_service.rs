use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::MailConfig;
use crate::models::{AlertSeverity, Dashboard, SentimentAlert, SentimentClass};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("smtp error: {0}")]
    Smtp(String),
}

/// A rendered email, independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}

// ==============================================================================
// Transports
// ==============================================================================

pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, NotificationError> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| NotificationError::Address(format!("from address: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotificationError::Smtp(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        info!("🔌 SMTP notifier configured for {}:{}", config.smtp_host, config.smtp_port);
        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::Address(format!("{}: {}", email.to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        match self.mailer.send(message).await {
            Ok(_) => {
                info!("✅ Email sent to {}: {}", email.to, email.subject);
                Ok(())
            }
            Err(e) => {
                error!("❌ SMTP error sending to {}: {}", email.to, e);
                Err(NotificationError::Smtp(e.to_string()))
            }
        }
    }
}

/// Logs emails instead of sending them (SMTP disabled).
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            "📧 Email would be sent (SMTP disabled):\n{}",
            email.text_body
        );
        Ok(())
    }
}

pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn Notifier>, NotificationError> {
    if config.smtp_enabled {
        Ok(Arc::new(SmtpNotifier::new(config)?))
    } else {
        info!("SMTP disabled, emails will be logged");
        Ok(Arc::new(LogNotifier))
    }
}

// ==============================================================================
// Email content
// ==============================================================================

/// Portfolio summary email sent after a dashboard evaluation.
pub fn dashboard_summary_email(to: &str, dashboard: &Dashboard) -> EmailMessage {
    let summary = &dashboard.summary;
    let subject = match summary.mood {
        SentimentClass::Positive => "📈 Portfolio sentiment: positive",
        SentimentClass::Negative => "📉 Portfolio sentiment: negative",
        SentimentClass::Neutral => "➖ Portfolio sentiment: neutral",
    }
    .to_string();

    let mut text_body = format!(
        "{}\n\nPositive: {}\nNegative: {}\nNeutral: {}\nTotal value: ${:.2}\n",
        summary.message,
        summary.counts.positive,
        summary.counts.negative,
        summary.counts.neutral,
        summary.total_value
    );
    for row in &dashboard.rows {
        text_body.push_str(&format!(
            "\n{} ${:.2} {} ({:.2})",
            row.symbol, row.price, row.sentiment_text, row.sentiment_score
        ));
        for alert in &row.alerts {
            text_body.push_str(&format!("\n  - {}", alert));
        }
    }

    let rows_html: String = dashboard
        .rows
        .iter()
        .map(|row| {
            format!(
                "<tr><td><strong>{}</strong></td><td>${:.2}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.symbol),
                row.price,
                row.sentiment_text,
                row.alerts.iter().map(|a| escape_html(a)).collect::<Vec<_>>().join("<br>")
            )
        })
        .collect();

    let html_body = build_email_html(
        &subject,
        mood_color(summary.mood),
        &format!(
            "<p><strong>{}</strong></p><p>Total value: ${:.2}</p><table><tr><th>Symbol</th><th>Price</th><th>Sentiment</th><th>Alerts</th></tr>{}</table>",
            escape_html(&summary.message),
            summary.total_value,
            rows_html
        ),
    );

    EmailMessage {
        to: to.to_string(),
        subject,
        text_body,
        html_body,
    }
}

/// Email listing the sentiment alerts fired by the background monitor.
pub fn sentiment_alert_email(to: &str, username: &str, alerts: &[(String, SentimentAlert)]) -> EmailMessage {
    let subject = if alerts.len() == 1 {
        format!("🚨 Sentiment alert: {}", alerts[0].0)
    } else {
        format!("🚨 {} sentiment alerts", alerts.len())
    };

    let worst = alerts
        .iter()
        .map(|(_, a)| a.severity)
        .max_by_key(|s| match s {
            AlertSeverity::Low => 0,
            AlertSeverity::Medium => 1,
            AlertSeverity::High => 2,
        })
        .unwrap_or(AlertSeverity::Low);

    let text_body = alerts
        .iter()
        .map(|(symbol, alert)| format!("[{}] {}: {}", alert.severity.as_str().to_uppercase(), symbol, alert.reason))
        .collect::<Vec<_>>()
        .join("\n");

    let items: String = alerts
        .iter()
        .map(|(symbol, alert)| {
            format!(
                "<li><strong>{}</strong> ({}): {}</li>",
                escape_html(symbol),
                alert.severity,
                escape_html(&alert.reason)
            )
        })
        .collect();

    let html_body = build_email_html(
        &subject,
        severity_color(worst),
        &format!("<p>Hi {},</p><ul>{}</ul>", escape_html(username), items),
    );

    EmailMessage {
        to: to.to_string(),
        subject,
        text_body: format!("Hi {},\n\n{}", username, text_body),
        html_body,
    }
}

fn mood_color(mood: SentimentClass) -> &'static str {
    match mood {
        SentimentClass::Positive => "#2e7d32",
        SentimentClass::Negative => "#d32f2f",
        SentimentClass::Neutral => "#757575",
    }
}

fn severity_color(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::High => "#f44336",
        AlertSeverity::Medium => "#ff9800",
        AlertSeverity::Low => "#2196f3",
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn build_email_html(title: &str, header_color: &str, content: &str) -> String {
    format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: {}; color: white; padding: 20px; border-radius: 5px 5px 0 0; }}
        .content {{ padding: 20px; background-color: #f9f9f9; border: 1px solid #ddd; border-top: none; }}
        .footer {{ padding: 10px; text-align: center; color: #666; font-size: 12px; }}
        table {{ width: 100%; margin: 15px 0; }}
        td, th {{ padding: 8px; text-align: left; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{}</h1>
        </div>
        <div class="content">
            {}
        </div>
        <div class="footer">
            <p>Sentifolio portfolio sentiment monitor</p>
        </div>
    </div>
</body>
</html>
"#,
        header_color,
        escape_html(title),
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PortfolioSummary, SentimentAlertKind, SentimentCounts};
    use chrono::Utc;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_summary_email_for_empty_dashboard() {
        let dashboard = Dashboard {
            rows: Vec::new(),
            summary: PortfolioSummary {
                counts: SentimentCounts::default(),
                total_value: 0.0,
                mood: SentimentClass::Neutral,
                message: "➖ Your stocks are showing overall neutral sentiment. Monitor for changes.".into(),
                alert_count: 0,
            },
            generated_at: Utc::now(),
        };

        let email = dashboard_summary_email("me@example.com", &dashboard);
        assert_eq!(email.subject, "➖ Portfolio sentiment: neutral");
        assert!(email.text_body.starts_with("➖ Your stocks are showing overall neutral sentiment."));
        assert!(email.html_body.contains("#757575"));
    }

    #[test]
    fn test_alert_email_uses_worst_severity() {
        let alerts = vec![
            (
                "AAPL".to_string(),
                SentimentAlert {
                    kind: SentimentAlertKind::SignificantDrop,
                    reason: "Significant sentiment drop: 0.80 -> 0.45 (delta 0.35)".into(),
                    severity: AlertSeverity::Low,
                },
            ),
            (
                "TSLA".to_string(),
                SentimentAlert {
                    kind: SentimentAlertKind::PositiveToNegative,
                    reason: "dropped from positive to negative".into(),
                    severity: AlertSeverity::High,
                },
            ),
        ];

        let email = sentiment_alert_email("me@example.com", "admin", &alerts);
        assert_eq!(email.subject, "🚨 2 sentiment alerts");
        assert!(email.html_body.contains("#f44336"));
        assert!(email.text_body.contains("[HIGH] TSLA"));
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let email = EmailMessage {
            to: "me@example.com".into(),
            subject: "test".into(),
            text_body: "body".into(),
            html_body: "<p>body</p>".into(),
        };
        assert!(LogNotifier.send(&email).await.is_ok());
    }
}
