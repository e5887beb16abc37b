use async_trait::async_trait;

use crate::{Alert, AlertType, NotificationChannel, NotificationError};

/// Posts a flat JSON document to any HTTP endpoint.
pub struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> Result<Self, NotificationError> {
        if !(webhook_url.starts_with("https://") || webhook_url.starts_with("http://")) {
            return Err(NotificationError::Config(format!(
                "webhook URL must be http(s): {webhook_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NotificationError::Config(e.to_string()))?;

        Ok(Self {
            webhook_url: webhook_url.to_string(),
            client,
        })
    }

    fn payload(alert: &Alert) -> serde_json::Value {
        let (AlertType::ValuationOpportunity {
            symbol,
            price,
            conclusion,
            timing,
            link,
        }
        | AlertType::TimingOpportunity {
            symbol,
            price,
            conclusion,
            timing,
            link,
        }) = &alert.alert_type;

        serde_json::json!({
            "title": alert.title,
            "message": alert.message,
            "signal": alert.alert_type.signal(),
            "symbol": symbol,
            "price": price,
            "conclusion": conclusion,
            "timing": timing,
            "link": link,
            "timestamp": alert.timestamp.to_rfc3339(),
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        self.client
            .post(&self.webhook_url)
            .json(&Self::payload(alert))
            .send()
            .await
            .map_err(|e| NotificationError::Webhook(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotificationError::Webhook(e.to_string()))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
