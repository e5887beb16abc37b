mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which signal crossed into its good state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertType {
    ValuationOpportunity {
        symbol: String,
        price: f64,
        conclusion: String,
        timing: String,
        link: String,
    },
    TimingOpportunity {
        symbol: String,
        price: f64,
        conclusion: String,
        timing: String,
        link: String,
    },
}

impl AlertType {
    pub fn symbol(&self) -> &str {
        match self {
            AlertType::ValuationOpportunity { symbol, .. }
            | AlertType::TimingOpportunity { symbol, .. } => symbol,
        }
    }

    /// Short tag for the signal that fired.
    pub fn signal(&self) -> &'static str {
        match self {
            AlertType::ValuationOpportunity { .. } => "valuation",
            AlertType::TimingOpportunity { .. } => "timing",
        }
    }
}

/// A notification alert to be dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            timestamp: chrono::Utc::now(),
            title: title.into(),
            message: message.into(),
        }
    }

    /// Title and body built from the alert fields.
    pub fn opportunity(alert_type: AlertType) -> Self {
        let (title, message) = match &alert_type {
            AlertType::ValuationOpportunity {
                symbol,
                price,
                conclusion,
                timing,
                link,
            } => (
                format!("{symbol}: valuation opportunity"),
                format!("Price {price:.2}\nConclusion: {conclusion}\nTiming: {timing}\n{link}"),
            ),
            AlertType::TimingOpportunity {
                symbol,
                price,
                conclusion,
                timing,
                link,
            } => (
                format!("{symbol}: timing opportunity"),
                format!("Price {price:.2}\nTiming: {timing}\nConclusion: {conclusion}\n{link}"),
            ),
        };
        Self::new(alert_type, title, message)
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Webhook error: {0}")]
    Webhook(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the notification service.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
}

impl NotificationConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("ALERT_WEBHOOK_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Dispatches alerts to every configured channel. Delivery is best-effort:
/// failures are logged and never reach the caller.
pub struct NotificationService {
    channels: std::sync::Arc<Vec<Box<dyn NotificationChannel>>>,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if let Some(ref webhook_url) = config.webhook_url {
            match WebhookNotifier::new(webhook_url) {
                Ok(notifier) => {
                    tracing::info!("Webhook notifications enabled");
                    channels.push(Box::new(notifier));
                }
                Err(e) => tracing::warn!("Failed to initialize webhook notifier: {}", e),
            }
        }

        if channels.is_empty() {
            tracing::info!("No notification channels configured (set ALERT_WEBHOOK_URL)");
        }

        Self::with_channels(channels)
    }

    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self {
            channels: std::sync::Arc::new(channels),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send an alert to all configured channels (fire-and-forget via tokio::spawn).
    /// The handle can be dropped, or awaited before shutdown to let delivery finish.
    pub fn send_alert(&self, alert: Alert) -> tokio::task::JoinHandle<usize> {
        let channels = self.channels.clone();
        tokio::spawn(async move { dispatch(&channels, &alert).await })
    }

    /// Send alert to all channels, awaiting completion. Returns how many accepted it.
    pub async fn send_alert_async(&self, alert: &Alert) -> usize {
        dispatch(&self.channels, alert).await
    }
}

async fn dispatch(channels: &[Box<dyn NotificationChannel>], alert: &Alert) -> usize {
    let mut delivered = 0;
    for channel in channels.iter() {
        match channel.send(alert).await {
            Ok(()) => {
                delivered += 1;
                tracing::debug!(
                    "Sent {} alert for {} via {}",
                    alert.alert_type.signal(),
                    alert.alert_type.symbol(),
                    channel.name()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to send notification via {}: {}", channel.name(), e)
            }
        }
    }
    delivered
}
