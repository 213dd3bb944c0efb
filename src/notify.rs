use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

/// Post-run notification hook. Fired after a successful discovery run that
/// produced leads; failures are logged and never affect the run's result.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn leads_discovered(&self, account_id: Uuid, count: usize);
}

/// Posts a small JSON payload to a configured webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String, client: reqwest::Client) -> Self {
        Self {
            client,
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn leads_discovered(&self, account_id: Uuid, count: usize) {
        let payload = json!({
            "event": "leads.discovered",
            "account_id": account_id,
            "count": count,
        });

        match self.client.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Webhook notified: {} lead(s) for {}", count, account_id);
            }
            Ok(response) => {
                tracing::warn!("Webhook returned status {}", response.status());
            }
            Err(e) => {
                tracing::warn!("Webhook delivery failed: {}", e);
            }
        }
    }
}

/// No-op notifier for callers that do not care.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn leads_discovered(&self, _account_id: Uuid, _count: usize) {}
}
