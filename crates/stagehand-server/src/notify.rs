//! Fire-and-forget Discord webhook notifications.
//!
//! Stream and record state changes post a short message to a
//! configured webhook. Delivery is best-effort: the HTTP request runs
//! on its own task and failures only log.

use serde_json::json;
use tracing::{debug, warn};

/// Posts messages to one Discord webhook URL.
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    /// A notifier for `webhook_url`.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    /// Sends `content` without waiting for the outcome.
    pub fn notify(&self, content: &str) {
        let client = self.client.clone();
        let url = self.webhook_url.clone();
        let body = json!({ "content": content });
        tokio::spawn(async move {
            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("discord notification delivered");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "discord webhook rejected notification");
                }
                Err(err) => {
                    warn!(error = %err, "discord notification failed");
                }
            }
        });
    }
}
