//! Webhook notification transport
//!
//! Posts pre-formatted gap reports to a Discord-style webhook. Delivery is
//! fire-and-forget: an unset URL is a silent no-op and failures are logged,
//! never retried.

use crate::config::NotifyConfig;
use reqwest::Client;
use std::time::Duration;

pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: config.webhook_url.clone().filter(|url| !url.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Post one message; swallows every failure after logging it
    pub async fn send(&self, message: &str) {
        let Some(url) = &self.url else {
            return;
        };

        let payload = serde_json::json!({ "content": message });
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(%status, body = %body, "Webhook returned non-success");
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%error, "Failed to send webhook notification");
            }
        }
    }
}
