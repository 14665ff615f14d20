// Alert delivery for the monitor loop
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Notification settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Chat webhook URL; alerts are only logged when unset
    pub webhook_url: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message. Failures are reported, never fatal to the caller.
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Writes alerts to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        tracing::warn!(alert = true, "{}", message);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts alerts as `{"content": ...}` to a chat webhook
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { content: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Webhook rejected notification ({})", status).into());
        }

        tracing::debug!("Notification sent");
        Ok(())
    }
}

/// Pick the notifier for a config
pub fn build_notifier(config: &NotifyConfig) -> Box<dyn Notifier> {
    match config.webhook_url.as_deref() {
        Some(url) if !url.is_empty() => Box::new(WebhookNotifier::new(url)),
        _ => Box::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_webhook_posts_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::Json(serde_json::json!({"content": "volume spike"})))
            .with_status(204)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url()));
        notifier.notify("volume spike").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_webhook_failure_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url()));
        assert!(notifier.notify("x").await.is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_and_builder() {
        assert!(LogNotifier.notify("hello").await.is_ok());

        let notifier = build_notifier(&NotifyConfig { webhook_url: None });
        assert!(notifier.notify("logged").await.is_ok());
    }
}
