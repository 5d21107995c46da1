// =====================================================================================
// OUTBOUND MESSENGER SERVICE
// =====================================================================================

use async_trait::async_trait;
use tracing::info;

use crate::models::{NotifyError, NotifyTarget};

/// Delivery seam for outbound messages. The watchdog only decides when and
/// what to send; implementations decide how.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(
        &self,
        target: &NotifyTarget,
        title: &str,
        message: &str,
    ) -> Result<(), NotifyError>;
}

/// Posts messages to `{base_url}/{namespace}/{action}` as JSON.
pub struct WebhookMessenger {
    client: reqwest::Client,
    base_url: String,
}

impl WebhookMessenger {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Messenger for WebhookMessenger {
    async fn send(
        &self,
        target: &NotifyTarget,
        title: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/{}/{}", self.base_url, target.namespace, target.action);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "title": title, "message": message }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Fallback used when no webhook is configured: messages only hit the log.
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(
        &self,
        target: &NotifyTarget,
        title: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        info!(
            namespace = %target.namespace,
            action = %target.action,
            title = %title,
            "outbound notification: {message}"
        );
        Ok(())
    }
}
