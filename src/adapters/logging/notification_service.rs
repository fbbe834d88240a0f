use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;

/// NotificationService that writes each send to the log
///
/// Used by the binary while no mail transport is wired. Nothing is kept in
/// memory, so a long-running process does not grow with every sweep.
pub struct NotificationService {
    sender: String,
}

impl NotificationService {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        tracing::info!(
            from = %self.sender,
            subject,
            body_len = body.len(),
            recipients = ?recipients,
            "Sending notification"
        );

        Ok(())
    }
}
