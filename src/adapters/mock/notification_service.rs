use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// A notification that went through the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Mock implementation of NotificationService
///
/// Does not deliver anything. Every send is recorded so that tests can
/// inspect it. A failing instance rejects every send.
pub struct NotificationService {
    sent: Mutex<Vec<SentNotification>>,
    fail: bool,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Instance whose sends always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Notifications recorded so far
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        if self.fail {
            return Err("notification transport unavailable".into());
        }

        self.sent.lock().unwrap().push(SentNotification {
            subject: subject.to_string(),
            body: body.to_string(),
            recipients: recipients.to_vec(),
        });

        Ok(())
    }
}
