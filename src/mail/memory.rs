//! In-memory mailer for development and tests.

use std::sync::Mutex;

use super::{MailError, Mailer, OutboundMail};

/// Captures mail instead of delivering it.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutboundMail>>,
    fail: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails, for exercising upstream errors.
    pub fn failing() -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Mail captured so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("memory mailer configured to fail".to_string()));
        }

        tracing::info!(to = %mail.to, subject = %mail.subject, "Captured outbound mail");
        self.outbox
            .lock()
            .map_err(|_| MailError::Transport("outbox lock poisoned".to_string()))?
            .push(mail);
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "memory"
    }
}
