//! Outbound mail.
//!
//! Contact and application submissions are delivered as a single mail to the
//! site owner. Delivery is one attempt; there is no queue and no retry.

mod memory;
mod smtp;

pub use memory::MemoryMailer;
pub use smtp::SmtpMailer;

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;

#[derive(Debug)]
pub enum MailError {
    Configuration(String),
    Message(String),
    Transport(String),
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailError::Configuration(msg) => write!(f, "mail configuration error: {}", msg),
            MailError::Message(msg) => write!(f, "invalid mail message: {}", msg),
            MailError::Transport(msg) => write!(f, "mail transport error: {}", msg),
        }
    }
}

impl std::error::Error for MailError {}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail error: {}", err);
        AppError::Mail(err.to_string())
    }
}

/// File attached to an outbound mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A plain-text notification mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl OutboundMail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Mail sender abstraction.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError>;

    /// Short provider name for logs.
    fn provider(&self) -> &'static str;
}

/// Pick the mailer for this configuration.
pub fn mailer_from_config(config: &Config) -> Result<Arc<dyn Mailer>, MailError> {
    match &config.smtp {
        Some(smtp) => {
            tracing::info!("Creating SMTP mailer for {}", smtp.host);
            Ok(Arc::new(SmtpMailer::new(smtp)?))
        }
        None if config.environment.is_production() => Err(MailError::Configuration(
            "SMTP_HOST must be set in production".to_string(),
        )),
        None => {
            tracing::warn!("SMTP_HOST not set, outbound mail is kept in memory only");
            Ok(Arc::new(MemoryMailer::new()))
        }
    }
}
