mod smtp;
mod templates;

pub use smtp::SmtpNotifier;
pub use templates::EmailTemplate;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kinds of user-facing notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NoticeType {
    Welcome { username: String },
}

/// A notice addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub notice_type: NoticeType,
    pub recipient: String,
    pub subject: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Notice {
    pub fn welcome(recipient: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            notice_type: NoticeType::Welcome {
                username: username.into(),
            },
            recipient: recipient.into(),
            subject: "Welcome to Prodigal".to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, notice: &Notice) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the notification service.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: SmtpTls,
    /// Public site address linked from emails
    pub site_url: String,
}

#[derive(Debug, Clone, Default)]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
            smtp_tls: SmtpTls::StartTls,
            site_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Dispatches notices to all configured channels. Delivery failures are
/// logged and never reported to the caller.
#[derive(Clone)]
pub struct NotificationService {
    channels: Arc<Vec<Box<dyn NotificationChannel>>>,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if config.smtp_host.is_some() && config.smtp_from.is_some() {
            match SmtpNotifier::new(config) {
                Ok(notifier) => {
                    tracing::info!("Email notifications enabled (SMTP)");
                    channels.push(Box::new(notifier));
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize SMTP notifier: {}", e);
                }
            }
        }

        if channels.is_empty() {
            tracing::info!("No notification channels configured (set SMTP_HOST and SMTP_FROM_ADDRESS)");
        }

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Service with an explicit set of channels
    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send the signup welcome email (fire-and-forget via tokio::spawn).
    pub fn send_welcome(&self, email: &str, username: &str) {
        self.send_notice(Notice::welcome(email, username));
    }

    /// Send a notice to all channels in the background.
    pub fn send_notice(&self, notice: Notice) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            service.send_notice_async(&notice).await;
        })
    }

    /// Send a notice to all channels, awaiting completion.
    pub async fn send_notice_async(&self, notice: &Notice) {
        for channel in self.channels.iter() {
            match channel.send(notice).await {
                Ok(()) => tracing::debug!("Sent notice via {}", channel.name()),
                Err(e) => {
                    tracing::warn!("Failed to send notice via {}: {}", channel.name(), e)
                }
            }
        }
    }
}
