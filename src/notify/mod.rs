//! Notification fan-out.
//!
//! A [`Dispatcher`] owns the enabled sinks and hands every message to all
//! of them from a detached task.  Deliveries are best-effort: a failing
//! sink is logged and never affects the other sinks or the caller.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Result;

pub mod webhook;

pub use webhook::WebhookSink;

/// A destination for notification messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Disabled sinks are dropped by the dispatcher and never called.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Deliver one already-escaped message.  A single attempt, no retry.
    async fn deliver(&self, message: &str) -> Result<()>;
}

/// Envelope shape understood by a webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStyle {
    /// `{"content": "..."}`, answered with 204.
    Discord,
    /// `{"text": "..."}`, answered with 200.
    GoogleChat,
}

impl PayloadStyle {
    pub fn field(self) -> &'static str {
        match self {
            PayloadStyle::Discord => "content",
            PayloadStyle::GoogleChat => "text",
        }
    }

    pub fn expected_status(self) -> u16 {
        match self {
            PayloadStyle::Discord => 204,
            PayloadStyle::GoogleChat => 200,
        }
    }

    /// JSON body carrying `message`, which must already be JSON-escaped.
    pub fn envelope(self, message: &str) -> String {
        format!(r#"{{"{}": "{}"}}"#, self.field(), message)
    }
}

impl fmt::Display for PayloadStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadStyle::Discord => write!(f, "discord"),
            PayloadStyle::GoogleChat => write!(f, "google-chat"),
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    sinks: Arc<Vec<Arc<dyn NotificationSink>>>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        let sinks: Vec<_> = sinks.into_iter().filter(|s| s.is_enabled()).collect();
        if sinks.is_empty() {
            warn!("No notification sinks configured; changes will only be logged");
        }
        Self {
            sinks: Arc::new(sinks),
        }
    }

    /// One webhook sink per configured URL, sharing a single HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = webhook::build_client()?;
        let sinks = config
            .sinks()
            .into_iter()
            .map(|sink| {
                Arc::new(WebhookSink::new(client.clone(), sink.url, sink.style))
                    as Arc<dyn NotificationSink>
            })
            .collect();
        Ok(Self::new(sinks))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `message` to every sink from a detached task.
    ///
    /// The returned handle may be dropped; the poll loop never waits on it.
    pub fn notify(&self, message: String) -> JoinHandle<()> {
        let sinks = Arc::clone(&self.sinks);
        tokio::spawn(async move {
            if sinks.is_empty() {
                debug!("Dropping notification, no sinks: {}", message);
                return;
            }
            let deliveries = sinks.iter().map(|sink| {
                let message = message.as_str();
                async move { (sink.name(), sink.deliver(message).await) }
            });
            for (name, result) in join_all(deliveries).await {
                match result {
                    Ok(()) => debug!("Delivered notification to {}", name),
                    Err(e) => warn!("{}", e),
                }
            }
        })
    }
}
