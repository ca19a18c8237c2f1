use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;

/// The single feed a pipeline watches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedSpec {
    pub uri: String,
}

/// What gets mailed out when a new post shows up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { recipients: usize },
    /// Nobody to send to; the send was not attempted.
    Skipped,
}

/// When a post counts as processed relative to its notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryGuarantee {
    /// Record history only after the notifier reported success.
    #[default]
    AtLeastOnce,
    /// Record history even when the notification failed.
    AtMostOnce,
}

impl FromStr for DeliveryGuarantee {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "at-least-once" | "at_least_once" => Ok(Self::AtLeastOnce),
            "at-most-once" | "at_most_once" => Ok(Self::AtMostOnce),
            other => Err(format!(
                "unknown delivery guarantee '{}', expected at-least-once or at-most-once",
                other
            )),
        }
    }
}

impl fmt::Display for DeliveryGuarantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeastOnce => f.write_str("at-least-once"),
            Self::AtMostOnce => f.write_str("at-most-once"),
        }
    }
}

// Both traits are used as trait objects by the relay pipeline.

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<DeliveryOutcome>;
}

/// Durable set of post identifiers that have already been handled.
pub trait HistoryStore: Send + Sync {
    /// Everything currently persisted. Never cached between calls.
    fn load(&self) -> Result<HashSet<String>>;

    fn record(&self, id: &str) -> Result<()>;

    fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.load()?.contains(id))
    }
}
