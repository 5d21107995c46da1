use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default namespace assumed when a target string carries no `.` separator.
pub const DEFAULT_NAMESPACE: &str = "notify";

/// Where an outbound message goes: a `namespace.action` pair parsed from the
/// configured target string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyTarget {
    pub namespace: String,
    pub action: String,
}

impl NotifyTarget {
    /// Parses a configured target string. An empty or blank string disables
    /// forwarding entirely and yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once('.') {
            Some((namespace, action)) => Some(Self {
                namespace: namespace.to_string(),
                action: action.to_string(),
            }),
            None => Some(Self {
                namespace: DEFAULT_NAMESPACE.to_string(),
                action: raw.to_string(),
            }),
        }
    }
}

/// An alert currently shown on the board. Identified by a stable id so that
/// repeated creates for the same id update in place.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveAlert {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("delivery failed: {0}")]
    Delivery(String),
}
