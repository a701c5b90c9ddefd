use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const TOAST_TTL_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: now,
        }
    }
}

/// Visible notifications; each disappears after the ttl.
#[derive(Debug, Clone)]
pub struct Toasts {
    items: Vec<Notification>,
    ttl: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::seconds(TOAST_TTL_SECS))
    }
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn extend(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        self.items.extend(notifications);
    }

    pub fn expire(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.items.retain(|n| now < n.created_at + ttl);
    }

    pub fn visible(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
