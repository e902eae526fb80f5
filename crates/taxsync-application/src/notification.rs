//! Transient, auto-dismissing user messages.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Success => f.write_str("success"),
            NotificationLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Wall-clock time, for display only
    pub created_at: DateTime<Local>,
    expires_at: Instant,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Queue of notifications, oldest first. Expired entries are pruned on read.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: Duration,
    entries: VecDeque<Notification>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: VecDeque::new(),
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message.into(), Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message.into(), Instant::now());
    }

    pub fn push(&mut self, level: NotificationLevel, message: String, now: Instant) {
        tracing::debug!(%level, %message, "notification");
        self.entries.push_back(Notification {
            level,
            message,
            created_at: Local::now(),
            expires_at: now + self.ttl,
        });
    }

    /// Notifications still visible at `now`.
    pub fn active_at(&mut self, now: Instant) -> Vec<Notification> {
        self.entries.retain(|n| !n.is_expired_at(now));
        self.entries.iter().cloned().collect()
    }

    pub fn active(&mut self) -> Vec<Notification> {
        self.active_at(Instant::now())
    }

    /// Removes and returns everything still visible.
    pub fn drain(&mut self) -> Vec<Notification> {
        let now = Instant::now();
        self.entries
            .drain(..)
            .filter(|n| !n.is_expired_at(now))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
