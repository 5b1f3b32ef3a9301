//! Transient user-facing notices (toast messages).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub issued_at_ms: u64,
    pub ttl_ms: u64,
}

impl Notice {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.issued_at_ms.saturating_add(self.ttl_ms)
    }
}

/// Notices issued since the host last drained them. Only the newest one is
/// shown; it dismisses itself once its time-to-live has passed.
#[derive(Debug, Clone)]
pub struct Notices {
    issued: Vec<Notice>,
    ttl_ms: u64,
}

impl Notices {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            issued: Vec::new(),
            ttl_ms,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, now_ms: u64) {
        let message = message.into();
        match severity {
            Severity::Success => log::debug!("notice: {message}"),
            Severity::Warning => log::warn!("notice: {message}"),
            Severity::Error => log::error!("notice: {message}"),
        }
        self.issued.push(Notice {
            message,
            severity,
            issued_at_ms: now_ms,
            ttl_ms: self.ttl_ms,
        });
    }

    /// The notice currently on screen, if any.
    pub fn visible(&self, now_ms: u64) -> Option<&Notice> {
        self.issued.last().filter(|n| !n.is_expired(now_ms))
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.issued.last()
    }

    pub fn all(&self) -> &[Notice] {
        &self.issued
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.issued)
    }
}
