use crate::history::DEFAULT_CAPACITY;
use folio_core::Language;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, from the host's clock.
pub type Clock = fn() -> u64;

/// Editor-wide settings.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Undo depth per page.
    pub history_capacity: usize,
    /// How long a notice stays visible.
    pub notice_ttl_ms: u64,
    /// Initial zoom, clamped to 10..=200.
    pub zoom_percent: f64,
    pub language: Language,
    /// Page ids and notice timestamps come from here. The wasm bridge swaps
    /// in `Date.now`; `SystemTime` is unavailable on `wasm32-unknown-unknown`.
    pub clock: Clock,
}

pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            notice_ttl_ms: 3000,
            zoom_percent: 100.0,
            language: Language::English,
            clock: system_clock,
        }
    }
}
