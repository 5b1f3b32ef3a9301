//! Continuations that run after the host's next render pass.
//!
//! Every entry is tagged with the page index it was scheduled for. When the
//! queue drains, entries whose tag no longer matches the current page are
//! discarded instead of writing into the wrong page.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Load the page's stored content into the surface, reapply its border,
    /// request focus and reset the object registry.
    LoadPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deferred {
    target: usize,
    action: DeferredAction,
}

#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    pending: VecDeque<Deferred>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, target: usize, action: DeferredAction) {
        log::debug!("deferred {action:?} scheduled for page {target}");
        self.pending.push_back(Deferred { target, action });
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain everything, returning only the actions still aimed at `current`.
    pub fn drain_for(&mut self, current: usize) -> Vec<DeferredAction> {
        let mut ready = Vec::new();
        for entry in self.pending.drain(..) {
            if entry.target == current {
                if !ready.contains(&entry.action) {
                    ready.push(entry.action);
                }
            } else {
                log::debug!(
                    "discarding stale {:?} for page {} (current is {current})",
                    entry.action,
                    entry.target
                );
            }
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_entries_are_discarded() {
        let mut q = RenderQueue::new();
        q.schedule(1, DeferredAction::LoadPage);
        q.schedule(2, DeferredAction::LoadPage);
        assert!(q.is_pending());
        assert_eq!(q.drain_for(2), vec![DeferredAction::LoadPage]);
        assert!(!q.is_pending());
    }

    #[test]
    fn duplicate_loads_collapse() {
        let mut q = RenderQueue::new();
        q.schedule(0, DeferredAction::LoadPage);
        q.schedule(0, DeferredAction::LoadPage);
        assert_eq!(q.drain_for(0).len(), 1);
    }

    #[test]
    fn nothing_runs_when_every_tag_is_stale() {
        let mut q = RenderQueue::new();
        q.schedule(3, DeferredAction::LoadPage);
        assert!(q.drain_for(0).is_empty());
        assert!(!q.is_pending());
    }
}
