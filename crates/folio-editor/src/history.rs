//! Undo/redo history over serialized page content.
//!
//! Every entry is a full snapshot of the displayed page (markup plus page
//! border), so undo and redo replace the whole surface in one step.
//!
//! Pointer interactions use **snapshot batching**: the content is captured
//! when the interaction starts and recorded once when it ends, and only if
//! something actually changed.

use folio_core::{BorderSettings, PageId};
use std::collections::{HashMap, VecDeque};

/// Default maximum number of undo entries per page.
pub const DEFAULT_CAPACITY: usize = 20;

/// Serialized state of the displayed page.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub markup: String,
    pub border: BorderSettings,
}

/// Undo/redo stacks for one page.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth; the oldest entry is evicted past it.
    capacity: usize,
    /// Content captured at the start of an open batch.
    batch: Option<Snapshot>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            batch: None,
        }
    }

    /// Record the state *before* a mutation. Clears redo.
    pub fn record(&mut self, before: Snapshot) {
        self.push_undo(before);
        self.redo_stack.clear();
    }

    /// Start a batch: remember `before` without recording it yet.
    /// A nested call keeps the outermost snapshot.
    pub fn begin_batch(&mut self, before: Snapshot) {
        if self.batch.is_none() {
            self.batch = Some(before);
        }
    }

    /// Close the open batch, recording its start snapshot when the content
    /// differs from `current`. Returns whether an entry was recorded.
    pub fn end_batch(&mut self, current: &Snapshot) -> bool {
        match self.batch.take() {
            Some(before) if before != *current => {
                self.record(before);
                true
            }
            _ => false,
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Step back: `current` goes to redo and the previous snapshot is
    /// returned for the caller to load.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Mirror of `undo`.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// One `History` per page; only the displayed page's is ever touched.
#[derive(Debug, Clone)]
pub struct PageHistories {
    by_page: HashMap<PageId, History>,
    capacity: usize,
}

impl PageHistories {
    pub fn new(capacity: usize) -> Self {
        Self {
            by_page: HashMap::new(),
            capacity,
        }
    }

    pub fn for_page(&mut self, page: PageId) -> &mut History {
        let capacity = self.capacity;
        self.by_page
            .entry(page)
            .or_insert_with(|| History::new(capacity))
    }

    pub fn get(&self, page: PageId) -> Option<&History> {
        self.by_page.get(&page)
    }

    /// Drop the history of a removed page.
    pub fn forget(&mut self, page: PageId) {
        self.by_page.remove(&page);
    }
}
