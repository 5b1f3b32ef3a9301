//! Ordered page sequence with a current-page pointer.
//!
//! Invariants: there is always at least one page and
//! `0 <= current < pages.len()`.

use crate::error::EditorError;
use folio_core::{BorderSettings, Page, PageId, PageIdAllocator};

/// What a removal did to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The displayed page is unchanged (possibly at a shifted index).
    Kept,
    /// The displayed page was removed; `current` now points elsewhere and
    /// its content must be loaded.
    Replaced,
}

#[derive(Debug, Clone)]
pub struct PageManager {
    pages: Vec<Page>,
    current: usize,
    ids: PageIdAllocator,
}

impl PageManager {
    /// A document with a single blank page.
    pub fn new(now_ms: u64) -> Self {
        let mut ids = PageIdAllocator::default();
        let first = Page::blank(ids.next(now_ms));
        Self {
            pages: vec![first],
            current: 0,
            ids,
        }
    }

    /// A document from existing pages. Returns `None` for an empty list.
    pub fn from_pages(pages: Vec<Page>) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }
        let mut ids = PageIdAllocator::default();
        if let Some(max) = pages.iter().map(|p| p.id.get()).max() {
            ids.next(max);
        }
        Some(Self {
            pages,
            current: 0,
            ids,
        })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Page {
        &self.pages[self.current]
    }

    pub fn current_id(&self) -> PageId {
        self.current().id
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Store surface content into the current page.
    pub fn flush(&mut self, content: String, border: BorderSettings) {
        let page = &mut self.pages[self.current];
        page.content = content;
        page.border = border;
    }

    pub fn set_current(&mut self, index: usize) -> Result<(), EditorError> {
        self.check(index)?;
        self.current = index;
        Ok(())
    }

    /// Append a blank page and return its index.
    pub fn push_blank(&mut self, now_ms: u64) -> usize {
        let id = self.ids.next(now_ms);
        self.pages.push(Page::blank(id));
        self.pages.len() - 1
    }

    /// Remove the page at `index`, keeping the current-page invariant.
    ///
    /// Removing a page before the current one shifts the index down by one,
    /// so the displayed page stays the same ([`Removal::Kept`]). It is not
    /// clamped to the last index. Removing the current page clamps the
    /// index to the new last valid index ([`Removal::Replaced`]) and the
    /// caller loads the page now at that index.
    pub fn remove(&mut self, index: usize) -> Result<(Page, Removal), EditorError> {
        self.check(index)?;
        if self.pages.len() == 1 {
            return Err(EditorError::LastPage);
        }
        let removed = self.pages.remove(index);
        let outcome = if index < self.current {
            self.current -= 1;
            Removal::Kept
        } else if index == self.current {
            self.current = self.current.min(self.pages.len() - 1);
            Removal::Replaced
        } else {
            Removal::Kept
        };
        Ok((removed, outcome))
    }

    fn check(&self, index: usize) -> Result<(), EditorError> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(EditorError::InvalidPage {
                index,
                len: self.pages.len(),
            })
        }
    }
}
