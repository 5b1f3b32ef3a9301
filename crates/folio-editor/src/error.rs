use folio_core::ParseError;
use thiserror::Error;

/// Rejected transitions of the manipulation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("another interaction is already active: {active}")]
    Busy { active: &'static str },
    #[error("object is no longer on the page")]
    StaleObject,
    #[error("object kind cannot be manipulated this way")]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("page index {index} out of range (have {len})")]
    InvalidPage { index: usize, len: usize },
    #[error("cannot remove the only page")]
    LastPage,
    #[error("a page load is still pending")]
    LoadPending,
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error("invalid file: {0}")]
    InvalidFile(String),
    #[error("no table cell selected")]
    NoCellSelected,
    #[error("cannot delete the last row")]
    LastRow,
    #[error("cannot delete the last column")]
    LastColumn,
    #[error("no object selected")]
    NoSelection,
    #[error(transparent)]
    Parse(#[from] ParseError),
}
