use folio_core::ParseError;
use thiserror::Error;

/// The on-demand PDF libraries could not be made available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("export library unavailable: {0}")]
pub struct LoadError(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("page {index} is not valid markup: {source}")]
    Parse { index: usize, source: ParseError },
    #[error("page {index} could not be rasterized: {reason}")]
    Rasterize { index: usize, reason: String },
    #[error("PDF assembly failed: {0}")]
    Assemble(String),
    #[error("print target unavailable: {0}")]
    Print(String),
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}
