pub mod clean;
pub mod error;
pub mod format;
pub mod html;
pub mod pdf;
pub mod print;
pub mod text;

pub use clean::{clean_page, visible_text};
pub use error::{ExportError, LoadError};
pub use format::ExportFormat;
pub use html::{PAGE_HEIGHT_PX, PAGE_WIDTH_PX, html_document};
pub use pdf::{PdfBackend, PdfLoader, Raster, export_pdf};
pub use print::{PRINT_SETTLE_MS, PrintTarget, print, print_document};
pub use text::{PAGE_BREAK, plain_text};

/// Export a document as text-based download content. PDF goes through
/// [`export_pdf`], which needs a loader.
pub fn export_text_format(
    format: ExportFormat,
    pages: &[folio_core::Page],
    language: folio_core::Language,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Html => html_document(pages, language),
        ExportFormat::Text => plain_text(pages),
        ExportFormat::Pdf => Err(ExportError::UnknownFormat("pdf is not a text format".into())),
    }
}
