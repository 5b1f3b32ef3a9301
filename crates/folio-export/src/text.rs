use crate::clean::visible_text;
use crate::error::ExportError;
use folio_core::Page;

/// Marker placed between the text of consecutive pages.
pub const PAGE_BREAK: &str = "\n\n--- Page Break ---\n\n";

/// Visible text of every page, joined by [`PAGE_BREAK`].
pub fn plain_text(pages: &[Page]) -> Result<String, ExportError> {
    let texts = pages
        .iter()
        .enumerate()
        .map(|(i, page)| visible_text(&page.content, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(texts.join(PAGE_BREAK))
}
