//! PDF export over an external rasterizer and PDF assembler.
//!
//! The libraries are heavy and loaded on first use, behind [`PdfLoader`].
//! Every page is rasterized before the first one is handed to the
//! assembler, so a failure on any page produces no file at all.

use crate::clean::clean_page;
use crate::error::{ExportError, LoadError};
use crate::html::PAGE_WIDTH_PX;
use folio_core::{Language, Page};

/// A4 paper width, in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 paper height, in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;
/// Rasterization scale factor relative to CSS pixels.
pub const RASTER_SCALE: f64 = 2.0;

/// One rasterized page.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width_px: u32,
    pub height_px: u32,
    /// Encoded image (PNG) as produced by the rasterizer.
    pub image: Vec<u8>,
}

impl Raster {
    /// Height the raster takes on an A4 sheet when scaled to the full
    /// sheet width, clamped to the sheet.
    pub fn height_mm(&self) -> f64 {
        if self.width_px == 0 {
            return 0.0;
        }
        let h = A4_WIDTH_MM * f64::from(self.height_px) / f64::from(self.width_px);
        h.min(A4_HEIGHT_MM)
    }
}

/// The rasterizer and assembler pair.
pub trait PdfBackend {
    /// Render a standalone page of markup at the given CSS width.
    fn rasterize(&mut self, markup: &str, width_px: f64, scale: f64) -> Result<Raster, String>;

    /// Append a sheet showing `raster` at `height_mm`, starting at the top.
    fn add_page(&mut self, raster: &Raster, height_mm: f64) -> Result<(), String>;

    /// Finish the document and return the PDF bytes.
    fn finish(&mut self) -> Result<Vec<u8>, String>;
}

/// Makes the backend available, loading it on first use.
pub trait PdfLoader {
    fn ensure_loaded(&mut self) -> Result<&mut dyn PdfBackend, LoadError>;
}

/// Markup of one page as the rasterizer receives it.
fn page_markup(page: &Page, index: usize, language: Language) -> Result<String, ExportError> {
    let content = clean_page(&page.content, index)?;
    let border = page.border.css().unwrap_or_default();
    Ok(format!(
        "<div style=\"width: {PAGE_WIDTH_PX}px; box-sizing: border-box; padding: 40px; \
         background: white; font-family: {font}; {border}\">{content}</div>",
        font = language.font_stack(),
    ))
}

/// Rasterize every page and assemble the PDF.
pub fn export_pdf(
    pages: &[Page],
    language: Language,
    loader: &mut dyn PdfLoader,
) -> Result<Vec<u8>, ExportError> {
    let markup = pages
        .iter()
        .enumerate()
        .map(|(i, page)| page_markup(page, i, language))
        .collect::<Result<Vec<_>, _>>()?;

    let backend = loader.ensure_loaded()?;

    let mut rasters = Vec::with_capacity(markup.len());
    for (index, m) in markup.iter().enumerate() {
        let raster = backend
            .rasterize(m, PAGE_WIDTH_PX, RASTER_SCALE)
            .map_err(|reason| ExportError::Rasterize { index, reason })?;
        log::trace!("page {index} rasterized at {}x{}", raster.width_px, raster.height_px);
        rasters.push(raster);
    }

    for raster in &rasters {
        backend
            .add_page(raster, raster.height_mm())
            .map_err(ExportError::Assemble)?;
    }
    let bytes = backend.finish().map_err(ExportError::Assemble)?;
    log::debug!("PDF assembled: {} pages, {} bytes", rasters.len(), bytes.len());
    Ok(bytes)
}
