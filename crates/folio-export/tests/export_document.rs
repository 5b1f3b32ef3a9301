//! Integration tests: exporting a multi-page form.

use folio_core::{BorderSettings, BorderStyle, Language, Page, PageId};
use folio_export::{
    ExportError, ExportFormat, LoadError, PdfBackend, PdfLoader, Raster, export_pdf,
    export_text_format, html_document, plain_text, print_document,
};
use pretty_assertions::assert_eq;

const FORM: &str = include_str!("fixtures/form_page.html");

fn document() -> Vec<Page> {
    vec![
        Page {
            id: PageId::from_millis(1_000),
            content: FORM.to_string(),
            border: BorderSettings {
                enabled: true,
                style: BorderStyle::Solid,
                width_px: 2.0,
                color: "#1a1a1a".into(),
            },
        },
        Page {
            id: PageId::from_millis(2_000),
            content: "<p>Declaration</p>".to_string(),
            border: BorderSettings::default(),
        },
    ]
}

#[test]
fn plain_text_of_a_form() {
    assert_eq!(
        plain_text(&document()).unwrap(),
        "Application Form\n\n\
         Applicant:\u{a0}________\nDate:\u{a0}________\n\n\
         Header 1\tHeader 2\nName\tAge\n\n\
         Signature:\u{a0}________\
         \n\n--- Page Break ---\n\n\
         Declaration"
    );
}

#[test]
fn html_export_keeps_objects_and_drops_chrome() {
    let html = html_document(&document(), Language::Malayalam).unwrap();
    assert!(html.contains("<html lang=\"ml\">"));
    assert!(html.contains("'Noto Sans Malayalam'"));
    assert!(html.contains(r#"data-rotation="15""#));
    assert!(html.contains(r#"data-orientation="horizontal""#));
    assert!(html.contains(r#"data-border-style="solid""#));
    for chrome in [
        "resize-handle",
        "rotate-handle",
        "table-resize-handle",
        "table-controls",
        "selected",
        "dragging",
        "contenteditable",
    ] {
        assert!(!html.contains(chrome), "{chrome} leaked into the export");
    }
    assert_eq!(html.matches("<div class=\"page\"").count(), 2);
}

#[test]
fn print_document_breaks_between_pages() {
    let html = print_document(&document(), Language::English).unwrap();
    assert!(html.contains(r#"<div class="print-page" style="border: 2px solid #1a1a1a;">"#));
    assert!(html.contains("<div class=\"print-page\">\n<p>Declaration</p>"));
    assert!(html.contains(".print-page:last-child"));
}

#[test]
fn text_formats_by_name() {
    let format: ExportFormat = "txt".parse().unwrap();
    let text = export_text_format(format, &document(), Language::English).unwrap();
    assert!(text.ends_with("Declaration"));
    assert!(export_text_format(ExportFormat::Pdf, &document(), Language::English).is_err());
}

struct OfflineLoader;

impl PdfLoader for OfflineLoader {
    fn ensure_loaded(&mut self) -> Result<&mut dyn PdfBackend, LoadError> {
        Err(LoadError("script failed to load".into()))
    }
}

#[derive(Default)]
struct Counting {
    rasterized: usize,
}

impl PdfBackend for Counting {
    fn rasterize(&mut self, _: &str, _: f64, _: f64) -> Result<Raster, String> {
        self.rasterized += 1;
        Ok(Raster {
            width_px: 1588,
            height_px: 2246,
            image: Vec::new(),
        })
    }

    fn add_page(&mut self, _: &Raster, _: f64) -> Result<(), String> {
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, String> {
        Err("out of memory".into())
    }
}

struct Loaded(Counting);

impl PdfLoader for Loaded {
    fn ensure_loaded(&mut self) -> Result<&mut dyn PdfBackend, LoadError> {
        Ok(&mut self.0)
    }
}

#[test]
fn pdf_export_fails_without_its_libraries() {
    assert!(matches!(
        export_pdf(&document(), Language::English, &mut OfflineLoader),
        Err(ExportError::Load(_))
    ));
}

#[test]
fn pdf_assembly_failure_produces_nothing() {
    let mut loader = Loaded(Counting::default());
    assert_eq!(
        export_pdf(&document(), Language::English, &mut loader),
        Err(ExportError::Assemble("out of memory".into()))
    );
    assert_eq!(loader.0.rasterized, 2);
}
