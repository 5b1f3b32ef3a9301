use crate::clean::clean_page;
use crate::error::ExportError;
use crate::html::{PAGE_HEIGHT_PX, PAGE_WIDTH_PX, document, page_block};
use folio_core::{Language, Page};

/// Time the print target gets to lay out the document before the print
/// dialog opens.
pub const PRINT_SETTLE_MS: u32 = 500;

/// Where a print document goes: a new browser window in the wasm bridge,
/// a recorder in tests.
pub trait PrintTarget {
    /// Open the target and replace its content with `html`.
    fn write_document(&mut self, html: &str) -> Result<(), String>;

    /// Open the print dialog once `delay_ms` have passed.
    fn print_after(&mut self, delay_ms: u32);
}

/// Build the print document: one `print-page` block per page, each on its
/// own sheet.
pub fn print_document(pages: &[Page], language: Language) -> Result<String, ExportError> {
    let mut body = String::new();
    for (i, page) in pages.iter().enumerate() {
        let content = clean_page(&page.content, i)?;
        page_block(&mut body, "print-page", page, &content);
    }
    let style = format!(
        "    @page {{ size: A4; margin: 0; }}\n\
         \x20   body {{ margin: 0; font-family: {font}; }}\n\
         \x20   .print-page {{ position: relative; box-sizing: border-box; width: {width}px; min-height: {height}px; padding: 40px; page-break-after: always; break-after: page; }}\n\
         \x20   .print-page:last-child {{ page-break-after: auto; break-after: auto; }}\n",
        font = language.font_stack(),
        width = PAGE_WIDTH_PX,
        height = PAGE_HEIGHT_PX,
    );
    Ok(document(language, &style, &body))
}

/// Write the print document to `target` and schedule the dialog.
pub fn print(
    pages: &[Page],
    language: Language,
    target: &mut dyn PrintTarget,
) -> Result<(), ExportError> {
    let html = print_document(pages, language)?;
    target.write_document(&html).map_err(ExportError::Print)?;
    log::debug!("print document written ({} pages)", pages.len());
    target.print_after(PRINT_SETTLE_MS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{BorderSettings, BorderStyle, PageId};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Window {
        html: Option<String>,
        printed_after: Option<u32>,
        blocked: bool,
    }

    impl PrintTarget for Window {
        fn write_document(&mut self, html: &str) -> Result<(), String> {
            if self.blocked {
                return Err("popup blocked".into());
            }
            self.html = Some(html.to_string());
            Ok(())
        }

        fn print_after(&mut self, delay_ms: u32) {
            self.printed_after = Some(delay_ms);
        }
    }

    fn pages() -> Vec<Page> {
        vec![
            Page {
                id: PageId::from_millis(1),
                content: "<p>First</p>".into(),
                border: BorderSettings {
                    enabled: true,
                    style: BorderStyle::Dashed,
                    width_px: 2.0,
                    color: "#333333".into(),
                },
            },
            Page {
                id: PageId::from_millis(2),
                content: "<p>Second</p>".into(),
                border: BorderSettings::default(),
            },
        ]
    }

    #[test]
    fn every_page_gets_a_block() {
        let html = print_document(&pages(), Language::Hindi).unwrap();
        assert_eq!(html.matches("<div class=\"print-page\"").count(), 2);
        assert!(html.contains(r#"<div class="print-page" style="border: 2px dashed #333333;">"#));
        assert!(html.contains("page-break-after: always"));
        assert!(html.contains("<html lang=\"hi\">"));
    }

    #[test]
    fn dialog_opens_after_the_settle_delay() {
        let mut window = Window::default();
        print(&pages(), Language::English, &mut window).unwrap();
        assert!(window.html.is_some());
        assert_eq!(window.printed_after, Some(PRINT_SETTLE_MS));
    }

    #[test]
    fn blocked_target_never_prints() {
        let mut window = Window {
            blocked: true,
            ..Window::default()
        };
        assert_eq!(
            print(&pages(), Language::English, &mut window),
            Err(ExportError::Print("popup blocked".into()))
        );
        assert_eq!(window.printed_after, None);
    }
}
