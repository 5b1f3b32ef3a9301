//! Standalone HTML documents: the downloadable export and the print
//! document share the same skeleton.

use crate::clean::clean_page;
use crate::error::ExportError;
use folio_core::{Language, Page};
use std::fmt::Write;

/// Width of one page, in CSS pixels (A4 at 96 dpi).
pub const PAGE_WIDTH_PX: f64 = 794.0;
/// Height of one page, in CSS pixels.
pub const PAGE_HEIGHT_PX: f64 = 1123.0;

pub(crate) const DOCUMENT_TITLE: &str = "Document Export";

/// Export every page into one HTML document.
pub fn html_document(pages: &[Page], language: Language) -> Result<String, ExportError> {
    let mut body = String::new();
    for (i, page) in pages.iter().enumerate() {
        let content = clean_page(&page.content, i)?;
        page_block(&mut body, "page", page, &content);
    }
    let style = format!(
        "    body {{ margin: 0; padding: 40px; font-family: {font}; }}\n\
         \x20   .content {{ width: {width}px; margin: 0 auto; background: white; position: relative; }}\n\
         \x20   .page {{ position: relative; box-sizing: border-box; min-height: {height}px; padding: 40px; }}\n\
         \x20   .page + .page {{ margin-top: 40px; }}\n",
        font = language.font_stack(),
        width = PAGE_WIDTH_PX,
        height = PAGE_HEIGHT_PX,
    );
    Ok(document(
        language,
        &style,
        &format!("  <div class=\"content\">\n{body}  </div>\n"),
    ))
}

/// One page of a document: a `<div>` of the given class, with the page
/// border as inline style when enabled.
pub(crate) fn page_block(out: &mut String, class: &str, page: &Page, content: &str) {
    match page.border.css() {
        Some(css) => {
            let _ = writeln!(out, "  <div class=\"{class}\" style=\"{css}\">");
        }
        None => {
            let _ = writeln!(out, "  <div class=\"{class}\">");
        }
    }
    out.push_str(content);
    out.push_str("\n  </div>\n");
}

pub(crate) fn document(language: Language, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n\
         \x20 <meta charset=\"UTF-8\">\n\
         \x20 <title>{DOCUMENT_TITLE}</title>\n\
         \x20 <style>\n{style}  </style>\n\
         </head>\n\
         <body>\n{body}</body>\n\
         </html>\n",
        lang = language.html_lang(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{BorderSettings, BorderStyle, PageId};

    fn page(content: &str, border: BorderSettings) -> Page {
        Page {
            id: PageId::from_millis(1),
            content: content.to_string(),
            border,
        }
    }

    #[test]
    fn document_carries_language_and_font_stack() {
        let html = html_document(&[page("<p>வணக்கம்</p>", BorderSettings::default())], Language::Tamil)
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"ta\">"));
        assert!(html.contains("font-family: 'Noto Sans Tamil'"));
        assert!(html.contains("<title>Document Export</title>"));
        assert!(html.contains(".content { width: 794px;"));
        assert!(html.contains("<p>வணக்கம்</p>"));
    }

    #[test]
    fn bordered_page_gets_inline_style() {
        let border = BorderSettings {
            enabled: true,
            style: BorderStyle::Double,
            width_px: 3.0,
            color: "#ff0000".into(),
        };
        let html = html_document(&[page("<p>x</p>", border)], Language::English).unwrap();
        assert!(html.contains(r#"<div class="page" style="border: 3px double #ff0000;">"#));
    }

    #[test]
    fn border_color_cannot_leave_the_style_attribute() {
        let border = BorderSettings {
            enabled: true,
            color: r#"#000"><script>alert(1)</script>"#.into(),
            ..BorderSettings::default()
        };
        let html = html_document(&[page("<p>x</p>", border)], Language::English).unwrap();
        assert!(html.contains(r#"<div class="page" style="border: 1px solid #000000;">"#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn selection_classes_are_not_exported() {
        let content = r#"<p class="image-paragraph"><div class="img-container selected" contenteditable="false"><img src="a.png"></div></p>"#;
        let html = html_document(&[page(content, BorderSettings::default())], Language::English)
            .unwrap();
        assert!(html.contains(r#"<div class="img-container"><img src="a.png"></div>"#));
        assert!(!html.contains("selected"));
        assert!(!html.contains("contenteditable"));
    }
}
