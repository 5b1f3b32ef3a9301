//! Browser-backed capabilities: the document's rich-text commands, the
//! print window and the clock.

use folio_editor::RichText;
use folio_export::PrintTarget;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlDocument, Window};

/// `Date.now()`, in whole milliseconds.
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Rich-text commands run through `document.execCommand` on the current
/// selection. The surface element, when attached, is read back after each
/// command so the editor can re-sync.
pub struct DomRichText {
    document: Option<HtmlDocument>,
    surface: Option<Element>,
}

impl DomRichText {
    pub fn new() -> Self {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<HtmlDocument>().ok());
        if document.is_none() {
            log::warn!("no HTML document: rich-text commands disabled");
        }
        Self {
            document,
            surface: None,
        }
    }

    pub fn attach(&mut self, surface: Element) {
        self.surface = Some(surface);
    }

    pub fn detach(&mut self) {
        self.surface = None;
    }
}

impl Default for DomRichText {
    fn default() -> Self {
        Self::new()
    }
}

impl RichText for DomRichText {
    fn execute(&mut self, command: &str, value: Option<&str>) -> bool {
        let Some(doc) = &self.document else {
            return false;
        };
        let result = match value {
            Some(v) => doc.exec_command_with_show_ui_and_value(command, false, v),
            None => doc.exec_command(command),
        };
        result.unwrap_or_else(|err| {
            log::warn!("execCommand({command}) threw: {err:?}");
            false
        })
    }

    fn query_state(&self, command: &str) -> bool {
        self.document
            .as_ref()
            .and_then(|doc| doc.query_command_state(command).ok())
            .unwrap_or(false)
    }

    fn surface_markup(&self) -> Option<String> {
        self.surface.as_ref().map(Element::inner_html)
    }
}

/// A fresh browser window that receives the print document.
#[derive(Default)]
pub struct WindowPrintTarget {
    window: Option<Window>,
}

impl PrintTarget for WindowPrintTarget {
    fn write_document(&mut self, html: &str) -> Result<(), String> {
        let parent = web_sys::window().ok_or("no window")?;
        let win = parent
            .open()
            .map_err(|e| format!("{e:?}"))?
            .ok_or("print window was blocked")?;
        let doc = win
            .document()
            .ok_or("print window has no document")?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| "print window document is not HTML".to_string())?;
        doc.write(&js_sys::Array::of1(&JsValue::from_str(html)))
            .map_err(|e| format!("{e:?}"))?;
        doc.close().map_err(|e| format!("{e:?}"))?;
        self.window = Some(win);
        Ok(())
    }

    fn print_after(&mut self, delay_ms: u32) {
        let Some(win) = self.window.take() else {
            return;
        };
        let target = win.clone();
        let callback = Closure::once_into_js(move || {
            if let Err(e) = target.print() {
                log::warn!("print failed: {e:?}");
            }
        });
        let scheduled = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay_ms as i32,
        );
        if let Err(e) = scheduled {
            log::warn!("could not schedule print: {e:?}");
        }
    }
}
