//! WASM bridge for Folio: exposes the editor engine to the page hosting it.
//!
//! Built with `wasm-pack build --target web`. The host renders
//! `live_markup()` into its contenteditable surface, forwards pointer and
//! key events, and hands edits back through `sync_from_host`. Every call
//! that can change the surface returns JSON describing what happened.

mod dom;
mod pdf;

use dom::{DomRichText, WindowPrintTarget, now_ms};
use folio_core::geometry::Orientation;
use folio_core::{BorderSettings, BorderStyle, ElementId, Language, ObjectId, Page, Point};
use folio_editor::{
    CaretContext, ColumnPosition, Editor, EditorConfig, EditorError, FormatCommand, ImageFile,
    InteractionMode, Modifiers, RowPosition, Severity, ShortcutAction,
};
use folio_export::{ExportFormat, export_pdf, export_text_format};
use wasm_bindgen::prelude::*;

/// The editor as seen from JavaScript.
#[wasm_bindgen]
pub struct FolioEditor {
    editor: Editor<DomRichText>,
    /// Last markup handed to the host; used to report whether a re-render
    /// is needed.
    rendered: String,
}

#[wasm_bindgen]
impl FolioEditor {
    /// A one-page editor. `pages_json`, when given, is a JSON array of
    /// pages to open instead.
    #[wasm_bindgen(constructor)]
    pub fn new(pages_json: Option<String>) -> Result<FolioEditor, JsValue> {
        console_error_panic_hook_setup();
        let config = EditorConfig {
            clock: now_ms,
            ..EditorConfig::default()
        };
        let editor = match pages_json {
            Some(json) => {
                let pages: Vec<Page> =
                    serde_json::from_str(&json).map_err(|e| js_error(&e.to_string()))?;
                Editor::with_pages(DomRichText::new(), config, pages).map_err(to_js)?
            }
            None => Editor::new(DomRichText::new(), config),
        };
        Ok(Self {
            editor,
            rendered: String::new(),
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Start handling events. `surface` is the contenteditable element the
    /// host renders into.
    pub fn install(&mut self, surface: web_sys::Element) {
        self.editor.rich_text_mut().attach(surface);
        self.editor.install();
    }

    pub fn teardown(&mut self) {
        self.editor.teardown();
        self.editor.rich_text_mut().detach();
    }

    /// Markup for the host to render, carrying `data-folio-uid`s.
    pub fn live_markup(&mut self) -> String {
        self.rendered = self.editor.live_markup();
        self.rendered.clone()
    }

    /// Whether the surface changed since the last `live_markup()`.
    pub fn needs_render(&self) -> bool {
        self.editor.live_markup() != self.rendered
    }

    /// The host finished rendering. Runs a deferred page load, if one is
    /// waiting; returns whether it did (the host should render again).
    pub fn after_render(&mut self) -> bool {
        self.editor.after_render()
    }

    pub fn take_focus_request(&mut self) -> bool {
        self.editor.take_focus_request()
    }

    pub fn is_editable(&self) -> bool {
        self.editor.is_editable()
    }

    pub fn sync_from_host(&mut self, markup: &str) -> bool {
        match self.editor.sync_from_host(markup) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("sync refused: {e}");
                false
            }
        }
    }

    // ─── Pointer and keyboard ────────────────────────────────────────────

    /// Returns JSON `{"ok":bool,"mode":"<mode>"}`, or `{"ok":false,"error":"..."}`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        target_uid: Option<f64>,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let target = target_uid.map(|uid| ElementId::claim(uid as u64));
        match self.editor.pointer_down(Point::new(x, y), target, mods) {
            Ok(mode) => {
                let mode = mode.unwrap_or(InteractionMode::Idle).name();
                format!(r#"{{"ok":true,"mode":"{mode}"}}"#)
            }
            Err(e) => error_json(&e.to_string()),
        }
    }

    /// Returns true if an object or cell changed size or position.
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor.pointer_move(Point::new(x, y), mods).is_some()
    }

    /// Returns true if the finished interaction changed the page.
    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor.pointer_up(Point::new(x, y), mods)
    }

    pub fn handle_pointer_cancel(&mut self) -> bool {
        self.editor.pointer_cancel()
    }

    /// Handle a key. Returns JSON `{"handled":bool,"action":"<name>"}`; when
    /// handled, the host should prevent the browser default. `print` is
    /// carried out here.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let Some(action) = self.editor.key_down(key, mods) else {
            return r#"{"handled":false,"action":"none"}"#.to_string();
        };
        if action == ShortcutAction::Print {
            self.print();
        }
        format!(r#"{{"handled":true,"action":"{}"}}"#, action_to_name(action))
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    // ─── Formatting ──────────────────────────────────────────────────────

    /// Run a toolbar command (`bold`, `justifyCenter`, `fontName`, ...).
    pub fn format(&mut self, command: &str, value: Option<String>) -> bool {
        match FormatCommand::parse(command, value.as_deref()) {
            Some(cmd) => self.editor.apply_format(cmd),
            None => {
                log::warn!("unknown format command: {command}");
                false
            }
        }
    }

    /// The caret moved. `caret_json` is a `CaretContext`; returns the
    /// toolbar state as JSON.
    pub fn selection_changed(&mut self, caret_json: &str) -> String {
        let caret: CaretContext = match serde_json::from_str(caret_json) {
            Ok(c) => c,
            Err(e) => return error_json(&e.to_string()),
        };
        let state = self.editor.selection_changed(caret);
        serde_json::to_string(state).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    pub fn format_state(&self) -> String {
        serde_json::to_string(self.editor.format_state()).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    pub fn set_language(&mut self, code: &str) -> bool {
        match code.parse::<Language>() {
            Ok(language) => {
                self.editor.set_language(language);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn font_stack(&self) -> String {
        self.editor.language().font_stack().to_string()
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    /// Insert an image from a file the host read as a data URL. An empty
    /// `data_url` means no file was chosen.
    pub fn insert_image(&mut self, name: &str, mime: &str, data_url: &str) -> String {
        let file = (!data_url.is_empty()).then(|| ImageFile {
            name: name.to_string(),
            mime: mime.to_string(),
            data_url: data_url.to_string(),
        });
        object_json(self.editor.insert_image(file))
    }

    pub fn insert_line(&mut self, orientation: &str) -> String {
        let orientation = Orientation::from_name(orientation).unwrap_or_default();
        object_json(self.editor.insert_line(orientation))
    }

    pub fn insert_table(&mut self, rows: usize, columns: usize, border_style: &str) -> String {
        let style = BorderStyle::from_name(border_style).unwrap_or(BorderStyle::Solid);
        object_json(self.editor.insert_table(rows, columns, style))
    }

    pub fn select_object(&mut self, id: f64) -> bool {
        self.editor.select(ObjectId::from_raw(id as u64))
    }

    pub fn deselect(&mut self) -> bool {
        self.editor.deselect()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected().is_ok()
    }

    /// The selected object as JSON, or `null`.
    pub fn selected_object(&self) -> String {
        match self.editor.selected() {
            Some(obj) => serde_json::json!({
                "id": obj.id.get(),
                "kind": obj.kind,
                "x": obj.geometry.x,
                "y": obj.geometry.y,
                "width": obj.geometry.width,
                "height": obj.geometry.height,
                "rotation": obj.geometry.rotation,
            })
            .to_string(),
            None => "null".to_string(),
        }
    }

    // ─── Tables ──────────────────────────────────────────────────────────

    pub fn select_cell(&mut self, uid: f64) -> bool {
        self.editor.select_cell(ElementId::claim(uid as u64))
    }

    /// `position` is `above`, `below`, `left` or `right`.
    pub fn add_table_line(&mut self, position: &str) -> bool {
        let result = match position {
            "above" => self.editor.add_row(RowPosition::Above),
            "below" => self.editor.add_row(RowPosition::Below),
            "left" => self.editor.add_column(ColumnPosition::Left),
            "right" => self.editor.add_column(ColumnPosition::Right),
            other => {
                log::warn!("unknown table position: {other}");
                return false;
            }
        };
        result.is_ok()
    }

    pub fn delete_row(&mut self) -> bool {
        self.editor.delete_row().is_ok()
    }

    pub fn delete_column(&mut self) -> bool {
        self.editor.delete_column().is_ok()
    }

    pub fn delete_table(&mut self) -> bool {
        self.editor.delete_table().is_ok()
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    pub fn page_count(&self) -> usize {
        self.editor.page_count()
    }

    pub fn current_page(&self) -> usize {
        self.editor.current_page_index()
    }

    pub fn switch_page(&mut self, index: usize) -> bool {
        self.editor.switch_to(index).is_ok()
    }

    /// Returns the new page's index, or -1.
    pub fn add_page(&mut self) -> i32 {
        self.editor.add_page().map_or(-1, |i| i as i32)
    }

    pub fn remove_page(&mut self, index: usize) -> bool {
        self.editor.remove_page(index).is_ok()
    }

    /// All pages, with the displayed one flushed, as JSON.
    pub fn pages_json(&mut self) -> String {
        serde_json::to_string(self.editor.flushed_pages()).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    pub fn border_json(&self) -> String {
        serde_json::to_string(self.editor.border()).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    pub fn set_border(&mut self, border_json: &str) -> bool {
        match serde_json::from_str::<BorderSettings>(border_json) {
            Ok(border) => {
                self.editor.set_border(border);
                true
            }
            Err(e) => {
                log::warn!("bad border settings: {e}");
                false
            }
        }
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    pub fn zoom(&self) -> f64 {
        self.editor.zoom_percent()
    }

    pub fn set_zoom(&mut self, percent: f64) -> f64 {
        self.editor.set_zoom(percent)
    }

    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        self.editor.adjust_zoom(delta)
    }

    // ─── Notices ─────────────────────────────────────────────────────────

    /// The notice to show right now, as JSON, or `null`.
    pub fn visible_notice(&self) -> String {
        match self.editor.visible_notice() {
            Some(n) => serde_json::to_string(n).unwrap_or_else(|e| error_json(&e.to_string())),
            None => "null".to_string(),
        }
    }

    pub fn drain_notices(&mut self) -> String {
        serde_json::to_string(&self.editor.drain_notices()).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// HTML or text export. Returns JSON
    /// `{"ok":true,"fileName":..,"mime":..,"data":..}` or an error.
    pub fn export(&mut self, format: &str) -> String {
        let language = self.editor.language();
        let result = format.parse::<ExportFormat>().and_then(|format| {
            let pages = self.editor.flushed_pages();
            export_text_format(format, pages, language).map(|data| (format, data))
        });
        match result {
            Ok((format, data)) => {
                self.editor.notify("Export successful", Severity::Success);
                serde_json::json!({
                    "ok": true,
                    "fileName": format.file_name(),
                    "mime": format.mime(),
                    "data": data,
                })
                .to_string()
            }
            Err(e) => {
                self.editor.notify(format!("Export failed: {e}"), Severity::Error);
                error_json(&e.to_string())
            }
        }
    }

    /// PDF export through host-loaded libraries; see the `pdf` module for
    /// the shape of `host`. Returns the file bytes, or throws.
    pub fn export_pdf(&mut self, host: JsValue) -> Result<Vec<u8>, JsValue> {
        let language = self.editor.language();
        let mut loader = pdf::HostPdfLoader::new(host);
        let pages = self.editor.flushed_pages();
        match export_pdf(pages, language, &mut loader) {
            Ok(bytes) => {
                self.editor.notify("Export successful", Severity::Success);
                Ok(bytes)
            }
            Err(e) => {
                self.editor.notify(format!("Export failed: {e}"), Severity::Error);
                Err(js_error(&e.to_string()))
            }
        }
    }

    /// Open the print window with every page.
    pub fn print(&mut self) -> bool {
        let language = self.editor.language();
        let mut target = WindowPrintTarget::default();
        let pages = self.editor.flushed_pages();
        match folio_export::print(pages, language, &mut target) {
            Ok(()) => true,
            Err(e) => {
                self.editor.notify(format!("Print failed: {e}"), Severity::Error);
                false
            }
        }
    }
}

fn object_json(result: Result<ObjectId, EditorError>) -> String {
    match result {
        Ok(id) => format!(r#"{{"ok":true,"id":{}}}"#, id.get()),
        Err(e) => error_json(&e.to_string()),
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn to_js(e: EditorError) -> JsValue {
    js_error(&e.to_string())
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::Bold => "bold",
        ShortcutAction::Italic => "italic",
        ShortcutAction::Underline => "underline",
        ShortcutAction::Indent => "indent",
        ShortcutAction::Outdent => "outdent",
        ShortcutAction::Print => "print",
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Folio WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Check that an HTML fragment parses. Returns JSON `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_fragment(markup: &str) -> String {
    match folio_core::parse_fragment(markup) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => error_json(&e.to_string()),
    }
}

/// Visible text of a fragment, as the text export would write it.
#[wasm_bindgen]
pub fn fragment_text(markup: &str) -> String {
    folio_export::visible_text(markup, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn json(text: &str) -> serde_json::Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn object_results_as_json() {
        assert_eq!(object_json(Ok(ObjectId::from_raw(7))), r#"{"ok":true,"id":7}"#);
        assert_eq!(
            json(&object_json(Err(EditorError::NoSelection))),
            serde_json::json!({ "ok": false, "error": "no object selected" })
        );
    }

    #[test]
    fn error_messages_are_escaped() {
        assert_eq!(
            json(&error_json(r#"bad "quote""#))["error"],
            r#"bad "quote""#
        );
    }

    #[test]
    fn shortcut_names() {
        assert_eq!(action_to_name(ShortcutAction::Redo), "redo");
        assert_eq!(action_to_name(ShortcutAction::Deselect), "deselect");
        assert_eq!(action_to_name(ShortcutAction::Print), "print");
    }

    #[test]
    fn standalone_fragment_helpers() {
        assert_eq!(validate_fragment("<p>ok</p>"), r#"{"ok":true}"#);
        assert_eq!(json(&validate_fragment(r#"<p>ok</p><div class="x"#))["ok"], false);
        assert_eq!(fragment_text("<p>One</p><p>Two</p>"), "One\n\nTwo");
    }
}
