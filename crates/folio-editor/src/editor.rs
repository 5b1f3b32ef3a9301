//! The editor: owns the surface, the pages and everything that mutates them.
//!
//! Host events come in through `handle_event` (or the per-event methods).
//! Every mutation records one history snapshot of the content before it,
//! then flushes the surface into the current page. Page loads are deferred
//! to the host's next render pass (`after_render`); until then pointer
//! interactions are refused and flushing is skipped, since the surface still
//! shows the previous page.

use crate::config::EditorConfig;
use crate::deferred::{DeferredAction, RenderQueue};
use crate::error::{EditorError, InteractionError};
use crate::format::{CaretContext, FormatCommand, FormatState, RichText};
use crate::hit::{HitPart, hit_element, hit_point};
use crate::history::{PageHistories, Snapshot};
use crate::input::{InputEvent, Modifiers};
use crate::manipulate::{InteractionMode, Manipulator, Start, Update};
use crate::notices::{Notice, Notices, Severity};
use crate::pages::{PageManager, Removal};
use crate::registry::ObjectRegistry;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::surface::{Surface, build_image, build_line};
use crate::table::{self, ColumnPosition, RowPosition};
use folio_core::geometry::{Orientation, clamp_zoom, zoom_factor};
use folio_core::markup::{format_px, parse_px};
use folio_core::{
    BorderSettings, BorderStyle, CellEdge, EditorObject, ElementId, Language, MarkupTree,
    NodeIndex, ObjectId, ObjectKind, Page, Point, Size,
};

/// An image picked by the user, already read as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub data_url: String,
}

pub struct Editor<R: RichText> {
    config: EditorConfig,
    rich_text: R,
    surface: Surface,
    registry: ObjectRegistry,
    manipulator: Manipulator,
    pages: PageManager,
    histories: PageHistories,
    queue: RenderQueue,
    notices: Notices,
    format: FormatState,
    caret: CaretContext,
    zoom_percent: f64,
    language: Language,
    installed: bool,
}

impl<R: RichText> Editor<R> {
    /// A fresh editor with one blank page loaded.
    pub fn new(rich_text: R, config: EditorConfig) -> Self {
        let now = (config.clock)();
        Self::assemble(rich_text, config, PageManager::new(now))
    }

    /// An editor over existing pages, the first one displayed.
    pub fn with_pages(rich_text: R, config: EditorConfig, pages: Vec<Page>) -> Result<Self, EditorError> {
        let pages = PageManager::from_pages(pages).ok_or(EditorError::InvalidPage { index: 0, len: 0 })?;
        Ok(Self::assemble(rich_text, config, pages))
    }

    fn assemble(rich_text: R, config: EditorConfig, pages: PageManager) -> Self {
        let mut editor = Self {
            histories: PageHistories::new(config.history_capacity),
            notices: Notices::new(config.notice_ttl_ms),
            zoom_percent: clamp_zoom(config.zoom_percent),
            language: config.language,
            config,
            rich_text,
            surface: Surface::new(),
            registry: ObjectRegistry::new(),
            manipulator: Manipulator::new(),
            pages,
            queue: RenderQueue::new(),
            format: FormatState::default(),
            caret: CaretContext::default(),
            installed: false,
        };
        editor.load_current();
        editor
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Start receiving pointer and keyboard events.
    pub fn install(&mut self) {
        if self.installed {
            log::trace!("editor listeners already installed");
            return;
        }
        self.installed = true;
        log::debug!("editor listeners installed");
    }

    /// Stop receiving events. An interaction still running is cancelled.
    pub fn teardown(&mut self) {
        if !self.installed {
            return;
        }
        self.finish_interaction();
        self.installed = false;
        log::debug!("editor listeners removed");
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn rich_text(&self) -> &R {
        &self.rich_text
    }

    pub fn rich_text_mut(&mut self) -> &mut R {
        &mut self.rich_text
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn tree(&self) -> &MarkupTree {
        &self.surface.tree
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn pages(&self) -> &[Page] {
        self.pages.pages()
    }

    /// Pages with the surface flushed into the current one first.
    pub fn flushed_pages(&mut self) -> &[Page] {
        self.flush();
        self.pages.pages()
    }

    pub fn current_page_index(&self) -> usize {
        self.pages.current_index()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stored form of the surface.
    pub fn content(&self) -> String {
        self.surface.content()
    }

    /// Markup the host renders.
    pub fn live_markup(&self) -> String {
        self.surface.live_markup()
    }

    pub fn border(&self) -> &BorderSettings {
        self.surface.border()
    }

    pub fn is_editable(&self) -> bool {
        self.surface.is_editable()
    }

    pub fn take_focus_request(&mut self) -> bool {
        self.surface.take_focus_request()
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.manipulator.mode()
    }

    pub fn is_load_pending(&self) -> bool {
        self.queue.is_pending()
    }

    pub fn selected(&self) -> Option<&EditorObject> {
        self.registry.selected().and_then(|id| self.registry.get(id))
    }

    pub fn format_state(&self) -> &FormatState {
        &self.format
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        log::debug!("language set to {language}");
        self.language = language;
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn visible_notice(&self) -> Option<&Notice> {
        self.notices.visible(self.now())
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn can_undo(&self) -> bool {
        self.histories
            .get(self.pages.current_id())
            .is_some_and(|h| h.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.histories
            .get(self.pages.current_id())
            .is_some_and(|h| h.can_redo())
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    pub fn zoom_percent(&self) -> f64 {
        self.zoom_percent
    }

    pub fn set_zoom(&mut self, percent: f64) -> f64 {
        self.zoom_percent = clamp_zoom(percent);
        self.zoom_percent
    }

    pub fn adjust_zoom(&mut self, delta: f64) -> f64 {
        self.set_zoom(self.zoom_percent + delta)
    }

    fn zoom(&self) -> f64 {
        zoom_factor(self.zoom_percent)
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Dispatch one host event. For key events, returns the shortcut that
    /// was handled; `Print` is left for the host to carry out.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<Option<ShortcutAction>, EditorError> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                target,
                modifiers,
            } => {
                self.pointer_down(Point::new(x, y), target, modifiers)?;
                Ok(None)
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(x, y), modifiers);
                Ok(None)
            }
            InputEvent::PointerUp { x, y, modifiers } => {
                self.pointer_up(Point::new(x, y), modifiers);
                Ok(None)
            }
            InputEvent::PointerCancel => {
                self.pointer_cancel();
                Ok(None)
            }
            InputEvent::KeyDown { key, modifiers } => Ok(self.key_down(&key, modifiers)),
        }
    }

    /// Pointer pressed on the surface. Returns the interaction it started,
    /// if any. Clicking empty space deselects; clicking a table cell selects
    /// the cell without starting anything.
    pub fn pointer_down(
        &mut self,
        point: Point,
        target: Option<ElementId>,
        _modifiers: Modifiers,
    ) -> Result<Option<InteractionMode>, EditorError> {
        if !self.installed {
            return Ok(None);
        }
        if self.queue.is_pending() {
            log::warn!("pointer-down refused: page load pending");
            return Err(EditorError::LoadPending);
        }
        if let Some(active) = self.manipulator.active() {
            log::warn!("pointer-down refused: {} in progress", active.mode.name());
            return Err(InteractionError::Busy {
                active: active.mode.name(),
            }
            .into());
        }

        let zoom = self.zoom();
        let tree = &self.surface.tree;
        let hit = match target.and_then(|uid| tree.find_by_uid(uid)) {
            Some(idx) => hit_element(&self.registry, tree, idx),
            None => hit_point(
                &self.registry,
                Point::new(point.x / zoom, point.y / zoom),
            ),
        };
        let Some(hit) = hit else {
            self.registry.deselect(&mut self.surface.tree);
            return Ok(None);
        };

        if let HitPart::Cell(cell) = hit.part {
            self.focus_cell(cell);
            return Ok(None);
        }
        self.clear_cells();
        if !self.registry.select(hit.object, &mut self.surface.tree) {
            return Err(InteractionError::StaleObject.into());
        }
        let start = match hit.part {
            HitPart::Cell(_) => return Ok(None),
            HitPart::Body => Start::Drag,
            HitPart::Handle(handle) => Start::Resize(handle),
            HitPart::Rotate => Start::Rotate,
            HitPart::CellEdge { cell, edge } => {
                table::select_cell(&mut self.surface.tree, cell);
                let Some(object) = self.registry.get(hit.object) else {
                    return Err(InteractionError::StaleObject.into());
                };
                Start::CellResize {
                    cell: self.surface.tree.element_ref(cell),
                    edge,
                    size: cell_size(&self.surface.tree, cell, object),
                }
            }
        };

        let before = self.surface.snapshot();
        let Some(object) = self.registry.get(hit.object) else {
            return Err(InteractionError::StaleObject.into());
        };
        let mode = self.manipulator.begin(object, start, point, zoom)?;
        self.set_styling(hit.object, mode, true);
        self.surface.set_editable(false);
        self.histories
            .for_page(self.pages.current_id())
            .begin_batch(before);
        Ok(Some(mode))
    }

    /// Pointer moved. Applies and returns the new geometry of the active
    /// interaction.
    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) -> Option<Update> {
        if !self.installed {
            return None;
        }
        let (object, mode) = {
            let active = self.manipulator.active()?;
            (active.object, active.mode)
        };
        let update = self.manipulator.update(point, modifiers.shift, self.zoom())?;
        let applied = match update {
            Update::Geometry(g) => self.registry.apply_geometry(object, g, &mut self.surface.tree),
            Update::Cell { cell, size } => {
                let tree = &mut self.surface.tree;
                match tree.resolve(cell).and_then(|idx| tree.element_mut(idx)) {
                    Some(el) => {
                        match mode {
                            InteractionMode::CellResizing {
                                edge: CellEdge::Bottom,
                            } => el.set_style("height", &format_px(size.height)),
                            _ => el.set_style("width", &format_px(size.width)),
                        }
                        true
                    }
                    None => false,
                }
            }
        };
        if !applied {
            log::debug!("{object} vanished mid-{}, ending interaction", mode.name());
            self.finish_interaction();
            return None;
        }
        Some(update)
    }

    /// Pointer released: apply the final position and end the interaction.
    /// Returns whether a history entry was recorded.
    pub fn pointer_up(&mut self, point: Point, modifiers: Modifiers) -> bool {
        if !self.installed || !self.manipulator.is_active() {
            return false;
        }
        self.pointer_move(point, modifiers);
        self.finish_interaction()
    }

    /// Pointer capture lost. Ends the interaction where it stands.
    pub fn pointer_cancel(&mut self) -> bool {
        if !self.installed {
            return false;
        }
        self.finish_interaction()
    }

    fn finish_interaction(&mut self) -> bool {
        let Some(done) = self.manipulator.finish() else {
            return false;
        };
        self.set_styling(done.object, done.mode, false);
        self.surface.set_editable(true);
        if matches!(done.mode, InteractionMode::CellResizing { .. }) {
            self.registry.rebuild(&self.surface.tree);
        }
        let current = self.surface.snapshot();
        let recorded = self
            .histories
            .for_page(self.pages.current_id())
            .end_batch(&current);
        self.flush();
        recorded
    }

    fn set_styling(&mut self, object: ObjectId, mode: InteractionMode, on: bool) {
        let Some(class) = mode.styling_class() else {
            return;
        };
        let Some(idx) = self.registry.resolve(object, &self.surface.tree) else {
            return;
        };
        if let Some(el) = self.surface.tree.element_mut(idx) {
            if on {
                el.add_class(class);
            } else {
                el.remove_class(class);
            }
        }
    }

    /// Key pressed. Returns the shortcut it resolved to when the editor
    /// handled it; the host should then suppress its default action.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if !self.installed {
            return None;
        }
        let action = ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        )?;
        log::debug!("shortcut {key} → {action:?}");
        let handled = match action {
            ShortcutAction::Undo => {
                self.undo();
                true
            }
            ShortcutAction::Redo => {
                self.redo();
                true
            }
            ShortcutAction::Bold => self.shortcut_format(FormatCommand::Bold),
            ShortcutAction::Italic => self.shortcut_format(FormatCommand::Italic),
            ShortcutAction::Underline => self.shortcut_format(FormatCommand::Underline),
            ShortcutAction::Indent => self.shortcut_format(FormatCommand::Indent),
            ShortcutAction::Outdent => self.shortcut_format(FormatCommand::Outdent),
            ShortcutAction::Delete => {
                if self.selected_cell().is_some() {
                    self.clear_cell().is_ok()
                } else {
                    self.delete_selected().is_ok()
                }
            }
            ShortcutAction::Deselect => self.deselect(),
            ShortcutAction::Print => true,
        };
        handled.then_some(action)
    }

    fn shortcut_format(&mut self, command: FormatCommand) -> bool {
        self.apply_format(command);
        true
    }

    // ─── Surface sync ────────────────────────────────────────────────────

    /// Take the host's edited surface (live markup with uids). Object
    /// identities carry over.
    pub fn sync_from_host(&mut self, markup: &str) -> Result<(), EditorError> {
        if self.queue.is_pending() {
            log::debug!("sync ignored: page load pending");
            return Err(EditorError::LoadPending);
        }
        let border = self.surface.border().clone();
        self.surface.load(markup, border)?;
        self.registry.rebuild(&self.surface.tree);
        self.flush();
        Ok(())
    }

    fn flush(&mut self) {
        if self.queue.is_pending() {
            log::trace!("flush skipped: page load pending");
            return;
        }
        self.pages
            .flush(self.surface.content(), self.surface.border().clone());
    }

    fn record(&mut self, before: Snapshot) {
        self.histories
            .for_page(self.pages.current_id())
            .record(before);
    }

    /// Replace the whole surface, giving every object a fresh identity.
    fn replace_surface(&mut self, snapshot: &Snapshot) {
        if let Err(err) = self.surface.restore(snapshot) {
            log::error!("could not restore snapshot: {err}");
            self.surface.tree = MarkupTree::new();
        }
        self.registry.reset_and_rebuild(&self.surface.tree);
        self.surface.request_focus();
        self.flush();
    }

    fn now(&self) -> u64 {
        (self.config.clock)()
    }

    /// Post a notice on behalf of the host (export and print outcomes).
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        let now = self.now();
        self.notices.push(message, severity, now);
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if self.manipulator.is_active() || self.queue.is_pending() {
            return false;
        }
        let current = self.surface.snapshot();
        match self
            .histories
            .for_page(self.pages.current_id())
            .undo(current)
        {
            Some(previous) => {
                self.replace_surface(&previous);
                self.notify("Undo successful", Severity::Success);
                true
            }
            None => {
                self.notify("Nothing to undo", Severity::Warning);
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.manipulator.is_active() || self.queue.is_pending() {
            return false;
        }
        let current = self.surface.snapshot();
        match self
            .histories
            .for_page(self.pages.current_id())
            .redo(current)
        {
            Some(next) => {
                self.replace_surface(&next);
                self.notify("Redo successful", Severity::Success);
                true
            }
            None => {
                self.notify("Nothing to redo", Severity::Warning);
                false
            }
        }
    }

    // ─── Formatting ──────────────────────────────────────────────────────

    /// Run a formatting command through the rich-text capability.
    pub fn apply_format(&mut self, command: FormatCommand) -> bool {
        let before = self.surface.snapshot();
        if !self.rich_text.execute(command.name(), command.value()) {
            log::debug!("{} was not applied", command.name());
            return false;
        }
        self.record(before);
        if let Some(markup) = self.rich_text.surface_markup()
            && let Err(err) = self.sync_from_host(&markup)
        {
            log::warn!("could not sync after {}: {err}", command.name());
        }
        self.refresh_format_state();
        self.notify(command.notice(), Severity::Success);
        true
    }

    /// The caret moved. Re-derives the toolbar state when it is in the
    /// surface; never mutates content.
    pub fn selection_changed(&mut self, caret: CaretContext) -> &FormatState {
        self.caret = caret.resolve_styles(&self.surface.tree);
        self.refresh_format_state();
        &self.format
    }

    fn refresh_format_state(&mut self) {
        if !self.caret.in_surface {
            return;
        }
        self.format = FormatState::derive(&self.format, &self.rich_text, &self.caret);
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    fn insertion_point(&self) -> (NodeIndex, usize) {
        let caret = self.caret.anchor.filter(|_| self.caret.in_surface);
        self.surface.insertion_point(caret)
    }

    /// Wrap up after a block was inserted at `container`.
    fn finish_insert(&mut self, before: Snapshot, container: NodeIndex, what: &str) -> Result<ObjectId, EditorError> {
        self.record(before);
        self.registry.rebuild(&self.surface.tree);
        let id = self
            .registry
            .object_for_element(&self.surface.tree, container)
            .ok_or(InteractionError::StaleObject)?;
        self.surface.request_focus();
        self.flush();
        self.notify(format!("{what} inserted successfully"), Severity::Success);
        Ok(id)
    }

    pub fn insert_image(&mut self, file: Option<ImageFile>) -> Result<ObjectId, EditorError> {
        let Some(file) = file else {
            log::debug!("image insertion cancelled");
            return Err(EditorError::InvalidFile("no file selected".to_string()));
        };
        if !file.mime.starts_with("image/") {
            self.notify("Please select an image file", Severity::Error);
            return Err(EditorError::InvalidFile(file.mime));
        }
        let before = self.surface.snapshot();
        let (parent, position) = self.insertion_point();
        let (_, container) = build_image(
            &mut self.surface.tree,
            parent,
            position,
            &file.data_url,
            &file.name,
        );
        self.finish_insert(before, container, "Image")
    }

    pub fn insert_line(&mut self, orientation: Orientation) -> Result<ObjectId, EditorError> {
        let before = self.surface.snapshot();
        let (parent, position) = self.insertion_point();
        let (_, container) = build_line(
            &mut self.surface.tree,
            parent,
            position,
            orientation,
            "#000000",
        );
        self.finish_insert(before, container, "Line")
    }

    pub fn insert_table(
        &mut self,
        rows: usize,
        columns: usize,
        border_style: BorderStyle,
    ) -> Result<ObjectId, EditorError> {
        let before = self.surface.snapshot();
        let (parent, position) = self.insertion_point();
        let (_, table) = table::build_table(
            &mut self.surface.tree,
            parent,
            position,
            rows.max(1),
            columns.max(1),
            border_style.name(),
            1.0,
        );
        self.finish_insert(before, table, "Table")
    }

    /// Select an object by id.
    pub fn select(&mut self, id: ObjectId) -> bool {
        self.clear_cells();
        self.registry.select(id, &mut self.surface.tree)
    }

    /// Drop the object selection and any selected table cell. Returns
    /// whether anything was selected.
    pub fn deselect(&mut self) -> bool {
        let had_object = self.registry.selected().is_some();
        self.registry.deselect(&mut self.surface.tree);
        let had_cell = self.selected_cell().is_some();
        self.clear_cells();
        had_object || had_cell
    }

    fn clear_cells(&mut self) {
        for t in self.surface.tree.find_by_tag("table") {
            table::clear_cell_selection(&mut self.surface.tree, t);
        }
    }

    pub fn delete_selected(&mut self) -> Result<(), EditorError> {
        if self.manipulator.is_active() {
            return Err(InteractionError::Busy {
                active: self.manipulator.mode().name(),
            }
            .into());
        }
        let id = self.registry.selected().ok_or(EditorError::NoSelection)?;
        self.delete_object(id)
    }

    fn delete_object(&mut self, id: ObjectId) -> Result<(), EditorError> {
        let before = self.surface.snapshot();
        if !self.registry.remove(id, &mut self.surface.tree) {
            return Err(InteractionError::StaleObject.into());
        }
        self.record(before);
        self.flush();
        Ok(())
    }

    // ─── Tables ──────────────────────────────────────────────────────────

    /// The first selected cell on the surface, with its table.
    fn selected_cell(&self) -> Option<(NodeIndex, NodeIndex)> {
        let tree = &self.surface.tree;
        tree.find_by_tag("table")
            .into_iter()
            .find_map(|t| table::selected_cell(tree, t).map(|c| (t, c)))
    }

    /// Select the table cell with element uid `cell`.
    pub fn select_cell(&mut self, cell: ElementId) -> bool {
        let Some(idx) = self.surface.tree.find_by_uid(cell) else {
            return false;
        };
        self.focus_cell(idx)
    }

    /// A selected cell is the only selection: the table object is not.
    fn focus_cell(&mut self, cell: NodeIndex) -> bool {
        if !table::is_cell(&self.surface.tree, cell) {
            return false;
        }
        self.registry.deselect(&mut self.surface.tree);
        self.clear_cells();
        table::select_cell(&mut self.surface.tree, cell)
    }

    fn edit_table(
        &mut self,
        edit: impl FnOnce(&mut MarkupTree, NodeIndex) -> Result<(), EditorError>,
    ) -> Result<(), EditorError> {
        let Some((table, _)) = self.selected_cell() else {
            self.notify("Please select a cell first", Severity::Warning);
            return Err(EditorError::NoCellSelected);
        };
        let before = self.surface.snapshot();
        match edit(&mut self.surface.tree, table) {
            Ok(()) => {
                self.record(before);
                self.registry.rebuild(&self.surface.tree);
                self.flush();
                Ok(())
            }
            Err(err) => {
                match err {
                    EditorError::LastRow => {
                        self.notify("Cannot delete the last row", Severity::Warning)
                    }
                    EditorError::LastColumn => {
                        self.notify("Cannot delete the last column", Severity::Warning)
                    }
                    _ => {}
                }
                Err(err)
            }
        }
    }

    pub fn add_row(&mut self, position: RowPosition) -> Result<(), EditorError> {
        self.edit_table(|tree, t| table::add_row(tree, t, position).map(|_| ()))
    }

    pub fn add_column(&mut self, position: ColumnPosition) -> Result<(), EditorError> {
        self.edit_table(|tree, t| table::add_column(tree, t, position))
    }

    pub fn delete_row(&mut self) -> Result<(), EditorError> {
        self.edit_table(table::delete_row)
    }

    pub fn delete_column(&mut self) -> Result<(), EditorError> {
        self.edit_table(table::delete_column)
    }

    /// Empty the selected cell.
    pub fn clear_cell(&mut self) -> Result<(), EditorError> {
        let Some((_, cell)) = self.selected_cell() else {
            return Err(EditorError::NoCellSelected);
        };
        let before = self.surface.snapshot();
        table::clear_cell(&mut self.surface.tree, cell);
        self.record(before);
        self.flush();
        Ok(())
    }

    /// Delete the table holding the selected cell, or the selected table.
    pub fn delete_table(&mut self) -> Result<(), EditorError> {
        let from_cell = self
            .selected_cell()
            .and_then(|(t, _)| self.registry.object_for_element(&self.surface.tree, t));
        let from_selection = self.selected().and_then(|o| match o.kind {
            ObjectKind::Table { .. } => Some(o.id),
            _ => None,
        });
        let Some(id) = from_cell.or(from_selection) else {
            self.notify("Please select a cell first", Severity::Warning);
            return Err(EditorError::NoCellSelected);
        };
        self.delete_object(id)
    }

    // ─── Border ──────────────────────────────────────────────────────────

    pub fn set_border(&mut self, border: BorderSettings) {
        if *self.surface.border() == border {
            return;
        }
        let before = self.surface.snapshot();
        self.record(before);
        self.surface.set_border(border);
        self.flush();
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    /// Show page `index`. The content loads on the next `after_render`.
    pub fn switch_to(&mut self, index: usize) -> Result<(), EditorError> {
        if index >= self.pages.len() {
            return Err(EditorError::InvalidPage {
                index,
                len: self.pages.len(),
            });
        }
        self.finish_interaction();
        self.flush();
        self.pages.set_current(index)?;
        self.queue.schedule(index, DeferredAction::LoadPage);
        log::debug!("switching to page {index}");
        Ok(())
    }

    /// Append a blank page and switch to it.
    pub fn add_page(&mut self) -> Result<usize, EditorError> {
        self.flush();
        let now = self.now();
        let index = self.pages.push_blank(now);
        self.switch_to(index)?;
        Ok(index)
    }

    pub fn remove_page(&mut self, index: usize) -> Result<Page, EditorError> {
        if self.pages.len() <= 1 {
            self.notify("Cannot remove the only page", Severity::Warning);
            return Err(EditorError::LastPage);
        }
        self.finish_interaction();
        self.flush();
        let (removed, outcome) = self.pages.remove(index)?;
        self.histories.forget(removed.id);
        // A pending load is tagged with an index that may have shifted.
        if outcome == Removal::Replaced || self.queue.is_pending() {
            self.queue
                .schedule(self.pages.current_index(), DeferredAction::LoadPage);
        }
        log::debug!("removed page {index} ({})", removed.id);
        Ok(removed)
    }

    /// The host rendered. Runs deferred work still aimed at the current
    /// page. Returns whether a page was loaded.
    pub fn after_render(&mut self) -> bool {
        let actions = self.queue.drain_for(self.pages.current_index());
        let mut loaded = false;
        for action in actions {
            match action {
                DeferredAction::LoadPage => {
                    self.load_current();
                    loaded = true;
                }
            }
        }
        loaded
    }

    fn load_current(&mut self) {
        let page = self.pages.current().clone();
        if let Err(err) = self.surface.load(&page.content, page.border.clone()) {
            log::error!("page {} could not be loaded: {err}", page.id);
            self.notify(format!("Could not load page: {err}"), Severity::Error);
            self.surface.tree = MarkupTree::new();
            self.surface.set_border(page.border);
        }
        self.surface.set_editable(true);
        self.surface.request_focus();
        self.registry.reset_and_rebuild(&self.surface.tree);
        log::debug!(
            "page {} loaded with {} object(s)",
            self.pages.current_index(),
            self.registry.len()
        );
    }
}

/// Current size of a table cell, falling back to an even share of the
/// table's box when the cell has no explicit size.
fn cell_size(tree: &MarkupTree, cell: NodeIndex, table: &EditorObject) -> Size {
    let (rows, columns) = match table.kind {
        ObjectKind::Table { rows, columns, .. } => (rows.max(1), columns.max(1)),
        _ => (1, 1),
    };
    let px = |prop: &str| {
        tree.element(cell)
            .and_then(|el| el.style(prop))
            .as_deref()
            .and_then(parse_px)
    };
    Size::new(
        px("width").unwrap_or(table.geometry.width / columns as f64),
        px("height").unwrap_or(table.geometry.height / rows as f64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        executed: Vec<(String, Option<String>)>,
    }

    impl RichText for Recorder {
        fn execute(&mut self, command: &str, value: Option<&str>) -> bool {
            self.executed
                .push((command.to_string(), value.map(str::to_string)));
            true
        }
        fn query_state(&self, command: &str) -> bool {
            command == "italic"
        }
    }

    fn config() -> EditorConfig {
        EditorConfig {
            clock: || 1_000,
            ..EditorConfig::default()
        }
    }

    fn editor() -> Editor<Recorder> {
        let mut e = Editor::new(Recorder::default(), config());
        e.install();
        e
    }

    #[test]
    fn starts_with_one_blank_page() {
        let e = editor();
        assert_eq!(e.page_count(), 1);
        assert_eq!(e.content(), "<p>Start typing here...</p>");
        assert!(e.is_editable());
    }

    #[test]
    fn format_command_is_delegated_and_snapshotted() {
        let mut e = editor();
        assert!(e.apply_format(FormatCommand::ForeColor("#ff0000".into())));
        assert_eq!(
            e.rich_text().executed,
            vec![("foreColor".to_string(), Some("#ff0000".to_string()))]
        );
        assert!(e.can_undo());
        assert_eq!(
            e.notices().latest().map(|n| n.message.as_str()),
            Some("foreColor formatting applied")
        );
    }

    #[test]
    fn selection_outside_surface_keeps_state() {
        let mut e = editor();
        let before = e.format_state().clone();
        e.selection_changed(CaretContext::default());
        assert_eq!(e.format_state(), &before);
        e.selection_changed(CaretContext {
            in_surface: true,
            ..Default::default()
        });
        assert!(e.format_state().italic);
    }

    #[test]
    fn shortcuts_route_to_actions() {
        let mut e = editor();
        assert_eq!(e.key_down("b", Modifiers::CTRL), Some(ShortcutAction::Bold));
        assert_eq!(e.rich_text().executed[0].0, "bold");
        assert_eq!(e.key_down("p", Modifiers::CTRL), Some(ShortcutAction::Print));
        // Nothing selected: Delete falls through to the host.
        assert_eq!(e.key_down("Delete", Modifiers::NONE), None);
    }

    #[test]
    fn invalid_image_type_is_refused() {
        let mut e = editor();
        let file = ImageFile {
            name: "notes.txt".into(),
            mime: "text/plain".into(),
            data_url: "data:text/plain;base64,AAAA".into(),
        };
        assert!(matches!(e.insert_image(Some(file)), Err(EditorError::InvalidFile(_))));
        assert_eq!(
            e.notices().latest().map(|n| n.severity),
            Some(Severity::Error)
        );
        assert!(!e.can_undo());
        assert!(e.registry().is_empty());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut e = editor();
        assert_eq!(e.set_zoom(500.0), 200.0);
        assert_eq!(e.adjust_zoom(-1000.0), 10.0);
    }
}
