//! The live editable surface and the builders for object blocks.
//!
//! The surface holds the displayed page as a `MarkupTree`. The host renders
//! `live_markup()` and reports its own edits back as markup carrying the same
//! `data-folio-uid` tags. What goes into pages and history is `content()`,
//! the clean form without uids or selection/interaction classes.

use crate::history::Snapshot;
use folio_core::geometry::Orientation;
use folio_core::markup::{format_num, format_px};
use folio_core::model::{DEFAULT_IMAGE_SIZE, DEFAULT_LINE_LENGTH, DEFAULT_LINE_THICKNESS, class};
use folio_core::{
    BorderSettings, Element, ElementId, Handle, MarkupNode, MarkupTree, NodeIndex, ParseError,
    emit_fragment_without, emit_live, parse_fragment,
};

#[derive(Debug, Clone)]
pub struct Surface {
    pub tree: MarkupTree,
    border: BorderSettings,
    editable: bool,
    focus_requested: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        Self {
            tree: MarkupTree::new(),
            border: BorderSettings::default(),
            editable: true,
            focus_requested: false,
        }
    }

    /// Replace the whole surface with `markup` and `border`.
    pub fn load(&mut self, markup: &str, border: BorderSettings) -> Result<(), ParseError> {
        self.tree = parse_fragment(markup)?;
        self.border = border;
        Ok(())
    }

    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), ParseError> {
        self.load(&snapshot.markup, snapshot.border.clone())
    }

    /// Stored form of the surface.
    pub fn content(&self) -> String {
        emit_fragment_without(&self.tree, class::TRANSIENT)
    }

    /// Markup for the host to render, every element tagged with its uid.
    pub fn live_markup(&self) -> String {
        emit_live(&self.tree)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            markup: self.content(),
            border: self.border.clone(),
        }
    }

    pub fn border(&self) -> &BorderSettings {
        &self.border
    }

    pub fn set_border(&mut self, border: BorderSettings) {
        self.border = border;
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn request_focus(&mut self) {
        self.focus_requested = true;
    }

    /// Whether focus was requested since the last call.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Where a new block goes: right after the top-level block holding the
    /// caret, or at the end when the caret is elsewhere.
    pub fn insertion_point(&self, caret: Option<ElementId>) -> (NodeIndex, usize) {
        let root = self.tree.root;
        let end = self.tree.children(root).len();
        let Some(anchor) = caret.and_then(|uid| self.tree.find_by_uid(uid)) else {
            return (root, end);
        };
        let block = self
            .tree
            .closest(anchor, |t, n| t.parent(n) == Some(root));
        match block.and_then(|b| self.tree.position_in_parent(b)) {
            Some(pos) => (root, pos + 1),
            None => (root, end),
        }
    }
}

/// Build `p.image-paragraph > div.img-container` holding the image, eight
/// resize handles and a rotate handle. Returns `(paragraph, container)`.
pub fn build_image(
    tree: &mut MarkupTree,
    parent: NodeIndex,
    position: usize,
    src: &str,
    alt: &str,
) -> (NodeIndex, NodeIndex) {
    let p = tree.insert(
        parent,
        position,
        MarkupNode::element(Element::new("p").with_attr("class", class::IMAGE_PARAGRAPH)),
    );
    let mut container = Element::new("div")
        .with_attr("class", class::IMG_CONTAINER)
        .with_attr("contenteditable", "false")
        .with_attr("data-rotation", "0");
    container.set_style("width", &format_px(DEFAULT_IMAGE_SIZE.width));
    container.set_style("height", &format_px(DEFAULT_IMAGE_SIZE.height));
    let container = tree.append(p, MarkupNode::element(container));

    let mut img = Element::new("img")
        .with_attr("class", class::EDITOR_IMAGE)
        .with_attr("src", src)
        .with_attr("alt", alt);
    img.set_style("width", "100%");
    img.set_style("height", "100%");
    tree.append(container, MarkupNode::element(img));

    for handle in Handle::ALL {
        tree.append(
            container,
            MarkupNode::element(
                Element::new("div")
                    .with_attr("class", format!("{} resize-{}", class::RESIZE_HANDLE, handle.name()))
                    .with_attr("data-handle", handle.name()),
            ),
        );
    }
    tree.append(
        container,
        MarkupNode::element(Element::new("div").with_attr("class", class::ROTATE_HANDLE)),
    );
    (p, container)
}

/// Build `p.line-paragraph > div.line-container > div.line-element`.
/// Returns `(paragraph, container)`.
pub fn build_line(
    tree: &mut MarkupTree,
    parent: NodeIndex,
    position: usize,
    orientation: Orientation,
    color: &str,
) -> (NodeIndex, NodeIndex) {
    let p = tree.insert(
        parent,
        position,
        MarkupNode::element(Element::new("p").with_attr("class", class::LINE_PARAGRAPH)),
    );
    let thickness = DEFAULT_LINE_THICKNESS;
    let (width, height) = match orientation {
        Orientation::Horizontal => (DEFAULT_LINE_LENGTH, thickness),
        Orientation::Vertical => (thickness, DEFAULT_LINE_LENGTH),
    };
    let mut container = Element::new("div")
        .with_attr("class", class::LINE_CONTAINER)
        .with_attr("contenteditable", "false")
        .with_attr("data-orientation", orientation.name())
        .with_attr("data-thickness", format_num(thickness))
        .with_attr("data-color", color)
        .with_attr("data-rotation", "0");
    container.set_style("width", &format_px(width));
    container.set_style("height", &format_px(height));
    let container = tree.append(p, MarkupNode::element(container));

    let mut line = Element::new("div").with_attr("class", class::LINE_ELEMENT);
    line.set_style("width", "100%");
    line.set_style("height", "100%");
    line.set_style("background-color", color);
    tree.append(container, MarkupNode::element(line));

    for handle in orientation_handles(orientation) {
        tree.append(
            container,
            MarkupNode::element(
                Element::new("div")
                    .with_attr("class", class::RESIZE_HANDLE)
                    .with_attr("data-handle", handle.name()),
            ),
        );
    }
    (p, container)
}

fn orientation_handles(orientation: Orientation) -> [Handle; 2] {
    match orientation {
        Orientation::Horizontal => [Handle::W, Handle::E],
        Orientation::Vertical => [Handle::N, Handle::S],
    }
}
