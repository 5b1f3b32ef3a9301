//! Hit testing: which object, and which part of it, is under the pointer.
//!
//! Two routes. When the host reports the element under the pointer, the
//! element's classes decide (`resize-handle`, `rotate-handle`,
//! `table-resize-handle`, or the object body). Otherwise the document-space
//! point is tested geometrically, handles of the selected object first.

use crate::registry::ObjectRegistry;
use crate::table;
use folio_core::model::class;
use folio_core::{CellEdge, Geometry, Handle, MarkupTree, NodeIndex, ObjectId, ObjectKind, Point};

/// Distance within which a handle is grabbed, in document pixels.
pub const HANDLE_RADIUS: f64 = 6.0;

/// Distance of the rotate handle above the object's top edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(Handle),
    Rotate,
    /// Edge of a single table cell.
    CellEdge { cell: NodeIndex, edge: CellEdge },
    /// Inside a table cell (selects the cell, starts nothing).
    Cell(NodeIndex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub object: ObjectId,
    pub part: HitPart,
}

/// Classify the element the pointer went down on.
pub fn hit_element(registry: &ObjectRegistry, tree: &MarkupTree, target: NodeIndex) -> Option<Hit> {
    let object = registry.object_for_element(tree, target)?;
    let part = if tree.has_class(target, class::RESIZE_HANDLE) {
        HitPart::Handle(
            tree.attr(target, "data-handle")
                .and_then(Handle::from_name)
                .unwrap_or(Handle::SE),
        )
    } else if tree
        .closest(target, |t, n| t.has_class(n, class::ROTATE_HANDLE))
        .is_some()
    {
        HitPart::Rotate
    } else if tree.has_class(target, class::CELL_RESIZE_HANDLE) {
        let cell = tree.closest(target, table::is_cell)?;
        let edge = match tree.attr(target, "data-edge") {
            Some("bottom") => CellEdge::Bottom,
            _ => CellEdge::Right,
        };
        HitPart::CellEdge { cell, edge }
    } else if let Some(cell) = tree.closest(target, table::is_cell) {
        HitPart::Cell(cell)
    } else {
        HitPart::Body
    };
    Some(Hit { object, part })
}

/// Geometric hit test at a document-space point.
pub fn hit_point(registry: &ObjectRegistry, point: Point) -> Option<Hit> {
    if let Some(sel) = registry.selected().and_then(|id| registry.get(id)) {
        if !matches!(sel.kind, ObjectKind::Table { .. })
            && point.distance(rotate_anchor(&sel.geometry)) <= HANDLE_RADIUS
        {
            return Some(Hit {
                object: sel.id,
                part: HitPart::Rotate,
            });
        }
        if let Some(handle) = Handle::ALL
            .into_iter()
            .find(|h| point.distance(h.anchor(&sel.geometry)) <= HANDLE_RADIUS)
        {
            return Some(Hit {
                object: sel.id,
                part: HitPart::Handle(handle),
            });
        }
    }
    registry
        .topmost_first()
        .into_iter()
        .find(|o| o.geometry.contains(point))
        .map(|o| Hit {
            object: o.id,
            part: HitPart::Body,
        })
}

pub fn rotate_anchor(g: &Geometry) -> Point {
    Point::new(g.x + g.width / 2.0, g.y - ROTATE_HANDLE_OFFSET)
}
