//! Manipulation state machine: drag, resize, rotate and table-cell resize.
//!
//! Exactly one interaction can be active. `begin` captures everything the
//! interaction needs from its start (pointer, geometry, angle) and rejects
//! a second start while one is running. `update` is a pure function of that
//! start state and the current pointer, so repeated pointer-moves only ever
//! yield the latest geometry.

use crate::error::InteractionError;
use folio_core::geometry::{
    angle_deg, resize_box, resize_cell, resize_line, rotate, scaled_delta, translate,
};
use folio_core::model::{MIN_CELL_SIZE, MIN_IMAGE_SIZE, MIN_LINE_LENGTH, MIN_TABLE_SIZE, class};
use folio_core::{
    CellEdge, EditorObject, ElementRef, Geometry, Handle, ObjectId, ObjectKind, Point, Size,
};

/// Rotation snap step while Shift is held.
pub const ROTATION_SNAP_DEG: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    Resizing {
        handle: Handle,
    },
    Rotating,
    CellResizing {
        edge: CellEdge,
    },
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "idle",
            InteractionMode::Dragging => "dragging",
            InteractionMode::Resizing { .. } => "resizing",
            InteractionMode::Rotating => "rotating",
            InteractionMode::CellResizing { .. } => "cell-resizing",
        }
    }

    /// Class put on the manipulated element for the duration.
    pub fn styling_class(&self) -> Option<&'static str> {
        match self {
            InteractionMode::Idle => None,
            InteractionMode::Dragging => Some(class::DRAGGING),
            InteractionMode::Resizing { .. } | InteractionMode::CellResizing { .. } => {
                Some(class::RESIZING)
            }
            InteractionMode::Rotating => Some(class::ROTATING),
        }
    }
}

/// How an interaction should start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Start {
    Drag,
    Resize(Handle),
    Rotate,
    CellResize {
        cell: ElementRef,
        edge: CellEdge,
        size: Size,
    },
}

/// Start state of the active interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub object: ObjectId,
    pub mode: InteractionMode,
    pub kind: ObjectKind,
    /// Surface-relative screen position at pointer-down.
    pub start_pointer: Point,
    pub start_geometry: Geometry,
    /// Pointer angle around the object center at pointer-down, in degrees.
    pub start_angle: f64,
    pub cell: Option<(ElementRef, Size)>,
}

/// Result of a pointer-move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update {
    Geometry(Geometry),
    Cell { cell: ElementRef, size: Size },
}

#[derive(Debug, Clone, Default)]
pub struct Manipulator {
    active: Option<Interaction>,
}

impl Manipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.active
            .as_ref()
            .map_or(InteractionMode::Idle, |i| i.mode)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Interaction> {
        self.active.as_ref()
    }

    /// Enter a non-idle mode on `object`.
    pub fn begin(
        &mut self,
        object: &EditorObject,
        start: Start,
        pointer: Point,
        zoom: f64,
    ) -> Result<InteractionMode, InteractionError> {
        if let Some(active) = &self.active {
            return Err(InteractionError::Busy {
                active: active.mode.name(),
            });
        }
        let is_table = matches!(object.kind, ObjectKind::Table { .. });
        let (mode, cell) = match start {
            Start::Drag => (InteractionMode::Dragging, None),
            Start::Resize(handle) => (InteractionMode::Resizing { handle }, None),
            Start::Rotate if is_table => return Err(InteractionError::Unsupported),
            Start::Rotate => (InteractionMode::Rotating, None),
            Start::CellResize { .. } if !is_table => return Err(InteractionError::Unsupported),
            Start::CellResize { cell, edge, size } => {
                (InteractionMode::CellResizing { edge }, Some((cell, size)))
            }
        };
        let start_angle = angle_deg(object.geometry.center(), to_document(pointer, zoom));
        log::debug!("{} begins {}", object.id, mode.name());
        self.active = Some(Interaction {
            object: object.id,
            mode,
            kind: object.kind.clone(),
            start_pointer: pointer,
            start_geometry: object.geometry,
            start_angle,
            cell,
        });
        Ok(mode)
    }

    /// Geometry for the current pointer position. `None` while idle.
    pub fn update(&self, pointer: Point, shift: bool, zoom: f64) -> Option<Update> {
        let i = self.active.as_ref()?;
        let delta = scaled_delta(i.start_pointer, pointer, zoom);
        log::trace!("{} {} delta=({:.1}, {:.1})", i.object, i.mode.name(), delta.x, delta.y);
        let update = match i.mode {
            InteractionMode::Idle => return None,
            InteractionMode::Dragging => Update::Geometry(translate(i.start_geometry, delta)),
            InteractionMode::Resizing { handle } => Update::Geometry(match &i.kind {
                ObjectKind::Image { .. } => {
                    resize_box(i.start_geometry, handle, delta, MIN_IMAGE_SIZE, shift)
                }
                ObjectKind::Table { .. } => {
                    resize_box(i.start_geometry, handle, delta, MIN_TABLE_SIZE, shift)
                }
                ObjectKind::Line {
                    orientation,
                    thickness,
                    ..
                } => resize_line(
                    i.start_geometry,
                    *orientation,
                    *thickness,
                    handle,
                    delta,
                    MIN_LINE_LENGTH,
                ),
            }),
            InteractionMode::Rotating => {
                let current = angle_deg(i.start_geometry.center(), to_document(pointer, zoom));
                let snap = shift.then_some(ROTATION_SNAP_DEG);
                Update::Geometry(Geometry {
                    rotation: rotate(i.start_geometry.rotation, i.start_angle, current, snap),
                    ..i.start_geometry
                })
            }
            InteractionMode::CellResizing { edge } => {
                let (cell, size) = i.cell?;
                Update::Cell {
                    cell,
                    size: resize_cell(size, edge, delta, MIN_CELL_SIZE),
                }
            }
        };
        Some(update)
    }

    /// Leave the active mode, returning its start state.
    pub fn finish(&mut self) -> Option<Interaction> {
        let done = self.active.take()?;
        log::debug!("{} ends {}", done.object, done.mode.name());
        Some(done)
    }
}

fn to_document(pointer: Point, zoom: f64) -> Point {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    Point::new(pointer.x / zoom, pointer.y / zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::geometry::Orientation;
    use folio_core::{ElementId, NodeIndex};

    fn object(kind: ObjectKind, geometry: Geometry) -> EditorObject {
        EditorObject {
            id: ObjectId::from_raw(1),
            kind,
            geometry,
            z_order: 1,
            element: ElementRef {
                index: NodeIndex::new(1),
                uid: ElementId::fresh(),
            },
        }
    }

    fn image(geometry: Geometry) -> EditorObject {
        object(ObjectKind::Image { src: "a.png".into() }, geometry)
    }

    fn geometry_of(update: Option<Update>) -> Geometry {
        match update {
            Some(Update::Geometry(g)) => g,
            other => panic!("expected geometry, got {other:?}"),
        }
    }

    #[test]
    fn second_start_is_rejected() {
        let mut m = Manipulator::new();
        let obj = image(Geometry::new(0.0, 0.0, 100.0, 100.0));
        m.begin(&obj, Start::Drag, Point::ZERO, 1.0).unwrap();
        assert_eq!(
            m.begin(&obj, Start::Rotate, Point::ZERO, 1.0),
            Err(InteractionError::Busy { active: "dragging" })
        );
        assert_eq!(m.mode(), InteractionMode::Dragging);
        m.finish();
        assert_eq!(m.mode(), InteractionMode::Idle);
    }

    #[test]
    fn drag_divides_by_zoom_and_is_idempotent() {
        let mut m = Manipulator::new();
        let obj = image(Geometry::new(10.0, 10.0, 100.0, 100.0));
        m.begin(&obj, Start::Drag, Point::new(100.0, 100.0), 2.0).unwrap();
        let a = geometry_of(m.update(Point::new(140.0, 120.0), false, 2.0));
        let b = geometry_of(m.update(Point::new(140.0, 120.0), false, 2.0));
        assert_eq!(a, b);
        assert_eq!((a.x, a.y), (30.0, 20.0));
    }

    #[test]
    fn image_clamp_pins_opposite_edges_on_every_corner() {
        let start = Geometry::new(100.0, 100.0, 200.0, 150.0);
        for handle in [Handle::NE, Handle::NW, Handle::SE, Handle::SW] {
            let mut m = Manipulator::new();
            m.begin(&image(start), Start::Resize(handle), Point::ZERO, 1.0).unwrap();
            // Drag far past the opposite corner.
            let inward = Point::new(
                if handle.moves_left() { 1000.0 } else { -1000.0 },
                if handle.moves_top() { 1000.0 } else { -1000.0 },
            );
            let g = geometry_of(m.update(inward, false, 1.0));
            assert_eq!((g.width, g.height), (30.0, 30.0), "{handle:?}");
            if handle.moves_left() {
                assert_eq!(g.right(), start.right(), "{handle:?}");
            } else {
                assert_eq!(g.x, start.x, "{handle:?}");
            }
            if handle.moves_top() {
                assert_eq!(g.bottom(), start.bottom(), "{handle:?}");
            } else {
                assert_eq!(g.y, start.y, "{handle:?}");
            }
        }
    }

    #[test]
    fn table_minimum_is_100_by_50() {
        let mut m = Manipulator::new();
        let table = object(
            ObjectKind::Table {
                rows: 2,
                columns: 2,
                border_style: Default::default(),
                border_width: 1.0,
            },
            Geometry::new(0.0, 0.0, 400.0, 72.0),
        );
        m.begin(&table, Start::Resize(Handle::SE), Point::ZERO, 1.0).unwrap();
        let g = geometry_of(m.update(Point::new(-999.0, -999.0), false, 1.0));
        assert_eq!((g.width, g.height), (100.0, 50.0));
    }

    #[test]
    fn lines_keep_thickness_on_every_handle() {
        for (orientation, start) in [
            (Orientation::Horizontal, Geometry::new(0.0, 0.0, 200.0, 2.0)),
            (Orientation::Vertical, Geometry::new(0.0, 0.0, 2.0, 200.0)),
        ] {
            let line = object(
                ObjectKind::Line {
                    orientation,
                    thickness: 2.0,
                    color: "#000000".into(),
                },
                start,
            );
            for handle in Handle::ALL {
                let mut m = Manipulator::new();
                m.begin(&line, Start::Resize(handle), Point::ZERO, 1.0).unwrap();
                for p in [Point::new(50.0, 80.0), Point::new(-500.0, -500.0)] {
                    let g = geometry_of(m.update(p, true, 1.0));
                    match orientation {
                        Orientation::Horizontal => {
                            assert_eq!(g.height, 2.0);
                            assert!(g.width >= MIN_LINE_LENGTH);
                        }
                        Orientation::Vertical => {
                            assert_eq!(g.width, 2.0);
                            assert!(g.height >= MIN_LINE_LENGTH);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn rotation_wraps_past_360() {
        let mut start = Geometry::new(0.0, 0.0, 100.0, 100.0);
        start.rotation = 350.0;
        let mut m = Manipulator::new();
        // Pointer straight right of the center: angle 0.
        m.begin(&image(start), Start::Rotate, Point::new(150.0, 50.0), 1.0).unwrap();
        let radians = 20f64.to_radians();
        let pointer = Point::new(50.0 + 100.0 * radians.cos(), 50.0 + 100.0 * radians.sin());
        let g = geometry_of(m.update(pointer, false, 1.0));
        assert!((g.rotation - 10.0).abs() < 1e-9, "got {}", g.rotation);
    }

    #[test]
    fn tables_do_not_rotate() {
        let mut m = Manipulator::new();
        let table = object(
            ObjectKind::Table {
                rows: 1,
                columns: 1,
                border_style: Default::default(),
                border_width: 1.0,
            },
            Geometry::new(0.0, 0.0, 400.0, 36.0),
        );
        assert_eq!(
            m.begin(&table, Start::Rotate, Point::ZERO, 1.0),
            Err(InteractionError::Unsupported)
        );
        assert!(!m.is_active());
    }

    #[test]
    fn cell_resize_scales_and_clamps() {
        let mut m = Manipulator::new();
        let table = object(
            ObjectKind::Table {
                rows: 1,
                columns: 1,
                border_style: Default::default(),
                border_width: 1.0,
            },
            Geometry::new(0.0, 0.0, 400.0, 36.0),
        );
        let cell = ElementRef {
            index: NodeIndex::new(4),
            uid: ElementId::fresh(),
        };
        m.begin(
            &table,
            Start::CellResize {
                cell,
                edge: CellEdge::Right,
                size: Size::new(100.0, 36.0),
            },
            Point::ZERO,
            0.5,
        )
        .unwrap();
        assert_eq!(
            m.update(Point::new(10.0, 0.0), false, 0.5),
            Some(Update::Cell { cell, size: Size::new(120.0, 36.0) })
        );
        assert_eq!(
            m.update(Point::new(-500.0, 0.0), false, 0.5),
            Some(Update::Cell { cell, size: Size::new(30.0, 36.0) })
        );
    }
}
