//! Geometry and transform utilities for object manipulation.
//!
//! Pure functions over `kurbo` points/vectors. Every resize rule pins the
//! edges a handle does not control, including when a minimum size clamps
//! the result.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Object placement in unzoomed document pixels. `rotation` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Axis-aligned containment (rotation ignored).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// A resize handle on an object's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::N,
        Handle::S,
        Handle::E,
        Handle::W,
        Handle::NE,
        Handle::NW,
        Handle::SE,
        Handle::SW,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "n" => Handle::N,
            "s" => Handle::S,
            "e" => Handle::E,
            "w" => Handle::W,
            "ne" => Handle::NE,
            "nw" => Handle::NW,
            "se" => Handle::SE,
            "sw" => Handle::SW,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::S => "s",
            Handle::E => "e",
            Handle::W => "w",
            Handle::NE => "ne",
            Handle::NW => "nw",
            Handle::SE => "se",
            Handle::SW => "sw",
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    /// Handle position on a box, in the box's coordinate space.
    pub fn anchor(self, g: &Geometry) -> Point {
        let x = if self.moves_left() {
            g.x
        } else if self.moves_right() {
            g.right()
        } else {
            g.x + g.width / 2.0
        };
        let y = if self.moves_top() {
            g.y
        } else if self.moves_bottom() {
            g.bottom()
        } else {
            g.y + g.height / 2.0
        };
        Point::new(x, y)
    }
}

/// Which edge of a table cell is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellEdge {
    Right,
    Bottom,
}

/// Line orientation. A line's cross-axis extent is always its thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "horizontal" => Some(Orientation::Horizontal),
            "vertical" => Some(Orientation::Vertical),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

// ─── Zoom ────────────────────────────────────────────────────────────────

pub const MIN_ZOOM_PERCENT: f64 = 10.0;
pub const MAX_ZOOM_PERCENT: f64 = 200.0;

pub fn clamp_zoom(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT)
    } else {
        100.0
    }
}

/// Scale factor for a zoom percentage (100% → 1.0).
pub fn zoom_factor(percent: f64) -> f64 {
    clamp_zoom(percent) / 100.0
}

/// Pointer movement converted to document space.
pub fn scaled_delta(start: Point, current: Point, zoom: f64) -> Vec2 {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    (current - start) / zoom
}

// ─── Transforms ──────────────────────────────────────────────────────────

pub fn translate(start: Geometry, delta: Vec2) -> Geometry {
    Geometry {
        x: start.x + delta.x,
        y: start.y + delta.y,
        ..start
    }
}

/// Resize a box by dragging `handle` by `delta`.
///
/// Edges the handle does not control stay where they were. With
/// `lock_aspect`, the dominant axis of the drag drives the other one.
pub fn resize_box(start: Geometry, handle: Handle, delta: Vec2, min: Size, lock_aspect: bool) -> Geometry {
    let mut width = start.width;
    let mut height = start.height;

    if handle.moves_right() {
        width = start.width + delta.x;
    } else if handle.moves_left() {
        width = start.width - delta.x;
    }
    if handle.moves_bottom() {
        height = start.height + delta.y;
    } else if handle.moves_top() {
        height = start.height - delta.y;
    }

    if lock_aspect && start.width > 0.0 && start.height > 0.0 {
        let aspect = start.width / start.height;
        let horizontal = handle.moves_left() || handle.moves_right();
        let vertical = handle.moves_top() || handle.moves_bottom();
        if horizontal && (!vertical || delta.x.abs() > delta.y.abs()) {
            height = width / aspect;
        } else {
            width = height * aspect;
        }
        let w = width.max(f64::EPSILON);
        let h = height.max(f64::EPSILON);
        let grow = (min.width / w).max(min.height / h);
        if grow > 1.0 {
            width = w * grow;
            height = h * grow;
        }
    } else {
        width = width.max(min.width);
        height = height.max(min.height);
    }

    pin(start, handle, width, height)
}

/// Resize a line along its own axis only.
pub fn resize_line(
    start: Geometry,
    orientation: Orientation,
    thickness: f64,
    handle: Handle,
    delta: Vec2,
    min_length: f64,
) -> Geometry {
    match orientation {
        Orientation::Horizontal => {
            let mut width = start.width;
            if handle.moves_right() {
                width = start.width + delta.x;
            } else if handle.moves_left() {
                width = start.width - delta.x;
            }
            let width = width.max(min_length);
            let x = if handle.moves_left() {
                start.right() - width
            } else {
                start.x
            };
            Geometry {
                x,
                y: start.y,
                width,
                height: thickness,
                rotation: start.rotation,
            }
        }
        Orientation::Vertical => {
            let mut height = start.height;
            if handle.moves_bottom() {
                height = start.height + delta.y;
            } else if handle.moves_top() {
                height = start.height - delta.y;
            }
            let height = height.max(min_length);
            let y = if handle.moves_top() {
                start.bottom() - height
            } else {
                start.y
            };
            Geometry {
                x: start.x,
                y,
                width: thickness,
                height,
                rotation: start.rotation,
            }
        }
    }
}

/// Place a box of the given size so the edges `handle` does not move stay put.
fn pin(start: Geometry, handle: Handle, width: f64, height: f64) -> Geometry {
    let x = if handle.moves_left() {
        start.right() - width
    } else {
        start.x
    };
    let y = if handle.moves_top() {
        start.bottom() - height
    } else {
        start.y
    };
    Geometry {
        x,
        y,
        width,
        height,
        rotation: start.rotation,
    }
}

/// Angle of `pointer` around `center`, in degrees (`atan2`, y down).
pub fn angle_deg(center: Point, pointer: Point) -> f64 {
    let d = pointer - center;
    d.y.atan2(d.x).to_degrees()
}

/// Normalize any angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negatives
    if r >= 360.0 { 0.0 } else { r }
}

/// Rotation after the pointer swept from `start_angle` to `current_angle`.
pub fn rotate(start_rotation: f64, start_angle: f64, current_angle: f64, snap_step: Option<f64>) -> f64 {
    let mut r = start_rotation + (current_angle - start_angle);
    if let Some(step) = snap_step.filter(|s| *s > 0.0) {
        r = (r / step).round() * step;
    }
    normalize_degrees(r)
}

/// Resize a single table cell from one of its edges.
pub fn resize_cell(start: Size, edge: CellEdge, delta: Vec2, min: Size) -> Size {
    match edge {
        CellEdge::Right => Size::new((start.width + delta.x).max(min.width), start.height),
        CellEdge::Bottom => Size::new(start.width, (start.height + delta.y).max(min.height)),
    }
}
