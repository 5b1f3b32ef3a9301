pub mod emitter;
pub mod geometry;
pub mod id;
pub mod lang;
pub mod markup;
pub mod model;
pub mod parser;

pub use emitter::{emit_fragment, emit_fragment_without, emit_inner, emit_live, emit_outer};
pub use geometry::{CellEdge, Geometry, Handle, Orientation};
pub use id::{Atom, ElementId, ObjectId, PageId};
pub use lang::Language;
pub use markup::{Element, ElementRef, MarkupKind, MarkupNode, MarkupTree};
pub use model::*;
pub use parser::{ParseError, UID_ATTR, parse_fragment};

// Re-export so downstream crates don't need direct dependencies
pub use kurbo::{Point, Size, Vec2};
pub use petgraph::graph::NodeIndex;
