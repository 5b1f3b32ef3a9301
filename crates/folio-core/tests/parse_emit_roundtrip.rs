//! Integration tests: HTML fragment → MarkupTree → HTML fragment.
//!
//! Page content is stored as flat HTML, so every load/save cycle goes
//! through this pair and must not lose object markup.

use folio_core::geometry::Orientation;
use folio_core::model::{DEFAULT_IMAGE_SIZE, class, read_geometry};
use folio_core::{emit_fragment, emit_live, parse_fragment};
use pretty_assertions::assert_eq;

const PAGE: &str = include_str!("fixtures/page_objects.html");

#[test]
fn page_with_objects_roundtrips_exactly() {
    let tree = parse_fragment(PAGE).unwrap();
    assert_eq!(emit_fragment(&tree), PAGE);
}

#[test]
fn live_roundtrip_keeps_identities() {
    let tree = parse_fragment(PAGE).unwrap();
    let live = emit_live(&tree);
    let back = parse_fragment(&live).unwrap();

    let before = tree.find_by_class(class::IMG_CONTAINER);
    let after = back.find_by_class(class::IMG_CONTAINER);
    assert_eq!(before.len(), 1);
    assert_eq!(tree.graph[before[0]].uid, back.graph[after[0]].uid);
    assert_eq!(emit_fragment(&back), PAGE);
}

#[test]
fn object_data_attributes_survive() {
    let tree = parse_fragment(PAGE).unwrap();

    let line = tree.find_by_class(class::LINE_CONTAINER)[0];
    assert_eq!(
        tree.attr(line, "data-orientation").and_then(Orientation::from_name),
        Some(Orientation::Horizontal)
    );
    assert_eq!(tree.attr(line, "data-thickness"), Some("2"));
    assert_eq!(tree.attr(line, "data-color"), Some("#333333"));

    let table = tree.find_by_tag("table")[0];
    assert_eq!(tree.attr(table, "data-border-style"), Some("dashed"));
    assert_eq!(tree.attr(table, "data-border-width"), Some("1"));

    let image = tree.find_by_class(class::IMG_CONTAINER)[0];
    let g = read_geometry(tree.element(image).unwrap(), DEFAULT_IMAGE_SIZE);
    assert_eq!((g.x, g.y, g.width, g.height, g.rotation), (40.0, 120.0, 300.0, 200.0, 15.0));
}

#[test]
fn reparsing_is_stable() {
    let once = emit_fragment(&parse_fragment(PAGE).unwrap());
    let twice = emit_fragment(&parse_fragment(&once).unwrap());
    assert_eq!(once, twice);
}
