//! Object registry: the manipulable objects of the displayed page.
//!
//! The registry owns object identities. Each entry points back into the
//! surface through a weak `ElementRef` that is revalidated on every access;
//! entries whose element is gone are dropped instead of dereferenced.
//!
//! Objects are discovered from markers in the markup:
//!
//! | Marker | Kind |
//! |--------|------|
//! | `div.img-container` | image (`src` from its `img`) |
//! | `div.line-container` | line (`data-orientation`, `data-thickness`, `data-color`) |
//! | `table` | table (`data-border-style`, `data-border-width`) |

use crate::table;
use folio_core::geometry::Orientation;
use folio_core::model::{
    DEFAULT_IMAGE_SIZE, DEFAULT_LINE_LENGTH, DEFAULT_LINE_THICKNESS, DEFAULT_TABLE_ROW_HEIGHT,
    DEFAULT_TABLE_WIDTH, class, read_geometry, write_geometry,
};
use folio_core::{
    BorderStyle, EditorObject, ElementId, Geometry, MarkupTree, NodeIndex, ObjectId, ObjectKind,
    Size,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    /// Entries in discovery order.
    objects: Vec<EditorObject>,
    /// Element uid → object. Rebuilt wholesale on every scan so an element
    /// is never bound twice.
    bindings: HashMap<ElementId, ObjectId>,
    selected: Option<ObjectId>,
    next_id: u64,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bindings: HashMap::new(),
            selected: None,
            next_id: 1,
        }
    }

    /// Re-scan the surface. Known elements keep their object identity;
    /// images whose element was replaced are matched by `src`.
    pub fn rebuild(&mut self, tree: &MarkupTree) {
        let mut previous = std::mem::take(&mut self.objects);
        let mut found: Vec<EditorObject> = Vec::new();
        let mut bindings = HashMap::new();

        for idx in tree.descendants(tree.root) {
            let Some(kind) = classify(tree, idx) else {
                continue;
            };
            let uid = tree.graph[idx].uid;
            let matched = previous
                .iter()
                .position(|o| o.element.uid == uid)
                .or_else(|| match &kind {
                    ObjectKind::Image { src } => previous.iter().position(|o| {
                        matches!(&o.kind, ObjectKind::Image { src: s } if s == src)
                            && tree.resolve(o.element).is_none()
                    }),
                    _ => None,
                });
            let geometry = scan_geometry(tree, idx, &kind);
            let element = tree.element_ref(idx);

            let object = match matched {
                Some(pos) => {
                    let mut object = previous.swap_remove(pos);
                    object.kind = kind;
                    object.geometry = geometry;
                    object.element = element;
                    object
                }
                None => {
                    let id = ObjectId::from_raw(self.next_id);
                    self.next_id += 1;
                    log::trace!("registered {} {id}", kind.name());
                    EditorObject {
                        id,
                        kind,
                        geometry,
                        z_order: found.len() + 1,
                        element,
                    }
                }
            };

            bindings.insert(uid, object.id);
            if let Some(parent) = tree.parent(idx)
                && tree.has_class(parent, class::TABLE_CONTAINER)
            {
                bindings.insert(tree.graph[parent].uid, object.id);
            }
            found.push(object);
        }

        if !previous.is_empty() {
            log::debug!("registry dropped {} stale object(s)", previous.len());
        }
        if let Some(sel) = self.selected
            && !found.iter().any(|o| o.id == sel)
        {
            self.selected = None;
        }
        self.objects = found;
        self.bindings = bindings;
    }

    /// Forget everything, then scan. Every object gets a new identity.
    pub fn reset_and_rebuild(&mut self, tree: &MarkupTree) {
        self.objects.clear();
        self.bindings.clear();
        self.selected = None;
        self.rebuild(tree);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditorObject> {
        self.objects.iter()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    /// Objects from the top of the z-order down.
    pub fn topmost_first(&self) -> Vec<&EditorObject> {
        let mut sorted: Vec<&EditorObject> = self.objects.iter().collect();
        sorted.sort_by(|a, b| b.z_order.cmp(&a.z_order));
        sorted
    }

    pub fn get(&self, id: ObjectId) -> Option<&EditorObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn bindings_len(&self) -> usize {
        self.bindings.len()
    }

    /// Revalidate an object's element, dropping the object if it is stale.
    pub fn resolve(&mut self, id: ObjectId, tree: &MarkupTree) -> Option<NodeIndex> {
        let object = self.get(id)?;
        match tree.resolve(object.element) {
            Some(idx) => Some(idx),
            None => {
                log::debug!("{id} is stale, dropping");
                self.forget(id);
                None
            }
        }
    }

    /// Route an element (or any of its descendants, such as the `img`
    /// inside an image container) to the object bound to it.
    pub fn object_for_element(&self, tree: &MarkupTree, idx: NodeIndex) -> Option<ObjectId> {
        let bound = tree.closest(idx, |t, n| self.bindings.contains_key(&t.graph[n].uid))?;
        self.bindings.get(&tree.graph[bound].uid).copied()
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Select `id`, marking its element. Returns false if it is gone.
    pub fn select(&mut self, id: ObjectId, tree: &mut MarkupTree) -> bool {
        if self.selected == Some(id) && self.resolve(id, tree).is_some() {
            return true;
        }
        self.deselect(tree);
        let Some(idx) = self.resolve(id, tree) else {
            return false;
        };
        if let Some(el) = tree.element_mut(idx) {
            el.add_class(class::SELECTED);
        }
        self.selected = Some(id);
        log::debug!("selected {id}");
        true
    }

    pub fn deselect(&mut self, tree: &mut MarkupTree) {
        let Some(id) = self.selected.take() else {
            return;
        };
        if let Some(idx) = self.resolve(id, tree)
            && let Some(el) = tree.element_mut(idx)
        {
            el.remove_class(class::SELECTED);
        }
    }

    /// Commit a new geometry to the object and its element.
    pub fn apply_geometry(&mut self, id: ObjectId, geometry: Geometry, tree: &mut MarkupTree) -> bool {
        let Some(idx) = self.resolve(id, tree) else {
            return false;
        };
        if let Some(el) = tree.element_mut(idx) {
            write_geometry(el, &geometry);
        }
        if let Some(object) = self.objects.iter_mut().find(|o| o.id == id) {
            object.geometry = geometry;
        }
        true
    }

    /// Remove an object from the registry and the surface. The block
    /// paragraph that held it goes too once it is empty.
    pub fn remove(&mut self, id: ObjectId, tree: &mut MarkupTree) -> bool {
        let Some(idx) = self.resolve(id, tree) else {
            return false;
        };
        let container = match tree.parent(idx) {
            Some(parent) if tree.has_class(parent, class::TABLE_CONTAINER) => parent,
            _ => idx,
        };
        let block = tree
            .parent(container)
            .filter(|&p| p != tree.root && tree.is_tag(p, "p"));
        tree.remove_subtree(container);
        if let Some(block) = block
            && tree.is_blank(block)
        {
            tree.remove_subtree(block);
        }
        self.forget(id);
        log::debug!("removed {id}");
        true
    }

    fn forget(&mut self, id: ObjectId) {
        self.objects.retain(|o| o.id != id);
        self.bindings.retain(|_, bound| *bound != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
    }
}

/// Identify an object marker.
fn classify(tree: &MarkupTree, idx: NodeIndex) -> Option<ObjectKind> {
    let el = tree.element(idx)?;
    if el.has_class(class::IMG_CONTAINER) {
        let src = tree
            .descendants(idx)
            .into_iter()
            .find(|&n| tree.is_tag(n, "img"))
            .and_then(|img| tree.attr(img, "src"))
            .unwrap_or_default()
            .to_string();
        return Some(ObjectKind::Image { src });
    }
    if el.has_class(class::LINE_CONTAINER) {
        return Some(ObjectKind::Line {
            orientation: el
                .attr("data-orientation")
                .and_then(Orientation::from_name)
                .unwrap_or_default(),
            thickness: el
                .attr("data-thickness")
                .and_then(|t| t.trim().parse::<f64>().ok())
                .filter(|t| *t > 0.0)
                .unwrap_or(DEFAULT_LINE_THICKNESS),
            color: el.attr("data-color").unwrap_or("#000000").to_string(),
        });
    }
    if el.tag.as_str() == "table" {
        let (rows, columns) = table::dimensions(tree, idx);
        return Some(ObjectKind::Table {
            rows,
            columns,
            border_style: el
                .attr("data-border-style")
                .and_then(BorderStyle::from_name)
                .unwrap_or_default(),
            border_width: el
                .attr("data-border-width")
                .and_then(|w| w.trim().parse::<f64>().ok())
                .unwrap_or(1.0),
        });
    }
    None
}

fn scan_geometry(tree: &MarkupTree, idx: NodeIndex, kind: &ObjectKind) -> Geometry {
    let Some(el) = tree.element(idx) else {
        return Geometry::default();
    };
    match kind {
        ObjectKind::Image { .. } => read_geometry(el, DEFAULT_IMAGE_SIZE),
        ObjectKind::Line {
            orientation,
            thickness,
            ..
        } => {
            let fallback = match orientation {
                Orientation::Horizontal => Size::new(DEFAULT_LINE_LENGTH, *thickness),
                Orientation::Vertical => Size::new(*thickness, DEFAULT_LINE_LENGTH),
            };
            let mut g = read_geometry(el, fallback);
            match orientation {
                Orientation::Horizontal => g.height = *thickness,
                Orientation::Vertical => g.width = *thickness,
            }
            g
        }
        ObjectKind::Table { rows, .. } => read_geometry(
            el,
            Size::new(DEFAULT_TABLE_WIDTH, (*rows).max(1) as f64 * DEFAULT_TABLE_ROW_HEIGHT),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{emit_fragment, parse_fragment};

    const PAGE: &str = concat!(
        r#"<p>Intro</p>"#,
        r#"<p class="image-paragraph"><div class="img-container" style="left: 10px; top: 20px; width: 120px; height: 80px;"><img class="editor-image" src="a.png"></div></p>"#,
        r#"<p class="line-paragraph"><div class="line-container" data-orientation="vertical" data-thickness="3"></div></p>"#,
        r#"<p class="table-paragraph"><div class="table-container"><div class="table-controls"></div><table data-border-style="dotted"><tr><th>H</th></tr><tr><td>c</td></tr></table></div></p>"#,
    );

    fn loaded() -> (MarkupTree, ObjectRegistry) {
        let tree = parse_fragment(PAGE).unwrap();
        let mut registry = ObjectRegistry::new();
        registry.rebuild(&tree);
        (tree, registry)
    }

    #[test]
    fn discovers_all_object_kinds() {
        let (_, registry) = loaded();
        let kinds: Vec<&str> = registry.iter().map(|o| o.kind.name()).collect();
        assert_eq!(kinds, ["image", "line", "table"]);
        let z: Vec<usize> = registry.iter().map(|o| o.z_order).collect();
        assert_eq!(z, [1, 2, 3]);
    }

    #[test]
    fn scanned_geometry_and_attributes() {
        let (_, registry) = loaded();
        let objects: Vec<&EditorObject> = registry.iter().collect();
        assert_eq!(objects[0].geometry, Geometry::new(10.0, 20.0, 120.0, 80.0));
        assert!(matches!(
            objects[1].kind,
            ObjectKind::Line { orientation: Orientation::Vertical, thickness, .. } if thickness == 3.0
        ));
        assert_eq!(objects[1].geometry.width, 3.0);
        assert!(matches!(
            objects[2].kind,
            ObjectKind::Table { rows: 2, columns: 1, border_style: BorderStyle::Dotted, .. }
        ));
    }

    #[test]
    fn rebuild_keeps_identities_reset_replaces_them() {
        let (tree, mut registry) = loaded();
        let before = registry.ids();
        registry.rebuild(&tree);
        assert_eq!(registry.ids(), before);

        registry.reset_and_rebuild(&tree);
        let after = registry.ids();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|id| !before.contains(id)));
    }

    #[test]
    fn replaced_image_element_matches_by_src() {
        let (tree, mut registry) = loaded();
        let image = registry.ids()[0];
        // Same markup parsed again: every element has a new uid.
        let reparsed = parse_fragment(&emit_fragment(&tree)).unwrap();
        registry.rebuild(&reparsed);
        assert_eq!(registry.ids()[0], image);
        // Lines and tables have no fallback key.
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn each_element_is_bound_once() {
        let (tree, mut registry) = loaded();
        registry.rebuild(&tree);
        registry.rebuild(&tree);
        // image + line + table + table container
        assert_eq!(registry.bindings_len(), 4);
    }

    #[test]
    fn descendants_route_to_their_object() {
        let (tree, registry) = loaded();
        let img = tree.find_by_tag("img")[0];
        assert_eq!(registry.object_for_element(&tree, img), Some(registry.ids()[0]));
        let controls = tree.find_by_class(class::TABLE_CONTROLS)[0];
        assert_eq!(registry.object_for_element(&tree, controls), Some(registry.ids()[2]));
        let intro = tree.children(tree.root)[0];
        assert_eq!(registry.object_for_element(&tree, intro), None);
    }

    #[test]
    fn remove_drops_empty_paragraph() {
        let (mut tree, mut registry) = loaded();
        let table = registry.ids()[2];
        assert!(registry.remove(table, &mut tree));
        assert!(tree.find_by_class(class::TABLE_PARAGRAPH).is_empty());
        assert!(tree.find_by_tag("table").is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn stale_objects_are_dropped_on_access() {
        let (mut tree, mut registry) = loaded();
        let image = registry.ids()[0];
        let container = tree.find_by_class(class::IMG_CONTAINER)[0];
        tree.remove_subtree(container);
        assert_eq!(registry.resolve(image, &tree), None);
        assert!(registry.get(image).is_none());
    }

    #[test]
    fn selection_marks_element_and_survives_rebuild() {
        let (mut tree, mut registry) = loaded();
        let line = registry.ids()[1];
        assert!(registry.select(line, &mut tree));
        assert_eq!(tree.find_by_class(class::SELECTED).len(), 1);
        registry.rebuild(&tree);
        assert_eq!(registry.selected(), Some(line));
        registry.deselect(&mut tree);
        assert!(tree.find_by_class(class::SELECTED).is_empty());
    }
}
