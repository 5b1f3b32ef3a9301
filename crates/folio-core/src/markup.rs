//! In-memory model of the live editable surface.
//!
//! The surface is a tree of markup nodes (elements and text) stored in a
//! `StableDiGraph`. Edges go from parent → child; child order is kept in a
//! side table because graph indices are recycled after removals.
//!
//! Elements are referenced from outside the tree through `ElementRef`, a
//! weak handle that only resolves while the node is still the same element
//! *and* still attached to the root.

use crate::id::{Atom, ElementId};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single `name="value"` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: Atom,
    pub value: String,
}

/// An element: tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Atom,
    pub attrs: SmallVec<[Attr; 4]>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: Atom::intern(&tag.to_ascii_lowercase()),
            attrs: SmallVec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = Atom::intern(name);
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let name = Atom::intern(name);
        let value = value.into();
        if let Some(existing) = self.attrs.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attrs.push(Attr { name, value });
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let name = Atom::intern(name);
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", remaining.join(" "));
        }
    }

    /// Read one property from the inline `style` attribute.
    pub fn style(&self, property: &str) -> Option<String> {
        parse_style(self.attr("style")?)
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
            .map(|(_, v)| v)
    }

    /// Set one property in the inline `style` attribute, keeping the others.
    pub fn set_style(&mut self, property: &str, value: &str) {
        let mut decls = self.attr("style").map(parse_style).unwrap_or_default();
        if let Some(slot) = decls
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
        {
            slot.1 = value.to_string();
        } else {
            decls.push((property.to_string(), value.to_string()));
        }
        self.set_attr("style", format_style(&decls));
    }

    pub fn remove_style(&mut self, property: &str) {
        let Some(style) = self.attr("style") else {
            return;
        };
        let decls: Vec<(String, String)> = parse_style(style)
            .into_iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(property))
            .collect();
        if decls.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", format_style(&decls));
        }
    }
}

/// The node kinds in the surface tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupKind {
    Root,
    Element(Element),
    Text(String),
}

/// A node in the surface tree.
#[derive(Debug, Clone)]
pub struct MarkupNode {
    pub uid: ElementId,
    pub kind: MarkupKind,
}

impl MarkupNode {
    pub fn element(element: Element) -> Self {
        Self {
            uid: ElementId::fresh(),
            kind: MarkupKind::Element(element),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            uid: ElementId::fresh(),
            kind: MarkupKind::Text(text.into()),
        }
    }
}

/// Weak reference to an element of the live surface.
///
/// Holding one never keeps the element alive; resolve it through
/// `MarkupTree::resolve` on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub index: NodeIndex,
    pub uid: ElementId,
}

// ─── Tree ────────────────────────────────────────────────────────────────

/// The live surface content as a tree rooted at an anonymous fragment root.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    pub graph: StableDiGraph<MarkupNode, ()>,
    pub root: NodeIndex,
    order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl MarkupTree {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(MarkupNode {
            uid: ElementId::fresh(),
            kind: MarkupKind::Root,
        });
        Self {
            graph,
            root,
            order: HashMap::new(),
        }
    }

    /// Append `node` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeIndex, node: MarkupNode) -> NodeIndex {
        let len = self.children(parent).len();
        self.insert(parent, len, node)
    }

    /// Insert `node` at `position` among `parent`'s children (clamped).
    pub fn insert(&mut self, parent: NodeIndex, position: usize, node: MarkupNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        let siblings = self.order.entry(parent).or_default();
        let position = position.min(siblings.len());
        siblings.insert(position, idx);
        idx
    }

    /// Children of a node in document order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    /// Index of `idx` among its parent's children.
    pub fn position_in_parent(&self, idx: NodeIndex) -> Option<usize> {
        let parent = self.parent(idx)?;
        self.children(parent).iter().position(|&c| c == idx)
    }

    /// Unlink `idx` from its parent. The subtree stays in the graph.
    pub fn detach(&mut self, idx: NodeIndex) {
        if let Some(parent) = self.parent(idx) {
            if let Some(edge) = self.graph.find_edge(parent, idx) {
                self.graph.remove_edge(edge);
            }
            if let Some(siblings) = self.order.get_mut(&parent) {
                siblings.retain(|&c| c != idx);
            }
        }
    }

    /// Remove `idx` and all of its descendants.
    pub fn remove_subtree(&mut self, idx: NodeIndex) {
        if idx == self.root || !self.contains(idx) {
            return;
        }
        self.detach(idx);
        let mut doomed = self.descendants(idx);
        doomed.push(idx);
        for node in doomed {
            self.order.remove(&node);
            self.graph.remove_node(node);
        }
    }

    /// Remove every child of `idx`.
    pub fn clear_children(&mut self, idx: NodeIndex) {
        for child in self.children(idx).to_vec() {
            self.remove_subtree(child);
        }
    }

    /// All descendants of `idx` in pre-order, excluding `idx` itself.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(idx).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `idx` is reachable from the root through parent links.
    pub fn is_attached(&self, idx: NodeIndex) -> bool {
        let mut cursor = idx;
        loop {
            if cursor == self.root {
                return true;
            }
            if !self.contains(cursor) {
                return false;
            }
            match self.parent(cursor) {
                Some(p) => cursor = p,
                None => return false,
            }
        }
    }

    pub fn element_ref(&self, idx: NodeIndex) -> ElementRef {
        ElementRef {
            index: idx,
            uid: self.graph[idx].uid,
        }
    }

    /// Revalidate a weak element reference against the current tree.
    pub fn resolve(&self, handle: ElementRef) -> Option<NodeIndex> {
        let node = self.graph.node_weight(handle.index)?;
        if node.uid != handle.uid || !self.is_attached(handle.index) {
            return None;
        }
        Some(handle.index)
    }

    /// Locate an attached node by uid.
    pub fn find_by_uid(&self, uid: ElementId) -> Option<NodeIndex> {
        self.descendants(self.root)
            .into_iter()
            .find(|&idx| self.graph[idx].uid == uid)
    }

    pub fn element(&self, idx: NodeIndex) -> Option<&Element> {
        match &self.graph.node_weight(idx)?.kind {
            MarkupKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, idx: NodeIndex) -> Option<&mut Element> {
        match &mut self.graph.node_weight_mut(idx)?.kind {
            MarkupKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, idx: NodeIndex) -> Option<&str> {
        self.element(idx).map(|el| el.tag.as_str())
    }

    pub fn is_tag(&self, idx: NodeIndex, tag: &str) -> bool {
        self.tag(idx) == Some(tag)
    }

    pub fn has_class(&self, idx: NodeIndex, class: &str) -> bool {
        self.element(idx).is_some_and(|el| el.has_class(class))
    }

    pub fn attr(&self, idx: NodeIndex, name: &str) -> Option<&str> {
        self.element(idx)?.attr(name)
    }

    /// Nearest ancestor-or-self matching `pred`.
    pub fn closest(&self, idx: NodeIndex, pred: impl Fn(&Self, NodeIndex) -> bool) -> Option<NodeIndex> {
        let mut cursor = Some(idx);
        while let Some(node) = cursor {
            if node == self.root {
                return None;
            }
            if pred(self, node) {
                return Some(node);
            }
            cursor = self.parent(node);
        }
        None
    }

    /// Concatenated text of a subtree, without any block separation.
    pub fn text_content(&self, idx: NodeIndex) -> String {
        let mut out = String::new();
        for node in std::iter::once(idx).chain(self.descendants(idx)) {
            if let MarkupKind::Text(t) = &self.graph[node].kind {
                out.push_str(t);
            }
        }
        out
    }

    /// True when a node holds nothing but whitespace text and `<br>`s.
    pub fn is_blank(&self, idx: NodeIndex) -> bool {
        self.descendants(idx)
            .into_iter()
            .all(|node| match &self.graph[node].kind {
                MarkupKind::Text(t) => t.trim().is_empty(),
                MarkupKind::Element(el) => el.tag.as_str() == "br",
                MarkupKind::Root => true,
            })
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeIndex> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&idx| self.has_class(idx, class))
            .collect()
    }

    /// Attached elements with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeIndex> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&idx| self.is_tag(idx, tag))
            .collect()
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inline style helpers ────────────────────────────────────────────────

/// Split an inline `style` attribute into `(property, value)` pairs.
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            let v = v.trim();
            (!k.is_empty()).then(|| (k.to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

/// Join `(property, value)` pairs back into an inline `style` attribute.
pub fn format_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{k}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a CSS pixel length such as `"120px"` or `"12.5"`.
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v).trim();
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a pixel length, dropping a trailing `.0`.
pub fn format_px(value: f64) -> String {
    format!("{}px", format_num(value))
}

pub fn format_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(tree: &mut MarkupTree, text: &str) -> NodeIndex {
        let root = tree.root;
        let p = tree.append(root, MarkupNode::element(Element::new("p")));
        tree.append(p, MarkupNode::text(text));
        p
    }

    #[test]
    fn children_keep_insertion_order_after_removal() {
        let mut tree = MarkupTree::new();
        let a = paragraph(&mut tree, "a");
        let b = paragraph(&mut tree, "b");
        tree.remove_subtree(a);
        // Recycled index must not jump ahead of `b`.
        let c = paragraph(&mut tree, "c");
        assert_eq!(tree.children(tree.root), &[b, c]);
        assert_eq!(tree.text_content(tree.root), "bc");
    }

    #[test]
    fn stale_reference_does_not_resolve() {
        let mut tree = MarkupTree::new();
        let p = paragraph(&mut tree, "x");
        let handle = tree.element_ref(p);
        assert_eq!(tree.resolve(handle), Some(p));

        tree.remove_subtree(p);
        // Same index may be handed out again, but with a different uid.
        let q = paragraph(&mut tree, "y");
        assert_eq!(tree.resolve(handle), None);
        assert!(tree.resolve(tree.element_ref(q)).is_some());
    }

    #[test]
    fn detached_reference_does_not_resolve() {
        let mut tree = MarkupTree::new();
        let p = paragraph(&mut tree, "x");
        let handle = tree.element_ref(p);
        tree.detach(p);
        assert_eq!(tree.resolve(handle), None);
    }

    #[test]
    fn class_and_style_editing() {
        let mut el = Element::new("div").with_attr("style", "left: 10px; top: 4px");
        el.add_class("img-container");
        el.add_class("selected");
        el.add_class("selected");
        assert_eq!(el.attr("class"), Some("img-container selected"));
        el.remove_class("selected");
        assert_eq!(el.attr("class"), Some("img-container"));

        el.set_style("left", "25px");
        el.set_style("width", "300px");
        assert_eq!(el.style("left").as_deref(), Some("25px"));
        assert_eq!(el.attr("style"), Some("left: 25px; top: 4px; width: 300px;"));
        el.remove_style("top");
        assert_eq!(el.style("top"), None);
    }

    #[test]
    fn px_parsing() {
        assert_eq!(parse_px("120px"), Some(120.0));
        assert_eq!(parse_px(" 12.5 "), Some(12.5));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(format_px(30.0), "30px");
        assert_eq!(format_px(30.456), "30.46px");
    }

    #[test]
    fn blank_detection() {
        let mut tree = MarkupTree::new();
        let root = tree.root;
        let p = tree.append(root, MarkupNode::element(Element::new("p")));
        tree.append(p, MarkupNode::text("  "));
        tree.append(p, MarkupNode::element(Element::new("br")));
        assert!(tree.is_blank(p));
        tree.append(p, MarkupNode::text("hi"));
        assert!(!tree.is_blank(p));
    }
}
