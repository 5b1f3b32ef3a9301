//! Emitter: `MarkupTree` → HTML fragment.
//!
//! Two flavours: the *clean* fragment stored in pages, history and exports,
//! and the *live* fragment handed to the host for rendering, which tags every
//! element with its uid so host edits can be mapped back.

use crate::markup::{MarkupKind, MarkupTree};
use crate::parser::{UID_ATTR, VOID_ELEMENTS};
use petgraph::graph::NodeIndex;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
struct EmitOptions<'a> {
    with_uids: bool,
    /// Classes left out of every `class` attribute.
    strip_classes: &'a [&'a str],
}

/// Emit the whole tree as a clean HTML fragment.
#[must_use]
pub fn emit_fragment(tree: &MarkupTree) -> String {
    emit_inner(tree, tree.root)
}

/// Emit the whole tree, leaving out the given classes (an element whose
/// class list ends up empty loses its `class` attribute).
#[must_use]
pub fn emit_fragment_without(tree: &MarkupTree, strip_classes: &[&str]) -> String {
    let mut out = String::with_capacity(1024);
    let opts = EmitOptions {
        with_uids: false,
        strip_classes,
    };
    for &child in tree.children(tree.root) {
        emit_node(&mut out, tree, child, opts, false);
    }
    out
}

/// Emit the whole tree with `data-folio-uid` on every element.
#[must_use]
pub fn emit_live(tree: &MarkupTree) -> String {
    let mut out = String::with_capacity(1024);
    let opts = EmitOptions {
        with_uids: true,
        strip_classes: &[],
    };
    for &child in tree.children(tree.root) {
        emit_node(&mut out, tree, child, opts, false);
    }
    out
}

/// Emit the children of `idx` (its inner HTML).
#[must_use]
pub fn emit_inner(tree: &MarkupTree, idx: NodeIndex) -> String {
    let mut out = String::with_capacity(1024);
    let raw = tree
        .tag(idx)
        .is_some_and(|t| matches!(t, "script" | "style"));
    for &child in tree.children(idx) {
        emit_node(&mut out, tree, child, EmitOptions::default(), raw);
    }
    out
}

/// Emit `idx` itself, including its own tag (its outer HTML).
#[must_use]
pub fn emit_outer(tree: &MarkupTree, idx: NodeIndex) -> String {
    let mut out = String::new();
    emit_node(&mut out, tree, idx, EmitOptions::default(), false);
    out
}

fn emit_node(out: &mut String, tree: &MarkupTree, idx: NodeIndex, opts: EmitOptions<'_>, raw: bool) {
    let node = &tree.graph[idx];
    match &node.kind {
        MarkupKind::Root => {
            for &child in tree.children(idx) {
                emit_node(out, tree, child, opts, false);
            }
        }
        MarkupKind::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                escape_text(out, text);
            }
        }
        MarkupKind::Element(el) => {
            let tag = el.tag.as_str();
            out.push('<');
            out.push_str(tag);
            for attr in &el.attrs {
                if !opts.strip_classes.is_empty() && attr.name.as_str() == "class" {
                    let kept: Vec<&str> = attr
                        .value
                        .split_ascii_whitespace()
                        .filter(|c| !opts.strip_classes.contains(c))
                        .collect();
                    if !kept.is_empty() {
                        out.push_str(" class=\"");
                        escape_attr(out, &kept.join(" "));
                        out.push('"');
                    }
                    continue;
                }
                out.push(' ');
                out.push_str(attr.name.as_str());
                out.push_str("=\"");
                escape_attr(out, &attr.value);
                out.push('"');
            }
            if opts.with_uids {
                let _ = write!(out, " {UID_ATTR}=\"{}\"", node.uid.get());
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            let raw_children = matches!(tag, "script" | "style");
            for &child in tree.children(idx) {
                emit_node(out, tree, child, opts, raw_children);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;
    use pretty_assertions::assert_eq;

    fn roundtrip(input: &str) -> String {
        emit_fragment(&parse_fragment(input).unwrap())
    }

    #[test]
    fn paragraphs_and_inline_spans_roundtrip() {
        let html = r#"<p>Hello <b>bold</b> and <span style="color: #ff0000;">red</span></p><p><br></p>"#;
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = r#"<p title="a &quot;q&quot; &amp; b">1 &lt; 2 &amp;&amp; 3 &gt; 2&nbsp;</p>"#;
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        assert_eq!(roundtrip("<p>a<br/>b<img src=x.png></p>"), r#"<p>a<br>b<img src="x.png"></p>"#);
    }

    #[test]
    fn live_markup_carries_uids_and_parses_back() {
        let tree = parse_fragment("<p>x</p>").unwrap();
        let p = tree.children(tree.root)[0];
        let live = emit_live(&tree);
        assert_eq!(live, format!("<p data-folio-uid=\"{}\">x</p>", tree.graph[p].uid.get()));

        let reparsed = parse_fragment(&live).unwrap();
        let p2 = reparsed.children(reparsed.root)[0];
        assert_eq!(reparsed.graph[p2].uid, tree.graph[p].uid);
        assert_eq!(emit_fragment(&reparsed), "<p>x</p>");
    }

    #[test]
    fn transient_classes_are_stripped() {
        let tree =
            parse_fragment(r#"<div class="img-container selected dragging"></div><td class="selected">x</td>"#)
                .unwrap();
        assert_eq!(
            emit_fragment_without(&tree, &["selected", "dragging"]),
            r#"<div class="img-container"></div><td>x</td>"#
        );
    }

    #[test]
    fn outer_and_inner() {
        let tree = parse_fragment(r#"<div class="c"><i>x</i></div>"#).unwrap();
        let div = tree.children(tree.root)[0];
        assert_eq!(emit_outer(&tree, div), r#"<div class="c"><i>x</i></div>"#);
        assert_eq!(emit_inner(&tree, div), "<i>x</i>");
    }
}
