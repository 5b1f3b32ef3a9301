//! Page markup as it leaves the editor: no handles, no table controls, no
//! selection or interaction classes, no editing attributes.

use crate::error::ExportError;
use folio_core::model::class;
use folio_core::{MarkupKind, MarkupTree, NodeIndex, emit_fragment_without, parse_fragment};

/// Elements that only exist for on-screen manipulation.
const CHROME: &[&str] = &[
    class::RESIZE_HANDLE,
    class::ROTATE_HANDLE,
    class::CELL_RESIZE_HANDLE,
    class::TABLE_CONTROLS,
];

/// Parse page `index` and strip its editing chrome.
pub fn clean_tree(content: &str, index: usize) -> Result<MarkupTree, ExportError> {
    let mut tree =
        parse_fragment(content).map_err(|source| ExportError::Parse { index, source })?;
    let chrome: Vec<NodeIndex> = tree
        .descendants(tree.root)
        .into_iter()
        .filter(|&n| CHROME.iter().any(|c| tree.has_class(n, c)))
        .collect();
    for node in chrome {
        if tree.contains(node) {
            tree.remove_subtree(node);
        }
    }
    for node in tree.descendants(tree.root) {
        if let Some(el) = tree.element_mut(node) {
            el.remove_attr("contenteditable");
        }
    }
    Ok(tree)
}

/// Clean markup of page `index`.
pub fn clean_page(content: &str, index: usize) -> Result<String, ExportError> {
    let tree = clean_tree(content, index)?;
    Ok(emit_fragment_without(&tree, class::TRANSIENT))
}

/// Elements that end a line of visible text.
const LINE_BLOCKS: &[&str] = &[
    "div", "tr", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
    "pre",
];

/// Visible text of page `index`, laid out the way a browser's `innerText`
/// would: paragraphs separated by a blank line, cells by tabs.
pub fn visible_text(content: &str, index: usize) -> Result<String, ExportError> {
    let tree = clean_tree(content, index)?;
    let mut out = TextOut::default();
    for &child in tree.children(tree.root) {
        collect_text(&tree, child, &mut out);
    }
    Ok(out.finish())
}

#[derive(Default)]
struct TextOut {
    text: String,
    /// Line breaks owed before the next visible character.
    pending_breaks: usize,
}

impl TextOut {
    fn push(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            for _ in 0..self.pending_breaks {
                self.text.push('\n');
            }
        }
        self.pending_breaks = 0;
        self.text.push_str(s);
    }

    fn require_breaks(&mut self, n: usize) {
        self.pending_breaks = self.pending_breaks.max(n);
    }

    fn finish(self) -> String {
        self.text
    }
}

fn collect_text(tree: &MarkupTree, node: NodeIndex, out: &mut TextOut) {
    match &tree.graph[node].kind {
        MarkupKind::Text(t) => {
            let collapsed = collapse_whitespace(t);
            let trimmed = if out.text.is_empty() || out.pending_breaks > 0 {
                collapsed.trim_start()
            } else {
                collapsed.as_str()
            };
            out.push(trimmed);
        }
        MarkupKind::Element(el) => {
            let tag = el.tag.as_str();
            match tag {
                "br" => {
                    out.text.push('\n');
                    return;
                }
                "script" | "style" => return,
                _ => {}
            }
            let breaks = match tag {
                "p" => 2,
                t if LINE_BLOCKS.contains(&t) => 1,
                _ => 0,
            };
            out.require_breaks(breaks);
            let cells: Vec<NodeIndex> = tree.children(node).to_vec();
            for (i, &child) in cells.iter().enumerate() {
                if tag == "tr" && i > 0 && matches!(tree.tag(child), Some("td" | "th")) {
                    out.push("\t");
                }
                collect_text(tree, child, out);
            }
            out.require_breaks(breaks);
        }
        MarkupKind::Root => {}
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        // Non-breaking spaces are visible and never collapse.
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn handles_and_controls_are_removed() {
        let page = concat!(
            r#"<p class="image-paragraph"><div class="img-container selected" contenteditable="false">"#,
            r#"<img src="a.png"><div class="resize-handle" data-handle="se"></div><div class="rotate-handle"><i></i></div></div></p>"#,
            r#"<div class="table-container"><div class="table-controls"></div><table><tr><td class="selected">x<div class="table-resize-handle"></div></td></tr></table></div>"#,
        );
        assert_eq!(
            clean_page(page, 0).unwrap(),
            concat!(
                r#"<p class="image-paragraph"><div class="img-container"><img src="a.png"></div></p>"#,
                r#"<div class="table-container"><table><tr><td>x</td></tr></table></div>"#,
            )
        );
    }

    #[test]
    fn paragraphs_are_separated_by_a_blank_line() {
        assert_eq!(
            visible_text("<p>Name: <b>Ada</b></p>\n<p>Age</p>", 0).unwrap(),
            "Name: Ada\n\nAge"
        );
    }

    #[test]
    fn table_cells_are_tab_separated() {
        let page = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
        assert_eq!(visible_text(page, 0).unwrap(), "A\tB\n1\t2");
    }

    #[test]
    fn line_breaks_are_kept() {
        assert_eq!(visible_text("<p>one<br>two</p>", 0).unwrap(), "one\ntwo");
    }

    #[test]
    fn broken_markup_names_the_page() {
        assert!(matches!(
            clean_page("<p>ok</p><div class=\"x", 3),
            Err(ExportError::Parse { index: 3, .. })
        ));
    }
}
