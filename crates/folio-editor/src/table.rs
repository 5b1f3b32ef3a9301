//! Table structure editing: cell selection, row/column insertion and
//! deletion, clearing cells.
//!
//! All operations work directly on the markup tree. Row and column
//! operations are anchored on the selected cell (`td.selected` /
//! `th.selected`) of the table.

use crate::error::EditorError;
use folio_core::model::class;
use folio_core::{Element, MarkupNode, MarkupTree, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
    Left,
    Right,
}

pub const HEADER_BACKGROUND: &str = "#f8f9fa";
pub const CELL_BORDER_COLOR: &str = "#ced4da";
pub const CELL_PADDING: &str = "8px";

pub fn is_cell(tree: &MarkupTree, idx: NodeIndex) -> bool {
    matches!(tree.tag(idx), Some("td" | "th"))
}

/// Nearest enclosing table of `idx` (not `idx` itself).
pub fn enclosing_table(tree: &MarkupTree, idx: NodeIndex) -> Option<NodeIndex> {
    let parent = tree.parent(idx)?;
    tree.closest(parent, |t, n| t.is_tag(n, "table"))
}

/// Rows of `table` in document order, looking through `thead`/`tbody`
/// but not into nested tables.
pub fn rows(tree: &MarkupTree, table: NodeIndex) -> Vec<NodeIndex> {
    tree.descendants(table)
        .into_iter()
        .filter(|&n| tree.is_tag(n, "tr") && enclosing_table(tree, n) == Some(table))
        .collect()
}

pub fn cells(tree: &MarkupTree, row: NodeIndex) -> Vec<NodeIndex> {
    tree.children(row)
        .iter()
        .copied()
        .filter(|&c| is_cell(tree, c))
        .collect()
}

/// `(rows, columns)`, where columns is the widest row.
pub fn dimensions(tree: &MarkupTree, table: NodeIndex) -> (usize, usize) {
    let rows = rows(tree, table);
    let columns = rows.iter().map(|&r| cells(tree, r).len()).max().unwrap_or(0);
    (rows.len(), columns)
}

pub fn selected_cell(tree: &MarkupTree, table: NodeIndex) -> Option<NodeIndex> {
    rows(tree, table)
        .into_iter()
        .flat_map(|r| cells(tree, r))
        .find(|&c| tree.has_class(c, class::SELECTED))
}

/// Make `cell` the only selected cell of its table.
pub fn select_cell(tree: &mut MarkupTree, cell: NodeIndex) -> bool {
    let Some(table) = enclosing_table(tree, cell).filter(|_| is_cell(tree, cell)) else {
        return false;
    };
    clear_cell_selection(tree, table);
    if let Some(el) = tree.element_mut(cell) {
        el.add_class(class::SELECTED);
    }
    true
}

pub fn clear_cell_selection(tree: &mut MarkupTree, table: NodeIndex) {
    let all: Vec<NodeIndex> = rows(tree, table)
        .into_iter()
        .flat_map(|r| cells(tree, r))
        .collect();
    for c in all {
        if let Some(el) = tree.element_mut(c) {
            el.remove_class(class::SELECTED);
        }
    }
}

pub fn add_row(tree: &mut MarkupTree, table: NodeIndex, position: RowPosition) -> Result<NodeIndex, EditorError> {
    let cell = selected_cell(tree, table).ok_or(EditorError::NoCellSelected)?;
    let row = tree.parent(cell).ok_or(EditorError::NoCellSelected)?;
    let section = tree.parent(row).ok_or(EditorError::NoCellSelected)?;
    let at = tree.position_in_parent(row).unwrap_or(0);
    let at = match position {
        RowPosition::Above => at,
        RowPosition::Below => at + 1,
    };

    let source = cells(tree, row);
    let new_row = tree.insert(section, at, MarkupNode::element(Element::new("tr")));
    let count = source.len();
    for (i, &src) in source.iter().enumerate() {
        let mut td = Element::new("td");
        copy_cell_style(tree.element(src), &mut td);
        let td = tree.append(new_row, MarkupNode::element(td));
        if i + 1 < count {
            append_resize_handle(tree, td);
        }
    }
    log::debug!("table row inserted {position:?}");
    Ok(new_row)
}

pub fn add_column(tree: &mut MarkupTree, table: NodeIndex, position: ColumnPosition) -> Result<(), EditorError> {
    let cell = selected_cell(tree, table).ok_or(EditorError::NoCellSelected)?;
    let row = tree.parent(cell).ok_or(EditorError::NoCellSelected)?;
    let cell_index = cells(tree, row).iter().position(|&c| c == cell).unwrap_or(0);
    let column = match position {
        ColumnPosition::Left => cell_index,
        ColumnPosition::Right => cell_index + 1,
    };
    let template = tree.element(cell).cloned();

    for (i, r) in rows(tree, table).into_iter().enumerate() {
        let header = i == 0;
        let mut el = Element::new(if header { "th" } else { "td" });
        copy_cell_style(template.as_ref(), &mut el);
        if header {
            el.set_style("font-weight", "bold");
            el.set_style("background-color", HEADER_BACKGROUND);
        }
        let row_cells = cells(tree, r);
        let new_cell = match row_cells.get(column) {
            Some(&before) => {
                let at = tree.position_in_parent(before).unwrap_or(0);
                tree.insert(r, at, MarkupNode::element(el))
            }
            None => tree.append(r, MarkupNode::element(el)),
        };
        if header {
            tree.append(new_cell, MarkupNode::text(format!("Header {}", column + 1)));
        }
        append_resize_handle(tree, new_cell);
    }
    log::debug!("table column inserted {position:?}");
    Ok(())
}

pub fn delete_row(tree: &mut MarkupTree, table: NodeIndex) -> Result<(), EditorError> {
    let cell = selected_cell(tree, table).ok_or(EditorError::NoCellSelected)?;
    if rows(tree, table).len() <= 1 {
        return Err(EditorError::LastRow);
    }
    if let Some(row) = tree.parent(cell) {
        tree.remove_subtree(row);
    }
    Ok(())
}

pub fn delete_column(tree: &mut MarkupTree, table: NodeIndex) -> Result<(), EditorError> {
    let cell = selected_cell(tree, table).ok_or(EditorError::NoCellSelected)?;
    let all_rows = rows(tree, table);
    if all_rows.first().is_none_or(|&r| cells(tree, r).len() <= 1) {
        return Err(EditorError::LastColumn);
    }
    let row = tree.parent(cell).ok_or(EditorError::NoCellSelected)?;
    let column = cells(tree, row).iter().position(|&c| c == cell).unwrap_or(0);
    for r in all_rows {
        if let Some(&victim) = cells(tree, r).get(column) {
            tree.remove_subtree(victim);
        }
    }
    Ok(())
}

/// Empty a cell's content, keeping its resize handle.
pub fn clear_cell(tree: &mut MarkupTree, cell: NodeIndex) {
    let doomed: Vec<NodeIndex> = tree
        .children(cell)
        .iter()
        .copied()
        .filter(|&c| !tree.has_class(c, class::CELL_RESIZE_HANDLE))
        .collect();
    for c in doomed {
        tree.remove_subtree(c);
    }
}

/// Build a full table block: `p.table-paragraph > div.table-container >
/// (div.table-controls, table.editor-table)`. Returns `(paragraph, table)`.
pub fn build_table(
    tree: &mut MarkupTree,
    parent: NodeIndex,
    position: usize,
    rows: usize,
    columns: usize,
    border_style: &str,
    border_width: f64,
) -> (NodeIndex, NodeIndex) {
    let p = tree.insert(
        parent,
        position,
        MarkupNode::element(Element::new("p").with_attr("class", class::TABLE_PARAGRAPH)),
    );
    let container = tree.append(
        p,
        MarkupNode::element(Element::new("div").with_attr("class", class::TABLE_CONTAINER)),
    );
    tree.append(
        container,
        MarkupNode::element(Element::new("div").with_attr("class", class::TABLE_CONTROLS)),
    );
    let width = folio_core::markup::format_num(border_width);
    let mut table_el = Element::new("table")
        .with_attr("class", class::EDITOR_TABLE)
        .with_attr("data-border-style", border_style)
        .with_attr("data-border-width", width.clone());
    table_el.set_style("border-collapse", "collapse");
    let table = tree.append(container, MarkupNode::element(table_el));

    let border = format!("{width}px {border_style} {CELL_BORDER_COLOR}");
    for i in 0..rows {
        let tr = tree.append(table, MarkupNode::element(Element::new("tr")));
        for j in 0..columns {
            let header = i == 0;
            let mut cell = Element::new(if header { "th" } else { "td" });
            cell.set_style("border", &border);
            cell.set_style("padding", CELL_PADDING);
            if header {
                cell.set_style("font-weight", "bold");
                cell.set_style("background-color", HEADER_BACKGROUND);
            }
            let cell = tree.append(tr, MarkupNode::element(cell));
            let text = if header {
                format!("Header {}", j + 1)
            } else {
                format!("Cell {i},{j}")
            };
            tree.append(cell, MarkupNode::text(text));
            if j + 1 < columns {
                append_resize_handle(tree, cell);
            }
        }
    }
    (p, table)
}

fn copy_cell_style(source: Option<&Element>, target: &mut Element) {
    let Some(source) = source else {
        return;
    };
    for prop in ["border", "padding"] {
        if let Some(value) = source.style(prop) {
            target.set_style(prop, &value);
        }
    }
}

fn append_resize_handle(tree: &mut MarkupTree, cell: NodeIndex) {
    tree.append(
        cell,
        MarkupNode::element(
            Element::new("div")
                .with_attr("class", class::CELL_RESIZE_HANDLE)
                .with_attr("data-edge", "right"),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{emit_fragment, parse_fragment};

    fn table_tree(html: &str) -> (MarkupTree, NodeIndex) {
        let tree = parse_fragment(html).unwrap();
        let table = tree.find_by_tag("table")[0];
        (tree, table)
    }

    const TWO_BY_TWO: &str = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";

    fn select(tree: &mut MarkupTree, table: NodeIndex, row: usize, col: usize) {
        let r = rows(tree, table)[row];
        let c = cells(tree, r)[col];
        assert!(select_cell(tree, c));
    }

    #[test]
    fn selecting_a_cell_clears_the_others() {
        let (mut tree, table) = table_tree(TWO_BY_TWO);
        select(&mut tree, table, 0, 0);
        select(&mut tree, table, 1, 1);
        let selected: Vec<_> = tree.find_by_class(class::SELECTED);
        assert_eq!(selected.len(), 1);
        assert_eq!(tree.text_content(selected[0]), "2");
    }

    #[test]
    fn row_ops_need_a_selected_cell() {
        let (mut tree, table) = table_tree(TWO_BY_TWO);
        assert_eq!(add_row(&mut tree, table, RowPosition::Below), Err(EditorError::NoCellSelected));
        assert_eq!(delete_column(&mut tree, table), Err(EditorError::NoCellSelected));
    }

    #[test]
    fn add_row_below_selected() {
        let (mut tree, table) = table_tree(TWO_BY_TWO);
        select(&mut tree, table, 0, 1);
        add_row(&mut tree, table, RowPosition::Below).unwrap();
        assert_eq!(dimensions(&tree, table), (3, 2));
        let second = rows(&tree, table)[1];
        assert_eq!(tree.text_content(second), "");
    }

    #[test]
    fn add_column_left_inserts_header() {
        let (mut tree, table) = table_tree(TWO_BY_TWO);
        select(&mut tree, table, 1, 0);
        add_column(&mut tree, table, ColumnPosition::Left).unwrap();
        assert_eq!(dimensions(&tree, table), (2, 3));
        let header = rows(&tree, table)[0];
        let first = cells(&tree, header)[0];
        assert!(tree.is_tag(first, "th"));
        assert_eq!(tree.text_content(first), "Header 1");
    }

    #[test]
    fn last_row_and_column_are_kept() {
        let (mut tree, table) = table_tree("<table><tr><td>only</td></tr></table>");
        select(&mut tree, table, 0, 0);
        assert_eq!(delete_row(&mut tree, table), Err(EditorError::LastRow));
        assert_eq!(delete_column(&mut tree, table), Err(EditorError::LastColumn));
        assert_eq!(dimensions(&tree, table), (1, 1));
    }

    #[test]
    fn delete_column_removes_from_every_row() {
        let (mut tree, table) = table_tree(TWO_BY_TWO);
        select(&mut tree, table, 1, 0);
        delete_column(&mut tree, table).unwrap();
        assert_eq!(emit_fragment(&tree), "<table><tr><th>B</th></tr><tr><td>2</td></tr></table>");
    }

    #[test]
    fn clear_cell_keeps_handle() {
        let (mut tree, table) =
            table_tree(r#"<table><tr><td>text<b>x</b><div class="table-resize-handle"></div></td></tr></table>"#);
        let cell = cells(&tree, rows(&tree, table)[0])[0];
        clear_cell(&mut tree, cell);
        assert_eq!(tree.text_content(cell), "");
        assert_eq!(tree.children(cell).len(), 1);
    }

    #[test]
    fn built_table_has_headers_and_body() {
        let mut tree = MarkupTree::new();
        let root = tree.root;
        let (_, table) = build_table(&mut tree, root, 0, 3, 2, "dashed", 1.0);
        assert_eq!(dimensions(&tree, table), (3, 2));
        let header = cells(&tree, rows(&tree, table)[0]);
        assert_eq!(tree.text_content(header[1]), "Header 2");
        let body = cells(&tree, rows(&tree, table)[2]);
        assert_eq!(tree.text_content(body[0]), "Cell 2,0");
        assert_eq!(
            tree.element(body[0]).and_then(|e| e.style("border")).as_deref(),
            Some("1px dashed #ced4da")
        );
    }

    #[test]
    fn rows_ignore_nested_tables() {
        let (tree, table) =
            table_tree("<table><tbody><tr><td><table><tr><td>in</td></tr></table></td></tr></tbody></table>");
        assert_eq!(rows(&tree, table).len(), 1);
    }
}
