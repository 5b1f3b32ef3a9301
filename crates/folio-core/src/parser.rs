//! Parser for HTML fragments → `MarkupTree`.
//!
//! Built on `winnow` 0.7. Tolerant in the way browsers are: unclosed
//! elements close at their parent's end, stray end tags are ignored,
//! comments and doctypes are dropped. Only a truncated tag is an error.
//!
//! `data-folio-uid` attributes written by the live emitter are consumed
//! here and turned back into node identities.

use crate::id::ElementId;
use crate::markup::{Element, MarkupKind, MarkupNode, MarkupTree};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use thiserror::Error;
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Attribute carrying a node's uid in live markup.
pub const UID_ATTR: &str = "data-folio-uid";

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is raw text (no tags, no entity decoding).
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated tag at byte {offset}")]
    UnterminatedTag { offset: usize },
    #[error("unterminated comment at byte {offset}")]
    UnterminatedComment { offset: usize },
}

/// Parse an HTML fragment into a fresh `MarkupTree`.
#[must_use = "parsing result should be used"]
pub fn parse_fragment(input: &str) -> Result<MarkupTree, ParseError> {
    let mut tree = MarkupTree::new();
    let mut open: Vec<NodeIndex> = vec![tree.root];
    let mut claimed: HashSet<u64> = HashSet::new();
    let mut rest = input;

    while !rest.is_empty() {
        let offset = input.len() - rest.len();
        let parent = *open.last().unwrap_or(&tree.root);

        if rest.starts_with("<!--") {
            let Some(end) = rest.find("-->") else {
                return Err(ParseError::UnterminatedComment { offset });
            };
            rest = &rest[end + 3..];
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let Some(end) = rest.find('>') else {
                return Err(ParseError::UnterminatedTag { offset });
            };
            rest = &rest[end + 1..];
        } else if rest.starts_with("</") {
            let name = parse_close_tag
                .parse_next(&mut rest)
                .map_err(|_| ParseError::UnterminatedTag { offset })?;
            let name = name.to_ascii_lowercase();
            // Close up to the nearest matching element; ignore strays.
            if let Some(pos) = open
                .iter()
                .rposition(|&idx| tree.tag(idx) == Some(name.as_str()))
                && pos > 0
            {
                open.truncate(pos);
            } else {
                log::trace!("ignoring stray </{name}> at byte {offset}");
            }
        } else if starts_with_open_tag(rest) {
            let tag = parse_open_tag
                .parse_next(&mut rest)
                .map_err(|_| ParseError::UnterminatedTag { offset })?;
            let name = tag.name.to_ascii_lowercase();

            let mut element = Element::new(&name);
            let mut uid = None;
            for (attr, value) in tag.attrs {
                let attr = attr.to_ascii_lowercase();
                if attr == UID_ATTR {
                    uid = value.parse::<u64>().ok().filter(|raw| claimed.insert(*raw));
                } else {
                    element.set_attr(&attr, value);
                }
            }
            let node = MarkupNode {
                uid: uid.map_or_else(ElementId::fresh, ElementId::claim),
                kind: MarkupKind::Element(element),
            };
            let idx = tree.append(parent, node);

            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !tag.self_closing {
                let closing = format!("</{name}");
                let end = find_ascii_case_insensitive(rest, &closing).unwrap_or(rest.len());
                if end > 0 {
                    tree.append(idx, MarkupNode::text(&rest[..end]));
                }
                rest = &rest[end..];
                // The end tag itself is consumed by the `</` branch.
                open.push(idx);
            } else if !tag.self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                open.push(idx);
            }
        } else {
            // Text run up to the next `<`; a lone `<` is literal text.
            let text = if rest.starts_with('<') {
                let (lt, tail) = rest.split_at(1);
                rest = tail;
                lt
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                let (text, tail) = rest.split_at(end);
                rest = tail;
                text
            };
            append_text(&mut tree, parent, &decode_entities(text));
        }
    }

    Ok(tree)
}

/// Merge adjacent text so `a < b` stays a single text node.
fn append_text(tree: &mut MarkupTree, parent: NodeIndex, text: &str) {
    if let Some(&last) = tree.children(parent).last()
        && let MarkupKind::Text(existing) = &mut tree.graph[last].kind
    {
        existing.push_str(text);
        return;
    }
    tree.append(parent, MarkupNode::text(text));
}

fn starts_with_open_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

// ─── Low-level parsers ──────────────────────────────────────────────────

struct OpenTag<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, String)>,
    self_closing: bool,
}

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    use winnow::ascii::multispace0;
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
    })
    .parse_next(input)
}

fn parse_attr_value(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        take_till(1.., |c: char| c.is_ascii_whitespace() || c == '>'),
    ))
    .map(decode_entities)
    .parse_next(input)
}

fn parse_open_tag<'a>(input: &mut &'a str) -> ModalResult<OpenTag<'a>> {
    let _ = '<'.parse_next(input)?;
    let name = parse_name.parse_next(input)?;
    let mut attrs = Vec::new();

    loop {
        skip_space(input);
        if input.starts_with("/>") {
            *input = &input[2..];
            return Ok(OpenTag {
                name,
                attrs,
                self_closing: true,
            });
        }
        if input.starts_with('>') {
            *input = &input[1..];
            return Ok(OpenTag {
                name,
                attrs,
                self_closing: false,
            });
        }
        if input.starts_with('/') {
            // `<br / >` and similar
            *input = &input[1..];
            continue;
        }

        let attr = parse_name.parse_next(input)?;
        skip_space(input);
        let value = if input.starts_with('=') {
            *input = &input[1..];
            skip_space(input);
            parse_attr_value.parse_next(input)?
        } else {
            String::new()
        };
        attrs.push((attr, value));
    }
}

fn parse_close_tag<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let _ = "</".parse_next(input)?;
    let name = parse_name.parse_next(input)?;
    skip_space(input);
    let _ = '>'.parse_next(input)?;
    Ok(name)
}

// ─── Entities ───────────────────────────────────────────────────────────

/// Decode the character references that appear in editor content.
/// Unknown references are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
