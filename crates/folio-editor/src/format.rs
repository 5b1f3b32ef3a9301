//! Selection & formatting bridge.
//!
//! Text formatting itself is executed by the host's rich-text substrate
//! (`RichText`). This module names the commands, and derives the toolbar's
//! `FormatState` from the substrate's query answers plus the style of the
//! element holding the caret.

use folio_core::model::css_to_hex;
use folio_core::{ElementId, MarkupTree, NodeIndex};
use serde::{Deserialize, Serialize};

/// The host rich-text command capability.
pub trait RichText {
    /// Run a command on the current selection. Returns whether it applied.
    fn execute(&mut self, command: &str, value: Option<&str>) -> bool;

    /// Whether a toggle command (`bold`, `italic`, ...) is active at the caret.
    fn query_state(&self, command: &str) -> bool;

    /// Surface markup after a command ran, when the substrate edits its own
    /// copy of the surface. The editor re-syncs from it.
    fn surface_markup(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// From a CSS `text-align` value; anything unknown reads as left.
    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            "justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }

    fn command(self) -> &'static str {
        match self {
            Alignment::Left => "justifyLeft",
            Alignment::Center => "justifyCenter",
            Alignment::Right => "justifyRight",
            Alignment::Justify => "justifyFull",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    OrderedList,
    UnorderedList,
    ForeColor(String),
    FontName(String),
    FontSize(String),
    Align(Alignment),
    Indent,
    Outdent,
}

impl FormatCommand {
    /// Command name understood by the substrate.
    pub fn name(&self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::OrderedList => "insertOrderedList",
            FormatCommand::UnorderedList => "insertUnorderedList",
            FormatCommand::ForeColor(_) => "foreColor",
            FormatCommand::FontName(_) => "fontName",
            FormatCommand::FontSize(_) => "fontSize",
            FormatCommand::Align(a) => a.command(),
            FormatCommand::Indent => "indent",
            FormatCommand::Outdent => "outdent",
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            FormatCommand::ForeColor(v) | FormatCommand::FontName(v) | FormatCommand::FontSize(v) => {
                Some(v)
            }
            _ => None,
        }
    }

    /// Parse a command name plus optional value, as sent by a toolbar.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Self> {
        let owned = || value.filter(|v| !v.is_empty()).map(str::to_string);
        Some(match name {
            "bold" => FormatCommand::Bold,
            "italic" => FormatCommand::Italic,
            "underline" => FormatCommand::Underline,
            "insertOrderedList" => FormatCommand::OrderedList,
            "insertUnorderedList" => FormatCommand::UnorderedList,
            "foreColor" => FormatCommand::ForeColor(owned()?),
            "fontName" => FormatCommand::FontName(owned()?),
            "fontSize" => FormatCommand::FontSize(owned()?),
            "justifyLeft" => FormatCommand::Align(Alignment::Left),
            "justifyCenter" => FormatCommand::Align(Alignment::Center),
            "justifyRight" => FormatCommand::Align(Alignment::Right),
            "justifyFull" => FormatCommand::Align(Alignment::Justify),
            "indent" => FormatCommand::Indent,
            "outdent" => FormatCommand::Outdent,
            _ => return None,
        })
    }

    /// Success notice shown after the command ran.
    pub fn notice(&self) -> String {
        match self {
            FormatCommand::Indent => "Indentation increased".to_string(),
            FormatCommand::Outdent => "Indentation decreased".to_string(),
            other => format!("{} formatting applied", other.name()),
        }
    }
}

/// Where the caret is and the computed style around it, as reported by
/// the host. Missing style values are looked up in the surface's inline
/// styles when `anchor` is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaretContext {
    pub in_surface: bool,
    /// Element containing the caret (`data-folio-uid`).
    #[serde(default)]
    pub anchor: Option<ElementId>,
    #[serde(default)]
    pub text_align: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CaretContext {
    /// Fill unset style fields from the nearest inline style on the
    /// anchor's ancestor chain.
    pub fn resolve_styles(mut self, tree: &MarkupTree) -> Self {
        let Some(anchor) = self.anchor.and_then(|uid| tree.find_by_uid(uid)) else {
            return self;
        };
        let lookup = |prop: &str| inherited_style(tree, anchor, prop);
        if self.text_align.is_none() {
            self.text_align = lookup("text-align");
        }
        if self.font_family.is_none() {
            self.font_family = lookup("font-family");
        }
        if self.font_size.is_none() {
            self.font_size = lookup("font-size");
        }
        if self.color.is_none() {
            self.color = lookup("color");
        }
        self
    }
}

fn inherited_style(tree: &MarkupTree, from: NodeIndex, prop: &str) -> Option<String> {
    let holder = tree.closest(from, |t, n| t.element(n).is_some_and(|el| el.style(prop).is_some()))?;
    tree.element(holder)?.style(prop)
}

/// What the formatting toolbar shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub alignment: Alignment,
    pub font_family: String,
    pub font_size: String,
    pub color: String,
}

impl Default for FormatState {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            alignment: Alignment::Left,
            font_family: "Inter".to_string(),
            font_size: "18".to_string(),
            color: "#000000".to_string(),
        }
    }
}

impl FormatState {
    /// Re-derive from the substrate and caret. Fields the caret does not
    /// report keep their previous value.
    pub fn derive(previous: &FormatState, rich_text: &dyn RichText, caret: &CaretContext) -> Self {
        FormatState {
            bold: rich_text.query_state("bold"),
            italic: rich_text.query_state("italic"),
            underline: rich_text.query_state("underline"),
            alignment: caret
                .text_align
                .as_deref()
                .map(Alignment::from_css)
                .unwrap_or_default(),
            font_family: caret
                .font_family
                .as_deref()
                .and_then(primary_font)
                .unwrap_or_else(|| previous.font_family.clone()),
            font_size: caret
                .font_size
                .as_deref()
                .map(|s| s.trim().trim_end_matches("px").to_string())
                .unwrap_or_else(|| previous.font_size.clone()),
            color: caret
                .color
                .as_deref()
                .map(css_to_hex)
                .unwrap_or_else(|| previous.color.clone()),
        }
    }
}

/// First family of a `font-family` list, without quotes.
pub fn primary_font(stack: &str) -> Option<String> {
    let first = stack.split(',').next()?.trim().trim_matches(|c| c == '"' || c == '\'');
    (!first.is_empty()).then(|| first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::parse_fragment;

    struct Fixed(&'static [&'static str]);

    impl RichText for Fixed {
        fn execute(&mut self, _: &str, _: Option<&str>) -> bool {
            true
        }
        fn query_state(&self, command: &str) -> bool {
            self.0.contains(&command)
        }
    }

    #[test]
    fn command_names_roundtrip() {
        for (name, value) in [
            ("bold", None),
            ("insertUnorderedList", None),
            ("foreColor", Some("#ff0000")),
            ("fontName", Some("Tahoma")),
            ("fontSize", Some("5")),
            ("justifyFull", None),
            ("outdent", None),
        ] {
            let cmd = FormatCommand::parse(name, value).unwrap();
            assert_eq!(cmd.name(), name);
            assert_eq!(cmd.value(), value);
        }
        assert_eq!(FormatCommand::parse("foreColor", None), None);
        assert_eq!(FormatCommand::parse("strikeThrough", None), None);
    }

    #[test]
    fn state_from_computed_style() {
        let caret = CaretContext {
            in_surface: true,
            text_align: Some("center".into()),
            font_family: Some("\"Noto Sans Tamil\", Latha, sans-serif".into()),
            font_size: Some("24px".into()),
            color: Some("rgb(255, 0, 0)".into()),
            ..Default::default()
        };
        let state = FormatState::derive(&FormatState::default(), &Fixed(&["bold"]), &caret);
        assert_eq!(
            state,
            FormatState {
                bold: true,
                italic: false,
                underline: false,
                alignment: Alignment::Center,
                font_family: "Noto Sans Tamil".into(),
                font_size: "24".into(),
                color: "#ff0000".into(),
            }
        );
    }

    #[test]
    fn unparseable_color_falls_back_to_black() {
        let caret = CaretContext {
            in_surface: true,
            color: Some("currentcolor".into()),
            ..Default::default()
        };
        let state = FormatState::derive(&FormatState::default(), &Fixed(&[]), &caret);
        assert_eq!(state.color, "#000000");
        assert_eq!(state.alignment, Alignment::Left);
    }

    #[test]
    fn styles_are_inherited_from_inline_ancestors() {
        let tree = parse_fragment(
            r#"<p style="text-align: right;"><span style="color: #00ff00; font-size: 14px;"><b>x</b></span></p>"#,
        )
        .unwrap();
        let b = tree.find_by_tag("b")[0];
        let caret = CaretContext {
            in_surface: true,
            anchor: Some(tree.graph[b].uid),
            ..Default::default()
        }
        .resolve_styles(&tree);
        assert_eq!(caret.text_align.as_deref(), Some("right"));
        assert_eq!(caret.color.as_deref(), Some("#00ff00"));
        assert_eq!(caret.font_size.as_deref(), Some("14px"));
        assert_eq!(caret.font_family, None);
    }
}
