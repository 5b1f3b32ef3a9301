//! Document data model: pages, page borders, colors and manipulable objects.
//!
//! Pages store their content as flat HTML fragments. Objects (images, lines,
//! tables) only exist while their page is displayed; they are discovered by
//! the registry from the marker classes below and refer back into the live
//! surface through weak `ElementRef`s.

use crate::geometry::{Geometry, Orientation, normalize_degrees};
use crate::id::{ObjectId, PageId};
use crate::markup::{Element, ElementRef, format_num, format_px, parse_px};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            )),
            6 => Some(Self::rgb(
                hex_val(bytes[0])? << 4 | hex_val(bytes[1])?,
                hex_val(bytes[2])? << 4 | hex_val(bytes[3])?,
                hex_val(bytes[4])? << 4 | hex_val(bytes[5])?,
            )),
            _ => None,
        }
    }

    /// Parse a computed-style color: hex, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn from_css(css: &str) -> Option<Self> {
        let css = css.trim();
        if css.starts_with('#') {
            return Self::from_hex(css);
        }
        let inner = css
            .strip_prefix("rgba(")
            .or_else(|| css.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
        let r = parts.next()??;
        let g = parts.next()??;
        let b = parts.next()??;
        Some(Self::rgb(r, g, b))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Map any CSS color to hex, falling back to black when unparseable.
pub fn css_to_hex(css: &str) -> String {
    Color::from_css(css).unwrap_or(Color::BLACK).to_hex()
}

// ─── Borders ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "solid" => Some(BorderStyle::Solid),
            "dashed" => Some(BorderStyle::Dashed),
            "dotted" => Some(BorderStyle::Dotted),
            "double" => Some(BorderStyle::Double),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
        }
    }
}

/// Decorative border drawn around a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSettings {
    pub enabled: bool,
    pub style: BorderStyle,
    pub width_px: f64,
    pub color: String,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            style: BorderStyle::Solid,
            width_px: 1.0,
            color: "#000000".to_string(),
        }
    }
}

impl BorderSettings {
    /// Inline CSS for the page overlay, or `None` when disabled. The
    /// colour is written as hex; anything unparseable becomes black.
    pub fn css(&self) -> Option<String> {
        let width = if self.width_px.is_finite() { self.width_px } else { 1.0 };
        self.enabled.then(|| {
            format!(
                "border: {} {} {};",
                format_px(width),
                self.style.name(),
                css_to_hex(&self.color)
            )
        })
    }
}

// ─── Pages ───────────────────────────────────────────────────────────────

/// Content a fresh page starts with.
pub const DEFAULT_PAGE_CONTENT: &str = "<p>Start typing here...</p>";

/// One page of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub content: String,
    #[serde(default)]
    pub border: BorderSettings,
}

impl Page {
    pub fn blank(id: PageId) -> Self {
        Self {
            id,
            content: DEFAULT_PAGE_CONTENT.to_string(),
            border: BorderSettings::default(),
        }
    }
}

/// Hands out timestamp-derived page ids that never repeat, even when the
/// clock stalls or steps back.
#[derive(Debug, Clone, Default)]
pub struct PageIdAllocator {
    last: u64,
}

impl PageIdAllocator {
    pub fn next(&mut self, now_ms: u64) -> PageId {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        PageId::from_millis(id)
    }
}

// ─── Objects ─────────────────────────────────────────────────────────────

/// Class names that mark object containers and their parts.
pub mod class {
    pub const IMG_CONTAINER: &str = "img-container";
    pub const EDITOR_IMAGE: &str = "editor-image";
    pub const IMAGE_PARAGRAPH: &str = "image-paragraph";
    pub const LINE_CONTAINER: &str = "line-container";
    pub const LINE_ELEMENT: &str = "line-element";
    pub const LINE_PARAGRAPH: &str = "line-paragraph";
    pub const TABLE_CONTAINER: &str = "table-container";
    pub const EDITOR_TABLE: &str = "editor-table";
    pub const TABLE_CONTROLS: &str = "table-controls";
    pub const TABLE_PARAGRAPH: &str = "table-paragraph";
    pub const RESIZE_HANDLE: &str = "resize-handle";
    pub const ROTATE_HANDLE: &str = "rotate-handle";
    pub const CELL_RESIZE_HANDLE: &str = "table-resize-handle";
    pub const SELECTED: &str = "selected";
    pub const DRAGGING: &str = "dragging";
    pub const RESIZING: &str = "resizing";
    pub const ROTATING: &str = "rotating";

    /// UI-state classes that never reach stored page content.
    pub const TRANSIENT: &[&str] = &[SELECTED, DRAGGING, RESIZING, ROTATING];
}

pub const MIN_IMAGE_SIZE: Size = Size::new(30.0, 30.0);
pub const MIN_TABLE_SIZE: Size = Size::new(100.0, 50.0);
pub const MIN_LINE_LENGTH: f64 = 20.0;
pub const MIN_CELL_SIZE: Size = Size::new(30.0, 20.0);

pub const DEFAULT_IMAGE_SIZE: Size = Size::new(300.0, 200.0);
pub const DEFAULT_LINE_LENGTH: f64 = 200.0;
pub const DEFAULT_LINE_THICKNESS: f64 = 2.0;
pub const DEFAULT_TABLE_WIDTH: f64 = 400.0;
pub const DEFAULT_TABLE_ROW_HEIGHT: f64 = 36.0;

/// Variant data of a manipulable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Image {
        src: String,
    },
    Line {
        orientation: Orientation,
        thickness: f64,
        color: String,
    },
    Table {
        rows: usize,
        columns: usize,
        border_style: BorderStyle,
        border_width: f64,
    },
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Image { .. } => "image",
            ObjectKind::Line { .. } => "line",
            ObjectKind::Table { .. } => "table",
        }
    }

    /// Class of the block paragraph that wraps this kind of object.
    pub fn paragraph_class(&self) -> &'static str {
        match self {
            ObjectKind::Image { .. } => class::IMAGE_PARAGRAPH,
            ObjectKind::Line { .. } => class::LINE_PARAGRAPH,
            ObjectKind::Table { .. } => class::TABLE_PARAGRAPH,
        }
    }
}

/// A manipulable object on the displayed page.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub geometry: Geometry,
    pub z_order: usize,
    /// Weak handle to the container element; revalidate before use.
    pub element: ElementRef,
}

// ─── Geometry ⇄ inline style ─────────────────────────────────────────────

/// Read an object's geometry from its container's inline style.
/// Missing width/height fall back to `fallback`.
pub fn read_geometry(el: &Element, fallback: Size) -> Geometry {
    let px = |prop: &str| el.style(prop).as_deref().and_then(parse_px);
    Geometry {
        x: px("left").unwrap_or(0.0),
        y: px("top").unwrap_or(0.0),
        width: px("width").unwrap_or(fallback.width),
        height: px("height").unwrap_or(fallback.height),
        rotation: el
            .attr("data-rotation")
            .and_then(|r| r.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite())
            .map(normalize_degrees)
            .unwrap_or(0.0),
    }
}

/// Write an object's geometry into its container's inline style.
pub fn write_geometry(el: &mut Element, g: &Geometry) {
    el.set_style("position", "absolute");
    el.set_style("left", &format_px(g.x));
    el.set_style("top", &format_px(g.y));
    el.set_style("width", &format_px(g.width));
    el.set_style("height", &format_px(g.height));
    // Round before wrapping so 359.996 is stored as 0, not 360.
    let rotation = normalize_degrees((g.rotation * 100.0).round() / 100.0);
    if rotation == 0.0 {
        el.remove_style("transform");
    } else {
        el.set_style("transform", &format!("rotate({}deg)", format_num(rotation)));
    }
    el.set_attr("data-rotation", format_num(rotation));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_colors_map_to_hex() {
        assert_eq!(css_to_hex("rgb(255, 0, 16)"), "#ff0010");
        assert_eq!(css_to_hex("rgba(0, 128, 0, 0.5)"), "#008000");
        assert_eq!(css_to_hex("#ABC"), "#aabbcc");
        assert_eq!(css_to_hex("#1a2B3c"), "#1a2b3c");
        assert_eq!(css_to_hex("transparent"), "#000000");
        assert_eq!(css_to_hex("rgb(300, 0, 0)"), "#000000");
    }

    #[test]
    fn border_css_only_when_enabled() {
        let mut border = BorderSettings::default();
        assert_eq!(border.css(), None);
        border.enabled = true;
        border.style = BorderStyle::Dashed;
        border.width_px = 3.0;
        border.color = "#333333".into();
        assert_eq!(border.css().as_deref(), Some("border: 3px dashed #333333;"));
    }

    #[test]
    fn border_css_never_carries_raw_color_text() {
        let border = BorderSettings {
            enabled: true,
            color: "red\" onmouseover=\"x".into(),
            ..BorderSettings::default()
        };
        assert_eq!(border.css().as_deref(), Some("border: 1px solid #000000;"));
        let border = BorderSettings {
            enabled: true,
            color: "rgb(255, 0, 0)".into(),
            ..BorderSettings::default()
        };
        assert_eq!(border.css().as_deref(), Some("border: 1px solid #ff0000;"));
    }

    #[test]
    fn page_ids_strictly_increase() {
        let mut alloc = PageIdAllocator::default();
        let a = alloc.next(1_000);
        let b = alloc.next(1_000);
        let c = alloc.next(900);
        let d = alloc.next(5_000);
        assert!(a < b && b < c && c < d);
        assert_eq!(d.get(), 5_000);
    }

    #[test]
    fn geometry_style_roundtrip() {
        let mut el = Element::new("div").with_attr("class", class::IMG_CONTAINER);
        let g = Geometry {
            x: 12.0,
            y: 40.5,
            width: 300.0,
            height: 200.0,
            rotation: 45.0,
        };
        write_geometry(&mut el, &g);
        assert_eq!(el.style("transform").as_deref(), Some("rotate(45deg)"));
        assert_eq!(read_geometry(&el, DEFAULT_IMAGE_SIZE), g);
    }

    #[test]
    fn rotation_stays_below_a_full_turn() {
        let mut el = Element::new("div");
        let g = Geometry {
            rotation: 359.996,
            ..Geometry::new(0.0, 0.0, 100.0, 100.0)
        };
        write_geometry(&mut el, &g);
        assert_eq!(el.attr("data-rotation"), Some("0"));
        assert_eq!(el.style("transform"), None);
        assert_eq!(read_geometry(&el, DEFAULT_IMAGE_SIZE).rotation, 0.0);

        let stored = Element::new("div").with_attr("data-rotation", "360");
        assert_eq!(read_geometry(&stored, DEFAULT_IMAGE_SIZE).rotation, 0.0);
        let stored = Element::new("div").with_attr("data-rotation", "-90");
        assert_eq!(read_geometry(&stored, DEFAULT_IMAGE_SIZE).rotation, 270.0);
    }

    #[test]
    fn geometry_defaults_when_style_missing() {
        let el = Element::new("div");
        assert_eq!(
            read_geometry(&el, DEFAULT_IMAGE_SIZE),
            Geometry::new(0.0, 0.0, 300.0, 200.0)
        );
    }

    #[test]
    fn page_serializes_with_border() {
        let page = Page::blank(PageId::from_millis(42));
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.starts_with(r#"{"id":42,"content":"<p>Start typing here...</p>""#));
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }
}
