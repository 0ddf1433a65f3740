//! Creative Document - the input contract consumed from the canvas editor.
//!
//! A document is immutable for the duration of one validation. Structural
//! problems (unknown format, canvas/preset mismatch, non-finite geometry) are
//! rejected up front by [`CreativeDocument::validate`] so that no rule ever
//! scores a malformed creative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contrast::{Color, ColorError};
use crate::geometry::Rect;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid creative payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Canvas must have positive dimensions, got {0}x{1}")]
    NonPositiveCanvas(u32, u32),

    #[error("Canvas {actual_w}x{actual_h} does not match format {format} ({expected_w}x{expected_h})")]
    CanvasMismatch {
        format: CreativeFormat,
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },

    #[error("Element {element} has non-finite {field}")]
    NonFiniteGeometry { element: String, field: &'static str },

    #[error("Element {element} has opacity {value} outside [0, 1]")]
    OpacityOutOfRange { element: String, value: f64 },

    #[error("Invalid background color: {0}")]
    InvalidBackground(#[from] ColorError),
}

/// Supported output formats. The string form is the aspect ratio label used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreativeFormat {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Stories,
    #[serde(rename = "1.91:1")]
    Landscape,
    #[serde(rename = "4:5")]
    Portrait,
}

/// Canvas preset for a format.
#[derive(Debug, Clone, Serialize)]
pub struct FormatPreset {
    pub format: CreativeFormat,
    pub width: u32,
    pub height: u32,
    pub name: &'static str,
}

impl CreativeFormat {
    pub const ALL: [CreativeFormat; 4] = [
        CreativeFormat::Square,
        CreativeFormat::Stories,
        CreativeFormat::Landscape,
        CreativeFormat::Portrait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreativeFormat::Square => "1:1",
            CreativeFormat::Stories => "9:16",
            CreativeFormat::Landscape => "1.91:1",
            CreativeFormat::Portrait => "4:5",
        }
    }

    pub fn preset(&self) -> FormatPreset {
        let (width, height, name) = match self {
            CreativeFormat::Square => (1080, 1080, "Facebook/Instagram Post"),
            CreativeFormat::Stories => (1080, 1920, "Instagram/Facebook Stories"),
            CreativeFormat::Landscape => (1200, 628, "Facebook/Instagram Feed"),
            CreativeFormat::Portrait => (1080, 1350, "Instagram Portrait"),
        };
        FormatPreset { format: *self, width, height, name }
    }
}

impl fmt::Display for CreativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreativeFormat {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CreativeFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| InputError::UnsupportedFormat(s.to_string()))
    }
}

/// Where the creative will be placed. `Says` is the reduced placement with smaller
/// minimum lock-up sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Social,
    Says,
}

fn default_background() -> String {
    "#FFFFFF".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeDocument {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub format: CreativeFormat,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default = "default_background")]
    pub background_color: String,

    #[serde(default)]
    pub is_alcohol_campaign: bool,
    #[serde(default)]
    pub has_people_in_images: bool,
    #[serde(default)]
    pub people_confirmed: bool,

    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub subhead: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub tag_text: Option<String>,

    #[serde(default)]
    pub elements: Vec<Element>,
}

impl CreativeDocument {
    /// Empty creative on the preset canvas for `format`.
    pub fn new(format: CreativeFormat) -> Self {
        let preset = format.preset();
        Self {
            canvas_width: preset.width,
            canvas_height: preset.height,
            format,
            placement: Placement::Social,
            background_color: default_background(),
            is_alcohol_campaign: false,
            has_people_in_images: false,
            people_confirmed: false,
            headline: None,
            subhead: None,
            body_text: None,
            tag_text: None,
            elements: vec![],
        }
    }

    /// Parse and validate in one step.
    pub fn from_json(payload: &str) -> Result<Self, InputError> {
        let document: CreativeDocument = serde_json::from_str(payload)?;
        document.validate()?;
        Ok(document)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(InputError::NonPositiveCanvas(self.canvas_width, self.canvas_height));
        }

        let preset = self.format.preset();
        if preset.width != self.canvas_width || preset.height != self.canvas_height {
            return Err(InputError::CanvasMismatch {
                format: self.format,
                expected_w: preset.width,
                expected_h: preset.height,
                actual_w: self.canvas_width,
                actual_h: self.canvas_height,
            });
        }

        self.background_color.parse::<Color>()?;

        for (index, element) in self.elements.iter().enumerate() {
            let fields = [
                ("x", element.x),
                ("y", element.y),
                ("width", element.width),
                ("height", element.height),
                ("angle", element.angle),
                ("opacity", element.opacity),
            ];
            for (field, value) in fields {
                if !value.is_finite() {
                    return Err(InputError::NonFiniteGeometry {
                        element: element.label(index),
                        field,
                    });
                }
            }
            if let ElementKind::Text(text) = &element.kind {
                if !text.font_size.is_finite() {
                    return Err(InputError::NonFiniteGeometry {
                        element: element.label(index),
                        field: "font_size",
                    });
                }
            }
            if !(0.0..=1.0).contains(&element.opacity) {
                return Err(InputError::OpacityOutOfRange {
                    element: element.label(index),
                    value: element.opacity,
                });
            }
        }

        Ok(())
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width as f64, self.canvas_height as f64)
    }

    /// Headline, subhead, body and tag text joined by single spaces, empty parts skipped.
    pub fn copy_text(&self) -> String {
        [&self.headline, &self.subhead, &self.body_text, &self.tag_text]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Element indices ordered by `z_index`, insertion order breaking ties.
    pub fn z_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&i| self.elements[i].z_index);
        order
    }
}

fn default_opacity() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, alias = "rotation")]
    pub angle: f64,
    #[serde(default, alias = "zIndex")]
    pub z_index: i32,
    #[serde(flatten)]
    pub kind: ElementKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Text(TextElement),
    Image(ImageElement),
    Shape(ShapeElement),
    ValueTile(ValueTileElement),
    Tag(TagElement),
    Drinkaware(DrinkawareElement),
}

fn default_font_size() -> f64 {
    24.0
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_fill() -> String {
    "#000000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size", alias = "fontSize")]
    pub font_size: f64,
    #[serde(default = "default_font_family", alias = "fontFamily")]
    pub font_family: String,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default, alias = "fontWeight")]
    pub font_weight: Option<String>,
}

impl TextElement {
    /// `bold`, `bolder` or a numeric weight of 700 and above.
    pub fn is_bold(&self) -> bool {
        match self.font_weight.as_deref().map(str::trim) {
            Some(w) if w.eq_ignore_ascii_case("bold") || w.eq_ignore_ascii_case("bolder") => true,
            Some(w) => w.parse::<u32>().map_or(false, |n| n >= 700),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    Packshot,
    Logo,
    Background,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub role: Option<ImageRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeElement {
    #[serde(default)]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    New,
    White,
    Clubcard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueTileElement {
    pub tile_type: TileType,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub regular_price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagElement {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkawareElement {
    #[serde(default)]
    pub color: String,
}

impl Element {
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: None,
            x,
            y,
            width,
            height,
            opacity: 1.0,
            angle: 0.0,
            z_index: 0,
            kind,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
            ElementKind::ValueTile(_) => "value_tile",
            ElementKind::Tag(_) => "tag",
            ElementKind::Drinkaware(_) => "drinkaware",
        }
    }

    /// Human-readable reference for messages: the id if present, else `type #index`.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => format!("'{}'", id),
            _ => format!("{} #{}", self.type_name(), index + 1),
        }
    }

    /// Visible text of `text` and `tag` elements.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text(t) => Some(&t.text),
            ElementKind::Tag(t) => Some(&t.text),
            _ => None,
        }
    }

    pub fn is_value_tile(&self) -> bool {
        matches!(self.kind, ElementKind::ValueTile(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self.kind, ElementKind::Tag(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_editor_payload() {
        let payload = r##"{
            "canvas_width": 1080,
            "canvas_height": 1920,
            "format": "9:16",
            "background_color": "#00539F",
            "headline": "Fresh taste",
            "elements": [
                {"type": "text", "id": "h1", "x": 40, "y": 300, "width": 600, "height": 80,
                 "text": "Fresh taste", "fontSize": 48, "fill": "#FFFFFF", "zIndex": 2},
                {"type": "image", "x": 200, "y": 600, "width": 500, "height": 500, "src": "p.png"},
                {"type": "value_tile", "x": 20, "y": 250, "width": 200, "height": 120,
                 "tile_type": "clubcard", "price": "£2", "regular_price": "£3"}
            ]
        }"##;

        let doc = CreativeDocument::from_json(payload).unwrap();
        assert_eq!(doc.format, CreativeFormat::Stories);
        assert_eq!(doc.elements.len(), 3);
        assert_eq!(doc.elements[0].z_index, 2);
        match &doc.elements[0].kind {
            ElementKind::Text(t) => assert_eq!(t.font_size, 48.0),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(doc.z_order(), vec![1, 2, 0]);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let payload = r#"{"canvas_width": 1080, "canvas_height": 1080, "format": "3:2"}"#;
        assert!(matches!(
            CreativeDocument::from_json(payload),
            Err(InputError::Parse(_))
        ));
        assert!(matches!(
            "3:2".parse::<CreativeFormat>(),
            Err(InputError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_canvas_must_match_preset() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.canvas_height = 1920;
        assert!(matches!(doc.validate(), Err(InputError::CanvasMismatch { .. })));
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.elements.push(Element::new(
            ElementKind::Shape(ShapeElement::default()),
            f64::NAN,
            0.0,
            10.0,
            10.0,
        ));
        assert!(matches!(
            doc.validate(),
            Err(InputError::NonFiniteGeometry { field: "x", .. })
        ));
    }

    #[test]
    fn test_opacity_range() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        let mut shape = Element::new(ElementKind::Shape(ShapeElement::default()), 0.0, 0.0, 1.0, 1.0);
        shape.opacity = 1.5;
        doc.elements.push(shape);
        assert!(matches!(doc.validate(), Err(InputError::OpacityOutOfRange { .. })));
    }

    #[test]
    fn test_copy_text_skips_empty_parts() {
        let mut doc = CreativeDocument::new(CreativeFormat::Square);
        doc.headline = Some("Hello".to_string());
        doc.subhead = Some("   ".to_string());
        doc.tag_text = Some("Only at Tesco".to_string());
        assert_eq!(doc.copy_text(), "Hello Only at Tesco");
    }

    #[test]
    fn test_bold_detection() {
        let mut text = TextElement {
            text: String::new(),
            font_size: 18.0,
            font_family: default_font_family(),
            fill: default_fill(),
            font_weight: Some("700".to_string()),
        };
        assert!(text.is_bold());
        text.font_weight = Some("normal".to_string());
        assert!(!text.is_bold());
    }
}
