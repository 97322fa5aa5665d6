//! Drawable shapes and the tags used to look them up.
//!
//! Shapes are kept in scene coordinates: the viewport pan/zoom is applied
//! by the renderer, not baked into the shape.

use crate::placement::ImagePlacement;
use crate::primitives::{Color, Rect};

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Identifies a group of shapes on the surface so they can be removed together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The displayed image.
    Image,
    /// Crosshair guide lines that follow the pointer.
    GuideLine,
    /// Temporary dimming overlay shown while dragging.
    Overlay,
    /// A persistent object addressed by an application-level id.
    Object(String),
}

impl Tag {
    /// Tag for an object with the given id.
    pub fn object(id: impl Into<String>) -> Self {
        Tag::Object(id.into())
    }
}

/// A primitive drawable.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A straight line, optionally dashed (`[dash, gap]`).
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Color,
        dash: Option<[f64; 2]>,
    },
    /// A filled rectangle.
    Rect { rect: Rect, fill: Color },
    /// A single line of text anchored at its bottom-left corner.
    Text {
        left: f64,
        bottom: f64,
        text: String,
        font_size: f64,
        fill: Color,
    },
    /// The image being annotated.
    Image {
        name: String,
        placement: ImagePlacement,
    },
}

/// Pointer cursor shown over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS-style cursor name.
    pub fn name(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Crosshair => "crosshair",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}

/// Rough width of a line of text, for sizing label backgrounds without a
/// font rasterizer.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_ADVANCE
}
