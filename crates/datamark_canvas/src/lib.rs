//! datamark_canvas - the drawing surface used by the DataMark annotator
//!
//! This crate holds the retained-mode canvas abstraction: primitive shapes,
//! tags used to find and remove them again, the pan/zoom viewport and the
//! scale-to-fit placement of the displayed image. It does not rasterize
//! anything; a renderer walks [`Scene::shapes`] and paints them.

mod placement;
mod primitives;
mod shape;
mod surface;
mod viewport;

pub use placement::{ImagePlacement, fit_image};
pub use primitives::{Color, Point, Rect};
pub use shape::{Cursor, Shape, Tag, estimate_text_width};
pub use surface::{DrawingSurface, Scene};
pub use viewport::Viewport;
