//! Global constants for the DataMark annotator

use datamark_canvas::Color;

/// Default store address (the API server listens here in development)
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Environment variable overriding the store address
pub const API_URL_ENV: &str = "DATAMARK_API_URL";

/// Default canvas width for headless sessions
pub const DEFAULT_CANVAS_WIDTH: f64 = 1280.0;

/// Default canvas height for headless sessions
pub const DEFAULT_CANVAS_HEIGHT: f64 = 720.0;

/// Capacity of the merged input queue
pub const DEFAULT_INPUT_CAPACITY: usize = 256;

/// Images per page served by the store
pub const PAGE_SIZE: usize = 10;

/// Prefix of generated annotation ids (`annotation0`, `annotation1`, ...)
pub const ANNOTATION_ID_PREFIX: &str = "annotation";

/// Zoom multiplier per wheel notch
pub const ZOOM_STEP: f64 = 1.1;

/// Minimum zoom level
pub const ZOOM_MIN: f64 = 0.1;

/// Maximum zoom level
pub const ZOOM_MAX: f64 = 20.0;

/// Crosshair guide lines
pub mod guide {
    use super::Color;

    /// Dash pattern `[dash, gap]`
    pub const DASH: [f64; 2] = [5.0, 5.0];
    /// Line color
    pub const STROKE: Color = Color::WHITE;
}

/// Dimming overlay shown while dragging out a rectangle
pub mod overlay {
    use super::Color;

    /// Fill over the whole canvas
    pub const DIM: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.5,
    };
    /// Fill over the rectangle being drawn
    pub const HIGHLIGHT: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 0.5,
    };
}

/// Rendered annotation box and label
pub mod annotation_style {
    use super::Color;

    /// Box fill
    pub const BOX_FILL: Color = Color {
        r: 0.0,
        g: 0.5,
        b: 0.0,
        a: 0.2,
    };
    /// Label background fill
    pub const LABEL_FILL: Color = Color {
        r: 0.0,
        g: 0.5,
        b: 0.0,
        a: 0.75,
    };
    /// Label text color
    pub const TEXT_FILL: Color = Color::WHITE;
    /// Label font size
    pub const FONT_SIZE: f64 = 24.0;
    /// Label background height
    pub const LABEL_HEIGHT: f64 = 35.0;
    /// Horizontal text inset inside the label background
    pub const TEXT_INSET: f64 = 5.0;
}
