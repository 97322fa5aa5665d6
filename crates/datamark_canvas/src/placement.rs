//! Scale-to-fit placement of the displayed image.

/// Where the image sits on the surface, in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Left edge of the scaled image.
    pub left: f64,
    /// Top edge of the scaled image.
    pub top: f64,
    /// Horizontal scale factor applied to the source pixels.
    pub scale_x: f64,
    /// Vertical scale factor applied to the source pixels.
    pub scale_y: f64,
    /// Source image width in pixels.
    pub source_width: u32,
    /// Source image height in pixels.
    pub source_height: u32,
}

impl ImagePlacement {
    /// Displayed width after scaling.
    pub fn scaled_width(&self) -> f64 {
        f64::from(self.source_width) * self.scale_x
    }

    /// Displayed height after scaling.
    pub fn scaled_height(&self) -> f64 {
        f64::from(self.source_height) * self.scale_y
    }
}

/// Scale an image uniformly so it fills `fill_ratio` of the limiting surface
/// dimension, and center it.
///
/// Returns `None` for zero-sized images or surfaces.
pub fn fit_image(
    surface_width: f64,
    surface_height: f64,
    image_width: u32,
    image_height: u32,
    fill_ratio: f64,
) -> Option<ImagePlacement> {
    if image_width == 0 || image_height == 0 || surface_width <= 0.0 || surface_height <= 0.0 {
        return None;
    }

    let iw = f64::from(image_width);
    let ih = f64::from(image_height);
    let scale = if surface_width / iw < surface_height / ih {
        surface_width * fill_ratio / iw
    } else {
        surface_height * fill_ratio / ih
    };

    let left = (surface_width - iw * scale) / 2.0;
    let top = (surface_height - ih * scale) / 2.0;

    Some(ImagePlacement {
        left,
        top,
        scale_x: scale,
        scale_y: scale,
        source_width: image_width,
        source_height: image_height,
    })
}
