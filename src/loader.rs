//! Decoding uploaded image bytes.

use thiserror::Error;

/// Errors that can occur when loading an image for display.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The bytes are not a decodable image
    #[error("Failed to decode image '{name}': {source}")]
    Decode {
        /// Image name
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// The image decoded but has no area
    #[error("Image '{name}' is empty")]
    Empty {
        /// Image name
        name: String,
    },

    /// The blocking decode task panicked or was cancelled
    #[error("Decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes` and report the image size.
pub fn decode(name: &str, bytes: &[u8]) -> Result<ImageInfo, LoadError> {
    let img = image::load_from_memory(bytes).map_err(|source| LoadError::Decode {
        name: name.to_string(),
        source,
    })?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(LoadError::Empty {
            name: name.to_string(),
        });
    }
    log::debug!("Decoded {}: {}x{}", name, width, height);
    Ok(ImageInfo { width, height })
}

/// [`decode`] on the blocking pool so the event loop keeps running.
pub async fn decode_async(name: String, bytes: Vec<u8>) -> Result<ImageInfo, LoadError> {
    tokio::task::spawn_blocking(move || decode(&name, &bytes)).await?
}
