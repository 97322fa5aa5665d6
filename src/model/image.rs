//! Image records as the store serves them.

use serde::{Deserialize, Serialize};

use super::{Annotation, null_as_empty};

/// An uploaded image. `image_name` is its identity and the key annotations
/// are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    #[serde(rename = "imageName")]
    pub image_name: String,
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
}

impl ImageFile {
    pub fn new(image_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            image_url: image_url.into(),
        }
    }
}

/// A stored image together with its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Store-assigned id. Empty when registering a new image.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(flatten)]
    pub file: ImageFile,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub annotations: Vec<Annotation>,
}

impl ImageEntry {
    pub fn new(file: ImageFile) -> Self {
        Self {
            id: String::new(),
            file,
            annotations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.file.image_name
    }
}

/// The image currently shown and its position in the loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub image: ImageFile,
    pub image_index: usize,
}
