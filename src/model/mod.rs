//! Data models shared by the session, the store client and the exporter.

mod annotation;
mod image;
mod label;

pub use annotation::{Annotation, AnnotationId, AnnotationSequence};
pub use image::{ImageEntry, ImageFile, SelectedImage};
pub use label::{LabelEntry, LabelError, LabelSet};

use serde::{Deserialize, Deserializer};

/// Deserialize a JSON array that the server may send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
