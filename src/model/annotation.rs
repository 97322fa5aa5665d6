//! Annotation records and the id sequence they are minted from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::ANNOTATION_ID_PREFIX;
use crate::geometry::Rect;

/// Identifier of an annotation, unique within its image.
///
/// Locally created ids have the form `annotation<N>`; ids loaded from the
/// store are kept verbatim whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Id for sequence number `n`.
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("{}{}", ANNOTATION_ID_PREFIX, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `N` of an `annotation<N>` id.
    pub fn sequence_number(&self) -> Option<u64> {
        self.0.strip_prefix(ANNOTATION_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A bounding box on one image, in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub annotation_id: AnnotationId,
    /// Index into the label list at the time the box was drawn.
    pub label_index: usize,
    #[serde(flatten)]
    pub rect: Rect,
}

impl Annotation {
    pub fn new(annotation_id: AnnotationId, label_index: usize, rect: Rect) -> Self {
        Self {
            annotation_id,
            label_index,
            rect,
        }
    }
}

/// Session-scoped counter that mints annotation ids.
///
/// Each call to [`mint`](Self::mint) returns a fresh id and advances the
/// counter exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSequence {
    next: u64,
}

impl AnnotationSequence {
    /// Counter starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter continuing after the highest id the store reports.
    pub fn resume_from(highest: Option<u64>) -> Self {
        Self {
            next: highest.map_or(0, |h| h.saturating_add(1)),
        }
    }

    /// The sequence number the next [`mint`](Self::mint) will use.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn mint(&mut self) -> AnnotationId {
        let id = AnnotationId::from_sequence(self.next);
        self.next += 1;
        id
    }
}
