//! YOLO training-data layout.
//!
//! Each image gets one label file with a line per box:
//! ```text
//! <label_index> <x_center> <y_center> <width> <height>
//! ```
//! Coordinates are fractions of the image size, which is exactly how
//! annotations are stored, so no pixel dimensions are needed.

use serde::{Deserialize, Serialize};

use super::{ExportBundle, ExportError};
use crate::model::{Annotation, ImageEntry};

/// Dataset subset an image is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    /// Directory name of the subset.
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }
}

/// Relative sizes of the three subsets. They need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRatios {
    pub train: f64,
    pub valid: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            valid: 0.2,
            test: 0.1,
        }
    }
}

impl SplitRatios {
    /// Check the ratios are usable.
    pub fn validate(&self) -> Result<(), ExportError> {
        let parts = [self.train, self.valid, self.test];
        let total: f64 = parts.iter().sum();
        if parts.iter().any(|r| !r.is_finite() || *r < 0.0) || total <= 0.0 {
            return Err(ExportError::InvalidSplit {
                train: self.train,
                valid: self.valid,
                test: self.test,
            });
        }
        Ok(())
    }

    /// Number of images in train and valid for a dataset of `count`; test
    /// gets the rest.
    fn counts(&self, count: usize) -> (usize, usize) {
        let total = self.train + self.valid + self.test;
        let n = count as f64;
        let train = ((n * self.train / total).round() as usize).min(count);
        let valid = ((n * self.valid / total).round() as usize).min(count - train);
        (train, valid)
    }
}

/// Assign every image a subset. Images are ordered by name first, so the
/// same dataset always splits the same way.
pub fn assign_splits<'a>(
    images: &'a [ImageEntry],
    ratios: &SplitRatios,
) -> Result<Vec<(Split, &'a ImageEntry)>, ExportError> {
    ratios.validate()?;

    let mut sorted: Vec<&ImageEntry> = images.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let (train, valid) = ratios.counts(sorted.len());
    Ok(sorted
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let split = if i < train {
                Split::Train
            } else if i < train + valid {
                Split::Valid
            } else {
                Split::Test
            };
            (split, entry)
        })
        .collect())
}

/// One label line, or `None` if the label index is not in the label list.
pub fn label_line(annotation: &Annotation, label_count: usize) -> Option<String> {
    if annotation.label_index >= label_count {
        return None;
    }
    let r = annotation.rect;
    let cx = r.left + r.width / 2.0;
    let cy = r.top + r.height / 2.0;
    Some(format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        annotation.label_index, cx, cy, r.width, r.height
    ))
}

/// Contents of `data.yaml`.
pub fn data_yaml(labels: &[String]) -> String {
    let names: Vec<String> = labels
        .iter()
        .map(|name| format!("'{}'", name.replace('\'', "''")))
        .collect();
    format!(
        "path: .\ntrain: train/images\nval: valid/images\ntest: test/images\n\nnc: {}\nnames: [{}]\n",
        labels.len(),
        names.join(", ")
    )
}

/// File name with path separators flattened.
pub(crate) fn flat_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// `name` without its last extension.
pub(crate) fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => name,
    }
}

/// Path of the label file for an image within its subset.
pub fn label_path(split: Split, image_name: &str) -> String {
    format!(
        "{}/labels/{}.txt",
        split.dir_name(),
        stem(&flat_name(image_name))
    )
}

/// Path of the image file within its subset.
pub fn image_path(split: Split, image_name: &str) -> String {
    format!("{}/images/{}", split.dir_name(), flat_name(image_name))
}

/// Add label files and `data.yaml` for `images` to `bundle`. Returns the
/// subset each image went to.
pub fn write_labels<'a>(
    bundle: &mut ExportBundle,
    images: &'a [ImageEntry],
    labels: &[String],
    ratios: &SplitRatios,
) -> Result<Vec<(Split, &'a ImageEntry)>, ExportError> {
    let assigned = assign_splits(images, ratios)?;

    for (split, entry) in &assigned {
        let mut lines = Vec::with_capacity(entry.annotations.len());
        for annotation in &entry.annotations {
            match label_line(annotation, labels.len()) {
                Some(line) => lines.push(line),
                None => bundle.add_warning(format!(
                    "Skipped {} on '{}' (unknown label {})",
                    annotation.annotation_id,
                    entry.name(),
                    annotation.label_index
                )),
            }
        }
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        bundle.add_file(label_path(*split, entry.name()), content);
    }

    bundle.add_file("data.yaml", data_yaml(labels));
    Ok(assigned)
}
