//! Dataset export.
//!
//! Export is split in two steps. [`collect`] reads everything from a store
//! into an in-memory [`ExportBundle`] of `path -> bytes`; the bundle is then
//! written either as a directory tree or as a zip archive.

mod error;
pub mod yolo;

pub use error::ExportError;
pub use yolo::{Split, SplitRatios};

use std::collections::BTreeMap;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::store::AnnotationStore;

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    #[serde(flatten)]
    pub split: SplitRatios,
    /// Copy image files next to the label files.
    pub include_images: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            split: SplitRatios::default(),
            include_images: true,
        }
    }
}

/// Files produced by an export, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default)]
pub struct ExportBundle {
    files: BTreeMap<String, Vec<u8>>,
    warnings: Vec<String>,
}

impl ExportBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous file at the same path.
    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file below `root`, creating directories as needed.
    /// Returns the written paths.
    pub fn write_dir(&self, root: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = Vec::with_capacity(self.files.len());
        for (rel, content) in &self.files {
            let path = rel.split('/').fold(root.to_path_buf(), |p, part| p.join(part));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            written.push(path);
        }
        log::info!("Wrote {} files to {}", written.len(), root.display());
        Ok(written)
    }

    /// Write every file into a deflate-compressed zip archive.
    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<W, ExportError> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (rel, content) in &self.files {
            zip.start_file(rel.as_str(), options)?;
            zip.write_all(content)?;
        }
        Ok(zip.finish()?)
    }

    /// [`write_zip`](Self::write_zip) into a new file at `path`.
    pub fn write_zip_file(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        self.write_zip(file)?;
        log::info!("Wrote {} files to {}", self.files.len(), path.display());
        Ok(())
    }
}

/// Read all images, their annotations and the labels from `store` and lay
/// them out for training.
pub async fn collect(
    store: &dyn AnnotationStore,
    options: &ExportOptions,
) -> Result<ExportBundle, ExportError> {
    options.split.validate()?;

    let images = store.all_images().await?;
    if images.is_empty() {
        return Err(ExportError::NoImages);
    }
    let labels: Vec<String> = store
        .labels()
        .await?
        .into_iter()
        .map(|l| l.label_name)
        .collect();
    log::info!("Exporting {} images with {} labels", images.len(), labels.len());

    let mut bundle = ExportBundle::new();
    let assigned = yolo::write_labels(&mut bundle, &images, &labels, &options.split)?;

    if options.include_images {
        for (split, entry) in assigned {
            match store.image_bytes(entry.name()).await {
                Ok(bytes) => bundle.add_file(yolo::image_path(split, entry.name()), bytes),
                Err(e) => bundle.add_warning(format!(
                    "Skipped image file '{}': {}",
                    entry.name(),
                    e
                )),
            }
        }
    }
    Ok(bundle)
}
