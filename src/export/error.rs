//! Error types for dataset export.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while building or writing an export bundle.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error while writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while writing the zip archive
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Store request failed while collecting the dataset
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The store holds no images
    #[error("Nothing to export: the store holds no images")]
    NoImages,

    /// Split ratios are negative or sum to zero
    #[error("Invalid split ratios {train}/{valid}/{test}")]
    InvalidSplit {
        /// Training share
        train: f64,
        /// Validation share
        valid: f64,
        /// Test share
        test: f64,
    },
}
