//! Error types for annotation store operations.

use thiserror::Error;

/// Errors that can occur when talking to the annotation store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-2xx status
    #[error("Store API error ({status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body for debugging
        body: String,
    },

    /// The configured base URL cannot address the store
    #[error("Invalid store URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// What is wrong with it
        message: String,
    },

    /// No image with this name is stored
    #[error("Image not found: {image}")]
    NotFound {
        /// Name of the missing image
        image: String,
    },

    /// The store cannot be reached at all
    #[error("Store is unavailable")]
    Unavailable,
}

impl StoreError {
    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(image: impl Into<String>) -> Self {
        Self::NotFound {
            image: image.into(),
        }
    }

    /// Whether the store reported the addressed resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Status { status: 404, .. }
        )
    }
}
