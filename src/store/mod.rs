//! Client side of the annotation store.
//!
//! The store keeps images (with their annotations), labels and uploaded
//! image bytes. [`HttpStore`] talks to the JSON API server; [`MemoryStore`]
//! keeps everything in process.

mod error;
mod http;
mod memory;

pub use error::StoreError;
pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::model::{Annotation, AnnotationId, ImageEntry, ImageFile, LabelEntry};

/// CRUD operations over images, labels and annotations.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// One page of images (`GET /images/paginated?page=N`).
    async fn images_page(&self, page: usize) -> Result<Vec<ImageEntry>, StoreError>;

    /// Every stored image (`GET /images`).
    async fn all_images(&self) -> Result<Vec<ImageEntry>, StoreError>;

    /// Register an image (`POST /images`).
    async fn create_image(&self, image: &ImageFile) -> Result<(), StoreError>;

    /// Annotations of one image (`GET /images/{name}/annotations`).
    async fn annotations(&self, image_name: &str) -> Result<Vec<Annotation>, StoreError>;

    /// Append an annotation (`POST /images/{name}/annotations`).
    async fn create_annotation(
        &self,
        image_name: &str,
        annotation: &Annotation,
    ) -> Result<(), StoreError>;

    /// Remove an annotation (`DELETE /images/{name}/annotations/{id}`).
    async fn delete_annotation(&self, image_name: &str, id: &AnnotationId)
    -> Result<(), StoreError>;

    /// All labels in creation order (`GET /labels`).
    async fn labels(&self) -> Result<Vec<LabelEntry>, StoreError>;

    /// Add a label (`POST /labels`).
    async fn create_label(&self, label_name: &str) -> Result<(), StoreError>;

    /// `DELETE /images`
    async fn delete_all_images(&self) -> Result<(), StoreError>;

    /// `DELETE /labels`
    async fn delete_all_labels(&self) -> Result<(), StoreError>;

    /// `DELETE /uploads`
    async fn delete_uploads(&self) -> Result<(), StoreError>;

    /// Highest annotation sequence number in use
    /// (`GET /images/annotationCount`). `None` if there are none.
    async fn highest_annotation_id(&self) -> Result<Option<u64>, StoreError>;

    /// Raw bytes of an uploaded image (`GET /uploads/{name}`).
    async fn image_bytes(&self, image_name: &str) -> Result<Vec<u8>, StoreError>;

    /// Delete images, labels and uploads. All three are attempted; the first
    /// failure is returned.
    async fn reset(&self) -> Result<(), StoreError> {
        let results = [
            ("images", self.delete_all_images().await),
            ("labels", self.delete_all_labels().await),
            ("uploads", self.delete_uploads().await),
        ];

        let mut first_err = None;
        for (what, result) in results {
            if let Err(e) = result {
                log::error!("Failed to delete {}: {}", what, e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
