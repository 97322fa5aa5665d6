//! In-process store with the same semantics as the API server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{AnnotationStore, StoreError};
use crate::constants::PAGE_SIZE;
use crate::model::{Annotation, AnnotationId, ImageEntry, ImageFile, LabelEntry};

#[derive(Debug, Default)]
struct Inner {
    images: Vec<ImageEntry>,
    labels: Vec<LabelEntry>,
    uploads: HashMap<String, Vec<u8>>,
    next_id: u64,
}

impl Inner {
    fn mint_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    fn image_mut(&mut self, name: &str) -> Result<&mut ImageEntry, StoreError> {
        self.images
            .iter_mut()
            .find(|e| e.name() == name)
            .ok_or_else(|| StoreError::not_found(name))
    }
}

/// Store kept entirely in memory.
///
/// Images are paged [`PAGE_SIZE`] at a time in insertion order. Unknown
/// image names fail with [`StoreError::NotFound`]. [`set_unavailable`]
/// makes every call fail, for exercising error paths.
///
/// [`set_unavailable`]: MemoryStore::set_unavailable
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload image bytes and register the image.
    pub fn insert_image(&self, image_name: &str, bytes: Vec<u8>) {
        let mut inner = self.lock();
        let id = inner.mint_id();
        let mut entry = ImageEntry::new(ImageFile::new(
            image_name,
            format!("memory://uploads/{}", image_name),
        ));
        entry.id = id;
        inner.images.push(entry);
        inner.uploads.insert(image_name.to_string(), bytes);
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn available(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn images_page(&self, page: usize) -> Result<Vec<ImageEntry>, StoreError> {
        let inner = self.available()?;
        Ok(inner
            .images
            .iter()
            .skip(page.saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .cloned()
            .collect())
    }

    async fn all_images(&self) -> Result<Vec<ImageEntry>, StoreError> {
        Ok(self.available()?.images.clone())
    }

    async fn create_image(&self, image: &ImageFile) -> Result<(), StoreError> {
        let mut inner = self.available()?;
        let mut entry = ImageEntry::new(image.clone());
        entry.id = inner.mint_id();
        inner.images.push(entry);
        Ok(())
    }

    async fn annotations(&self, image_name: &str) -> Result<Vec<Annotation>, StoreError> {
        let mut inner = self.available()?;
        Ok(inner.image_mut(image_name)?.annotations.clone())
    }

    async fn create_annotation(
        &self,
        image_name: &str,
        annotation: &Annotation,
    ) -> Result<(), StoreError> {
        let mut inner = self.available()?;
        inner
            .image_mut(image_name)?
            .annotations
            .push(annotation.clone());
        Ok(())
    }

    async fn delete_annotation(
        &self,
        image_name: &str,
        id: &AnnotationId,
    ) -> Result<(), StoreError> {
        let mut inner = self.available()?;
        inner
            .image_mut(image_name)?
            .annotations
            .retain(|a| &a.annotation_id != id);
        Ok(())
    }

    async fn labels(&self) -> Result<Vec<LabelEntry>, StoreError> {
        Ok(self.available()?.labels.clone())
    }

    async fn create_label(&self, label_name: &str) -> Result<(), StoreError> {
        let mut inner = self.available()?;
        let mut label = LabelEntry::named(label_name);
        label.id = inner.mint_id();
        inner.labels.push(label);
        Ok(())
    }

    async fn delete_all_images(&self) -> Result<(), StoreError> {
        self.available()?.images.clear();
        Ok(())
    }

    async fn delete_all_labels(&self) -> Result<(), StoreError> {
        self.available()?.labels.clear();
        Ok(())
    }

    async fn delete_uploads(&self) -> Result<(), StoreError> {
        self.available()?.uploads.clear();
        Ok(())
    }

    async fn highest_annotation_id(&self) -> Result<Option<u64>, StoreError> {
        let inner = self.available()?;
        Ok(inner
            .images
            .iter()
            .flat_map(|e| &e.annotations)
            .filter_map(|a| a.annotation_id.sequence_number())
            .max())
    }

    async fn image_bytes(&self, image_name: &str) -> Result<Vec<u8>, StoreError> {
        let inner = self.available()?;
        inner
            .uploads
            .get(image_name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(image_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn annotation(n: u64) -> Annotation {
        Annotation::new(
            AnnotationId::from_sequence(n),
            0,
            Rect::new(0.1, 0.1, 0.2, 0.2),
        )
    }

    #[tokio::test]
    async fn test_pagination() {
        let store = MemoryStore::new();
        for i in 0..23 {
            store.insert_image(&format!("img{:02}.png", i), vec![i]);
        }
        assert_eq!(store.images_page(0).await.unwrap().len(), 10);
        assert_eq!(store.images_page(2).await.unwrap().len(), 3);
        assert!(store.images_page(3).await.unwrap().is_empty());
        assert_eq!(store.images_page(1).await.unwrap()[0].name(), "img10.png");
    }

    #[tokio::test]
    async fn test_annotation_crud() {
        let store = MemoryStore::new();
        store.insert_image("a.png", Vec::new());
        store.create_annotation("a.png", &annotation(0)).await.unwrap();
        store.create_annotation("a.png", &annotation(7)).await.unwrap();
        assert_eq!(store.highest_annotation_id().await.unwrap(), Some(7));

        store
            .delete_annotation("a.png", &AnnotationId::from_sequence(0))
            .await
            .unwrap();
        let left = store.annotations("a.png").await.unwrap();
        assert_eq!(left, vec![annotation(7)]);
    }

    #[tokio::test]
    async fn test_unknown_image_is_not_found() {
        let store = MemoryStore::new();
        let err = store.annotations("missing.png").await.unwrap_err();
        assert!(err.is_not_found());
        let err = store
            .create_annotation("missing.png", &annotation(0))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.image_bytes("missing.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_image_registers_entry() {
        let store = MemoryStore::new();
        store
            .create_image(&ImageFile::new("c.png", "http://host/uploads/c.png"))
            .await
            .unwrap();
        let all = store.all_images().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].id.is_empty());
        assert!(store.annotations("c.png").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_highest_id_none_when_empty() {
        let store = MemoryStore::new();
        store.insert_image("a.png", Vec::new());
        assert_eq!(store.highest_annotation_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = MemoryStore::new();
        store.insert_image("a.png", vec![1, 2, 3]);
        store.create_label("cat").await.unwrap();
        store.reset().await.unwrap();
        assert!(store.all_images().await.unwrap().is_empty());
        assert!(store.labels().await.unwrap().is_empty());
        assert!(store.image_bytes("a.png").await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.labels().await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(store.reset().await, Err(StoreError::Unavailable)));
        store.set_unavailable(false);
        assert!(store.labels().await.is_ok());
    }
}
