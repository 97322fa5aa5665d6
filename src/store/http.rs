//! JSON-over-HTTP client for the annotation API server.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{AnnotationStore, StoreError};
use crate::model::{Annotation, AnnotationId, ImageEntry, ImageFile, LabelEntry};

/// Response of `GET /images/annotationCount`.
#[derive(Debug, Deserialize)]
struct AnnotationCount {
    #[serde(rename = "highestAnnotationId", default)]
    highest_annotation_id: Option<i64>,
}

/// HTTP client for one store server.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpStore {
    /// Create a client for the server at `base_url`, e.g.
    /// `http://localhost:8080` or `http://host/api`.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, StoreError> {
        let parsed =
            Url::parse(base_url).map_err(|e| StoreError::invalid_url(base_url, e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::invalid_url(base_url, "cannot be a base URL"));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`. Each segment is percent-encoded, so
    /// names containing `/`, spaces or `?` address a single path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::invalid_url(self.base_url.as_str(), "cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Public URL of an uploaded image.
    pub fn image_url(&self, image_name: &str) -> Result<Url, StoreError> {
        self.endpoint(&["uploads", image_name])
    }

    fn paginated_url(&self, page: usize) -> Result<Url, StoreError> {
        let mut url = self.endpoint(&["images", "paginated"])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StoreError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    /// GET a JSON array the server may encode as `null` when empty.
    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, StoreError> {
        Ok(self
            .get_json::<Option<Vec<T>>>(url)
            .await?
            .unwrap_or_default())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`StoreError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), StoreError> {
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, url: Url) -> Result<(), StoreError> {
        log::debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl AnnotationStore for HttpStore {
    async fn images_page(&self, page: usize) -> Result<Vec<ImageEntry>, StoreError> {
        self.get_list(self.paginated_url(page)?).await
    }

    async fn all_images(&self) -> Result<Vec<ImageEntry>, StoreError> {
        self.get_list(self.endpoint(&["images"])?).await
    }

    async fn create_image(&self, image: &ImageFile) -> Result<(), StoreError> {
        let url = self.endpoint(&["images"])?;
        log::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(&ImageEntry::new(image.clone()))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn annotations(&self, image_name: &str) -> Result<Vec<Annotation>, StoreError> {
        self.get_list(self.endpoint(&["images", image_name, "annotations"])?)
            .await
    }

    async fn create_annotation(
        &self,
        image_name: &str,
        annotation: &Annotation,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&["images", image_name, "annotations"])?;
        log::debug!("POST {}", url);
        let response = self.client.post(url).json(annotation).send().await?;
        Self::check_status(response).await
    }

    async fn delete_annotation(
        &self,
        image_name: &str,
        id: &AnnotationId,
    ) -> Result<(), StoreError> {
        self.delete(self.endpoint(&["images", image_name, "annotations", id.as_str()])?)
            .await
    }

    async fn labels(&self) -> Result<Vec<LabelEntry>, StoreError> {
        self.get_list(self.endpoint(&["labels"])?).await
    }

    async fn create_label(&self, label_name: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&["labels"])?;
        log::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(&LabelEntry::named(label_name))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn delete_all_images(&self) -> Result<(), StoreError> {
        self.delete(self.endpoint(&["images"])?).await
    }

    async fn delete_all_labels(&self) -> Result<(), StoreError> {
        self.delete(self.endpoint(&["labels"])?).await
    }

    async fn delete_uploads(&self) -> Result<(), StoreError> {
        self.delete(self.endpoint(&["uploads"])?).await
    }

    async fn highest_annotation_id(&self) -> Result<Option<u64>, StoreError> {
        let count: AnnotationCount = self
            .get_json(self.endpoint(&["images", "annotationCount"])?)
            .await?;
        Ok(count
            .highest_annotation_id
            .and_then(|h| u64::try_from(h).ok()))
    }

    async fn image_bytes(&self, image_name: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.image_url(image_name)?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_onto_base_path() {
        let store = HttpStore::new("http://localhost:5173/api/").unwrap();
        let url = store.endpoint(&["images", "a.png", "annotations"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5173/api/images/a.png/annotations");
    }

    #[test]
    fn test_endpoint_percent_encodes_segments() {
        let store = HttpStore::new("http://localhost:8080").unwrap();
        let url = store
            .endpoint(&["images", "my cat/1.png", "annotations", "annotation3"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/images/my%20cat%2F1.png/annotations/annotation3"
        );
    }

    #[test]
    fn test_paginated_url() {
        let store = HttpStore::new("http://localhost:8080").unwrap();
        assert_eq!(
            store.paginated_url(3).unwrap().as_str(),
            "http://localhost:8080/images/paginated?page=3"
        );
    }

    #[test]
    fn test_image_url() {
        let store = HttpStore::new("http://host:1/base").unwrap();
        assert_eq!(
            store.image_url("x y.jpg").unwrap().as_str(),
            "http://host:1/base/uploads/x%20y.jpg"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            HttpStore::new("not a url"),
            Err(StoreError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpStore::new("mailto:someone@example.com"),
            Err(StoreError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_annotation_count_decodes_null() {
        let c: AnnotationCount = serde_json::from_str(r#"{"highestAnnotationId":null}"#).unwrap();
        assert_eq!(c.highest_annotation_id, None);
        let c: AnnotationCount = serde_json::from_str(r#"{"highestAnnotationId":12}"#).unwrap();
        assert_eq!(c.highest_annotation_id, Some(12));
        let c: AnnotationCount = serde_json::from_str("{}").unwrap();
        assert_eq!(c.highest_annotation_id, None);
    }
}
