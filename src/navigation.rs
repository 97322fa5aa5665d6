//! Selection among the images of the loaded page.

use crate::model::{ImageFile, SelectedImage};
use crate::state::InteractionState;

/// Direction of a page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Next,
    Previous,
}

/// The loaded page of images and which one is shown.
///
/// Arrow pulses move the selection by one within the page, clamped at both
/// ends. Crossing to another page is a separate, explicit step.
#[derive(Debug, Clone, Default)]
pub struct ImageNavigator {
    page: usize,
    images: Vec<ImageFile>,
    selected: Option<usize>,
}

impl ImageNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn images(&self) -> &[ImageFile] {
        &self.images
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<SelectedImage> {
        let index = self.selected?;
        self.images.get(index).map(|image| SelectedImage {
            image: image.clone(),
            image_index: index,
        })
    }

    /// Replace the image list. The selection is cleared.
    pub fn replace(&mut self, page: usize, images: Vec<ImageFile>) {
        self.page = page;
        self.images = images;
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.replace(0, Vec::new());
    }

    /// Select an image by index. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Option<SelectedImage> {
        if index >= self.images.len() {
            return None;
        }
        self.selected = Some(index);
        self.selected()
    }

    /// Apply an arrow pulse. Returns the new selection only if it changed.
    pub fn apply_pulse(&mut self, state: &InteractionState) -> Option<SelectedImage> {
        if state.up_arrow_pressed() {
            self.step_by(1)
        } else if state.down_arrow_pressed() {
            self.step_by(-1)
        } else {
            None
        }
    }

    fn step_by(&mut self, delta: isize) -> Option<SelectedImage> {
        let current = self.selected?;
        let last = self.images.len().checked_sub(1)?;
        let target = current.saturating_add_signed(delta).min(last);
        if target == current {
            log::debug!("Selection stays at {} of {}", current, self.images.len());
            return None;
        }
        self.select(target)
    }

    /// Page index a step leads to. `None` when stepping back from page 0.
    pub fn target_page(&self, step: PageStep) -> Option<usize> {
        match step {
            PageStep::Next => self.page.checked_add(1),
            PageStep::Previous => self.page.checked_sub(1),
        }
    }

    /// Switch to a freshly fetched page. The selection index is kept when it
    /// exists on the new page and falls back to 0 otherwise. An empty page
    /// leaves everything unchanged and returns `None`.
    pub fn apply_page(&mut self, page: usize, images: Vec<ImageFile>) -> Option<SelectedImage> {
        if images.is_empty() {
            log::debug!("Page {} is empty, staying on page {}", page, self.page);
            return None;
        }
        let index = self.selected.filter(|&i| i < images.len()).unwrap_or(0);
        self.page = page;
        self.images = images;
        self.select(index)
    }
}
