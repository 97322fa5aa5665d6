//! The annotation session: owns all interaction state and drives the
//! handlers from the merged input queue.
//!
//! Events are processed strictly one at a time. Writes to the store that do
//! not affect what is shown next (new annotations, new labels) run as
//! background tasks so a slow store never stalls pointer handling; their
//! failures are logged and the canvas is not rolled back.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use datamark_canvas::{DrawingSurface, Point};
use tokio::task::JoinSet;

use crate::constants::ZOOM_STEP;
use crate::geometry::{ImageTransform, to_screen};
use crate::handlers::{self, LabelContext, view};
use crate::input::{Dispatch, EventMerger, InputEvent, KeyBindings, translate};
use crate::loader;
use crate::model::{
    Annotation, AnnotationId, AnnotationSequence, ImageFile, LabelError, LabelSet, SelectedImage,
};
use crate::navigation::{ImageNavigator, PageStep};
use crate::state::InteractionState;
use crate::store::AnnotationStore;

/// The image currently on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub name: String,
    pub transform: ImageTransform,
}

/// One annotating user's session against a store.
pub struct Session<S: DrawingSurface> {
    store: Arc<dyn AnnotationStore>,
    surface: S,
    state: InteractionState,
    sequence: AnnotationSequence,
    labels: LabelSet,
    navigator: ImageNavigator,
    loaded: Option<LoadedImage>,
    /// Annotations of the loaded image, including optimistic ones.
    annotations: Vec<Annotation>,
    bindings: KeyBindings,
    zoom_step: f64,
    pending: JoinSet<()>,
}

impl<S: DrawingSurface> Session<S> {
    pub fn new(store: Arc<dyn AnnotationStore>, surface: S) -> Self {
        Self {
            store,
            surface,
            state: InteractionState::new(),
            sequence: AnnotationSequence::new(),
            labels: LabelSet::new(),
            navigator: ImageNavigator::new(),
            loaded: None,
            annotations: Vec::new(),
            bindings: KeyBindings::default(),
            zoom_step: ZOOM_STEP,
            pending: JoinSet::new(),
        }
    }

    pub fn with_keybindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_zoom_step(mut self, zoom_step: f64) -> Self {
        self.zoom_step = zoom_step;
        self
    }

    // ---- accessors ----

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn navigator(&self) -> &ImageNavigator {
        &self.navigator
    }

    pub fn selected_image(&self) -> Option<SelectedImage> {
        self.navigator.selected()
    }

    pub fn loaded(&self) -> Option<&LoadedImage> {
        self.loaded.as_ref()
    }

    pub fn sequence(&self) -> AnnotationSequence {
        self.sequence
    }

    /// Annotations of the loaded image as shown, including ones whose store
    /// write may still be in flight.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Number of store writes not yet finished.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    // ---- startup ----

    /// Whether the store holds images from an earlier session.
    pub async fn has_previous_data(&self) -> bool {
        match self.store.images_page(0).await {
            Ok(page) => !page.is_empty(),
            Err(e) => {
                log::warn!("Could not check for previous data: {}", e);
                false
            }
        }
    }

    /// Continue an earlier session: labels, first page with its first image
    /// shown, and the id sequence continuing after the highest stored id.
    pub async fn resume(&mut self) {
        self.load_labels().await;

        match self.store.images_page(0).await {
            Ok(page) => {
                let files = page.into_iter().map(|e| e.file).collect();
                self.replace_images(0, files);
                if !self.navigator.images().is_empty() {
                    self.select_image(0).await;
                }
            }
            Err(e) => log::error!("Failed to load first page: {}", e),
        }

        match self.store.highest_annotation_id().await {
            Ok(highest) => {
                self.sequence = AnnotationSequence::resume_from(highest);
                log::info!("Resumed, next annotation id {}", self.sequence.peek());
            }
            Err(e) => log::error!("Failed to read highest annotation id: {}", e),
        }
    }

    /// Wipe the store and all local state.
    pub async fn restart(&mut self) {
        if let Err(e) = self.store.reset().await {
            log::error!("Store reset incomplete: {}", e);
        }
        self.labels.clear();
        self.navigator.clear();
        self.unload();
        self.sequence = AnnotationSequence::new();
        log::info!("Session restarted");
    }

    // ---- labels ----

    /// Replace the local labels with the stored ones.
    pub async fn load_labels(&mut self) {
        match self.store.labels().await {
            Ok(entries) => {
                let names = entries.into_iter().map(|l| l.label_name).collect();
                self.labels.replace(names);
                log::debug!("Loaded {} labels", self.labels.len());
            }
            Err(e) => log::error!("Failed to load labels: {}", e),
        }
    }

    /// Add a label locally and store it in the background.
    pub fn add_label(&mut self, name: &str) -> Result<(), LabelError> {
        let name = self.labels.add(name)?.to_string();
        log::info!("Added label '{}'", name);

        let store = Arc::clone(&self.store);
        self.pending.spawn(async move {
            if let Err(e) = store.create_label(&name).await {
                log::error!("Failed to store label '{}': {}", name, e);
            }
        });
        Ok(())
    }

    pub fn select_label(&mut self, index: usize) -> bool {
        let selected = self.labels.select(index);
        if selected {
            log::debug!("Selected label {} ({:?})", index, self.labels.selected_name());
        } else {
            log::warn!("No label at index {}", index);
        }
        selected
    }

    // ---- images ----

    /// Show a new image list. Nothing is selected afterwards.
    pub fn replace_images(&mut self, page: usize, images: Vec<ImageFile>) {
        self.navigator.replace(page, images);
        self.unload();
    }

    /// Select and show an image of the current page.
    pub async fn select_image(&mut self, index: usize) -> bool {
        match self.navigator.select(index) {
            Some(selected) => {
                self.show(selected).await;
                true
            }
            None => {
                log::warn!("No image at index {}", index);
                false
            }
        }
    }

    /// Load the next or previous page.
    pub async fn change_page(&mut self, step: PageStep) {
        let Some(page) = self.navigator.target_page(step) else {
            log::debug!("Already on the first page");
            return;
        };

        let entries = match self.store.images_page(page).await {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Failed to load page {}: {}", page, e);
                return;
            }
        };

        let files = entries.into_iter().map(|e| e.file).collect();
        if let Some(selected) = self.navigator.apply_page(page, files) {
            log::info!("Page {}", page);
            self.show(selected).await;
        }
    }

    async fn show(&mut self, selected: SelectedImage) {
        self.load_image(&selected.image.image_name).await;
    }

    fn unload(&mut self) {
        self.loaded = None;
        self.annotations.clear();
        self.surface.clear();
        self.surface.request_render();
    }

    /// Fetch, decode and place an image, then render its stored annotations.
    async fn load_image(&mut self, name: &str) {
        self.unload();

        let bytes = match self.store.image_bytes(name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to fetch image '{}': {}", name, e);
                return;
            }
        };

        let info = match loader::decode_async(name.to_string(), bytes).await {
            Ok(info) => info,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let Some(placement) = self.surface.place_image(name, info.width, info.height) else {
            log::warn!("Surface has no room for '{}'", name);
            return;
        };
        let transform = ImageTransform::from(placement);
        self.loaded = Some(LoadedImage {
            name: name.to_string(),
            transform,
        });

        match self.store.annotations(name).await {
            Ok(stored) => {
                for annotation in &stored {
                    self.render_stored(annotation, &transform);
                }
                log::info!("Showing '{}' with {} annotations", name, stored.len());
                self.annotations = stored;
            }
            Err(e) => log::error!("Failed to load annotations of '{}': {}", name, e),
        }
        self.surface.request_render();
    }

    fn render_stored(&mut self, annotation: &Annotation, transform: &ImageTransform) {
        let rect = to_screen(annotation.rect, transform);
        let index_text;
        let label = match self.labels.get(annotation.label_index) {
            Some(name) => name,
            None => {
                log::warn!(
                    "{} refers to unknown label {}",
                    annotation.annotation_id,
                    annotation.label_index
                );
                index_text = annotation.label_index.to_string();
                &index_text
            }
        };
        view::render_annotation(&mut self.surface, rect, label, &annotation.annotation_id);
    }

    // ---- annotations ----

    /// Remove an annotation of the loaded image from the surface and the
    /// store. Returns whether it was shown.
    pub async fn delete_annotation(&mut self, id: &AnnotationId) -> bool {
        let Some(image) = self.loaded.as_ref().map(|l| l.name.clone()) else {
            log::warn!("No image loaded, cannot delete {}", id);
            return false;
        };

        let removed = view::remove_annotation(&mut self.surface, id) > 0;
        self.annotations.retain(|a| &a.annotation_id != id);
        self.surface.request_render();

        if let Err(e) = self.store.delete_annotation(&image, id).await {
            log::error!("Failed to delete {} from '{}': {}", id, image, e);
        } else {
            log::info!("Deleted {} from '{}'", id, image);
        }
        removed
    }

    fn persist(&mut self, image_name: String, annotation: Annotation) {
        let store = Arc::clone(&self.store);
        self.pending.spawn(async move {
            match store.create_annotation(&image_name, &annotation).await {
                Ok(()) => log::debug!("Stored {} on '{}'", annotation.annotation_id, image_name),
                Err(e) => log::error!(
                    "Failed to store {} on '{}': {}",
                    annotation.annotation_id,
                    image_name,
                    e
                ),
            }
        });
    }

    /// Wait for every background store write to finish.
    pub async fn flush(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(e) = result {
                log::error!("Store write task failed: {}", e);
            }
        }
    }

    // ---- input ----

    /// Process one input event to completion.
    pub async fn process(&mut self, event: InputEvent) {
        let viewport = self.surface.viewport();
        let Some(dispatch) = translate(event, &viewport, &self.bindings, self.zoom_step) else {
            return;
        };

        match dispatch {
            Dispatch::Reduce(action) => {
                self.state = self.state.reduce(action);
                self.run_handlers().await;
            }
            Dispatch::Page(step) => self.change_page(step).await,
            Dispatch::Zoom { factor, at } => self.zoom(factor, at),
            Dispatch::SelectLabel(index) => {
                self.select_label(index);
            }
        }
    }

    async fn run_handlers(&mut self) {
        // Mode handlers only run with a label selected, so a box can never
        // exist without one.
        if let Some(index) = self.labels.selected() {
            let name = self.labels.get(index).unwrap_or_default().to_string();
            let label = LabelContext { index, name: &name };
            let image = self.loaded.as_ref().map(|l| l.transform);
            let committed = handlers::run_mode(
                &self.state,
                &mut self.surface,
                image.as_ref(),
                label,
                &mut self.sequence,
            );

            if let (Some(annotation), Some(loaded)) = (committed, self.loaded.as_ref()) {
                let image_name = loaded.name.clone();
                self.annotations.push(annotation.clone());
                self.persist(image_name, annotation);
            }
        }

        if let Some(selected) = self.navigator.apply_pulse(&self.state) {
            log::debug!("Arrow to image {}", selected.image_index);
            self.show(selected).await;
        }
    }

    fn zoom(&mut self, factor: f64, at: Point) {
        self.surface.zoom_at(factor, at);
        self.surface.request_render();
    }

    /// Drain the merged queue until every source is gone, then wait for
    /// outstanding store writes.
    pub async fn run(&mut self, mut merger: EventMerger) {
        log::info!("Session started");
        loop {
            tokio::select! {
                event = merger.recv() => match event {
                    Some(event) => self.process(event).await,
                    None => break,
                },
                Some(result) = self.pending.join_next(), if !self.pending.is_empty() => {
                    if let Err(e) = result {
                        log::error!("Store write task failed: {}", e);
                    }
                }
            }
        }
        self.flush().await;
        log::info!("Session ended");
    }
}
