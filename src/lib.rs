//! DataMark - bounding-box annotation for image datasets
//!
//! Pointer, button, keyboard and wheel input is merged into one ordered
//! queue, folded into an interaction state by a pure reducer, and turned
//! into drawing-surface effects by per-mode handlers. Committed boxes are
//! stored in image-relative coordinates through an annotation store.

pub mod config;
pub mod constants;
pub mod export;
pub mod geometry;
pub mod handlers;
pub mod input;
pub mod loader;
pub mod model;
pub mod navigation;
pub mod session;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use session::Session;
pub use store::{AnnotationStore, HttpStore, MemoryStore, StoreError};
