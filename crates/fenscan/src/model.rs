//! Seams for the two learned models the scanner depends on.
//!
//! Both are injected into [`crate::Pipeline`] as `Arc<dyn ...>` handles that are
//! built once and shared read-only. A backend that needs `&mut self` for
//! inference implements the `Exclusive*` trait instead and is wrapped in
//! [`Exclusive`], which serializes calls behind a mutex.

use std::sync::Mutex;

use fenscan_board::{DetectionBox, TileSet};
use fenscan_core::GrayImageView;
use fenscan_fen::Classification;

/// Failure reported by a model backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ModelError {
    message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Board detector: returns every raw candidate box for a square detection frame,
/// in detection-frame pixels, unfiltered.
pub trait BoardDetector: Send + Sync {
    fn detect(&self, frame: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError>;
}

/// Tile classifier: one label or score row per tile, in tile order.
pub trait TileClassifier: Send + Sync {
    fn classify(&self, tiles: &TileSet) -> Result<Classification, ModelError>;
}

pub trait ExclusiveDetector: Send {
    fn detect(&mut self, frame: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError>;
}

pub trait ExclusiveClassifier: Send {
    fn classify(&mut self, tiles: &TileSet) -> Result<Classification, ModelError>;
}

/// Lock adapter for non-reentrant inference backends.
#[derive(Debug, Default)]
pub struct Exclusive<T> {
    inner: Mutex<T>,
}

impl<T> Exclusive<T> {
    pub fn new(backend: T) -> Self {
        Self {
            inner: Mutex::new(backend),
        }
    }

    pub fn into_inner(self) -> Result<T, ModelError> {
        self.inner.into_inner().map_err(|_| poisoned())
    }
}

fn poisoned() -> ModelError {
    ModelError::new("inference backend lock poisoned")
}

impl<T: ExclusiveDetector> BoardDetector for Exclusive<T> {
    fn detect(&self, frame: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError> {
        let mut backend = self.inner.lock().map_err(|_| poisoned())?;
        backend.detect(frame)
    }
}

impl<T: ExclusiveClassifier> TileClassifier for Exclusive<T> {
    fn classify(&self, tiles: &TileSet) -> Result<Classification, ModelError> {
        let mut backend = self.inner.lock().map_err(|_| poisoned())?;
        backend.classify(tiles)
    }
}
