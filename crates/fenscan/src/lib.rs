//! Chessboard photo to FEN.
//!
//! This crate ties the workspace together:
//! - re-exports of the geometry (`fenscan::core`), board (`fenscan::board`) and
//!   notation (`fenscan::fen`) crates,
//! - the [`BoardDetector`] / [`TileClassifier`] seams for the two learned models,
//! - [`Pipeline`], which runs frame preparation, board selection, corner
//!   extraction, rectification, tiling, classification and encoding.
//!
//! ## Quickstart
//!
//! ```no_run
//! use std::sync::Arc;
//! use fenscan::{Pipeline, PipelineParams};
//! # use fenscan::{BoardDetector, TileClassifier, ModelError};
//! # use fenscan::board::{DetectionBox, TileSet};
//! # use fenscan::core::GrayImageView;
//! # use fenscan::fen::Classification;
//! # struct Yolo;
//! # impl BoardDetector for Yolo {
//! #     fn detect(&self, _: &GrayImageView<'_>) -> Result<Vec<DetectionBox>, ModelError> {
//! #         Ok(vec![])
//! #     }
//! # }
//! # struct Cnn;
//! # impl TileClassifier for Cnn {
//! #     fn classify(&self, _: &TileSet) -> Result<Classification, ModelError> {
//! #         Ok(Classification::Labels(vec![0; 64]))
//! #     }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(Arc::new(Yolo), Arc::new(Cnn), PipelineParams::default())?;
//! let photo = fenscan::imaging::load_gray("board.jpg")?;
//! let result = pipeline.run(&photo.view())?;
//! println!("{}", result.fen);
//! # Ok(())
//! # }
//! ```

pub use fenscan_board as board;
pub use fenscan_core as core;
pub use fenscan_fen as fen;

mod frame;
mod model;
mod observer;
mod params;
mod pipeline;

#[cfg(feature = "image")]
pub mod imaging;

pub use frame::{prepare_frame, FrameParams, PreparedFrame};
pub use model::{
    BoardDetector, Exclusive, ExclusiveClassifier, ExclusiveDetector, ModelError, TileClassifier,
};
pub use observer::PipelineObserver;
pub use params::{ConfigError, ParamsIoError, PipelineParams};
pub use pipeline::{BoardScan, Pipeline, PipelineError, PipelineErrorKind, ScanResult};
