//! End-to-end scan: photo in, FEN out.

use std::sync::Arc;

use log::{debug, info, warn};

use fenscan_board::{
    find_board_corners, rectify_board, select_board_region, CornerError, RectifyError,
    RegionOfInterest, SelectError, SelectedRegion, TessellateError, Tessellator,
};
use fenscan_core::{CornerSet, GeometryError, GrayImageView};
use fenscan_fen::{
    board_from_labels, check_plausibility, BoardField, EncodeError, PlausibilityWarning,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::frame::prepare_frame;
use crate::model::{BoardDetector, ModelError, TileClassifier};
use crate::observer::PipelineObserver;
use crate::params::{ConfigError, PipelineParams};

/// Flat classification of [`PipelineError`] for callers that only branch on
/// the failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineErrorKind {
    InvalidInput,
    NoDetection,
    NoContour,
    CornerDegeneracy,
    ClassificationShape,
    Configuration,
    Detector,
    Classifier,
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("input image is empty")]
    EmptyImage,
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Corners(#[from] CornerError),
    #[error(transparent)]
    Rectify(#[from] RectifyError),
    #[error(transparent)]
    Tessellate(#[from] TessellateError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("board detector failed: {0}")]
    Detector(#[source] ModelError),
    #[error("tile classifier failed: {0}")]
    Classifier(#[source] ModelError),
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::EmptyImage => PipelineErrorKind::InvalidInput,
            PipelineError::Select(SelectError::NoDetection { .. }) => {
                PipelineErrorKind::NoDetection
            }
            PipelineError::Corners(CornerError::Geometry(GeometryError::NoContour)) => {
                PipelineErrorKind::NoContour
            }
            PipelineError::Corners(CornerError::Geometry(GeometryError::CornerDegeneracy(_))) => {
                PipelineErrorKind::CornerDegeneracy
            }
            PipelineError::Corners(CornerError::Threshold(_)) => PipelineErrorKind::Configuration,
            PipelineError::Rectify(RectifyError::CornerDegeneracy(_)) => {
                PipelineErrorKind::CornerDegeneracy
            }
            PipelineError::Rectify(RectifyError::EmptyOutput) => PipelineErrorKind::Configuration,
            PipelineError::Tessellate(_) => PipelineErrorKind::Configuration,
            PipelineError::Encode(_) => PipelineErrorKind::ClassificationShape,
            PipelineError::Config(_) => PipelineErrorKind::Configuration,
            PipelineError::Detector(_) => PipelineErrorKind::Detector,
            PipelineError::Classifier(_) => PipelineErrorKind::Classifier,
        }
    }
}

/// Result of scanning one board region.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardScan {
    pub board: BoardField,
    /// Full FEN: placement plus the configured suffix.
    pub fen: String,
    /// Corners in the coordinates of the region that was scanned.
    pub corners: CornerSet,
    pub warnings: Vec<PlausibilityWarning>,
}

/// Result of a full photo scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanResult {
    pub fen: String,
    pub board: BoardField,
    pub region: SelectedRegion,
    pub roi: RegionOfInterest,
    /// Corners in working-image coordinates.
    pub corners: CornerSet,
    pub warnings: Vec<PlausibilityWarning>,
}

/// Board scanner bound to one detector, one classifier and fixed parameters.
///
/// Calls are independent: every invocation owns its buffers, and the models
/// are shared read-only handles.
#[derive(Clone)]
pub struct Pipeline {
    detector: Arc<dyn BoardDetector>,
    classifier: Arc<dyn TileClassifier>,
    observer: Option<Arc<dyn PipelineObserver>>,
    params: PipelineParams,
    tessellator: Tessellator,
}

impl Pipeline {
    /// Validate `params` and bind the models.
    pub fn new(
        detector: Arc<dyn BoardDetector>,
        classifier: Arc<dyn TileClassifier>,
        params: PipelineParams,
    ) -> Result<Self, PipelineError> {
        params.validate()?;
        let tessellator = params.tessellator()?;
        Ok(Self {
            detector,
            classifier,
            observer: None,
            params,
            tessellator,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Locate, rectify, classify and encode the board in a photo.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width, height = image.height)
        )
    )]
    pub fn run(&self, image: &GrayImageView<'_>) -> Result<ScanResult, PipelineError> {
        let prepared =
            prepare_frame(image, &self.params.frame).ok_or(PipelineError::EmptyImage)?;
        if let Some(obs) = &self.observer {
            obs.on_frame(&prepared);
        }

        let boxes = self
            .detector
            .detect(&prepared.detection.view())
            .map_err(PipelineError::Detector)?;
        let region = select_board_region(&boxes, prepared.frame, &self.params.selector)?;

        let roi = region.roi(prepared.working.width, prepared.working.height);
        let crop = roi.crop(&prepared.working.view());
        debug!(
            "region of interest: {}x{} at ({}, {})",
            roi.width, roi.height, roi.x, roi.y
        );
        if let Some(obs) = &self.observer {
            obs.on_region(&region, &roi, &crop);
        }

        let scan = self.scan_region(&crop.view())?;
        info!("scanned board: {}", scan.fen);

        Ok(ScanResult {
            fen: scan.fen,
            board: scan.board,
            region,
            roi,
            corners: scan.corners.translated(roi.origin()),
            warnings: scan.warnings,
        })
    }

    /// Scan an image that already contains just the board region.
    pub fn scan_region(&self, region: &GrayImageView<'_>) -> Result<BoardScan, PipelineError> {
        let corners = find_board_corners(region, &self.params.corners)?;
        if let Some(obs) = &self.observer {
            obs.on_corners(&corners);
        }

        let rectified = rectify_board(region, &corners, &self.params.rectify)?;
        if let Some(obs) = &self.observer {
            obs.on_rectified(&rectified);
        }

        let tiles = self.tessellator.tessellate(&rectified)?;
        if let Some(obs) = &self.observer {
            obs.on_tiles(&tiles);
        }

        let labels = self
            .classifier
            .classify(&tiles)
            .map_err(PipelineError::Classifier)?
            .into_labels()?;
        let board = board_from_labels(&labels)?;
        let warnings = check_plausibility(&board);
        for w in &warnings {
            warn!("implausible position: {w}");
        }

        Ok(BoardScan {
            fen: format!("{board} {}", self.params.suffix),
            board,
            corners,
            warnings,
        })
    }
}
