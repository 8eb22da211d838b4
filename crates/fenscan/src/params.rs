//! JSON-configurable pipeline parameters.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use fenscan_board::{
    CornerParams, RectifyParams, SelectorParams, TessellateError, TessellateParams, Tessellator,
};
use fenscan_fen::{FenParseError, FenSuffix};

use crate::frame::FrameParams;

#[derive(thiserror::Error, Debug)]
pub enum ParamsIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Startup configuration problems. Raised once, before any image is processed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Tessellation(#[from] TessellateError),
    #[error("threshold block size must be odd and >= 3, got {0}")]
    ThresholdBlock(usize),
    #[error("{name} must lie in [0, 1], got {value}")]
    Threshold { name: &'static str, value: f32 },
    #[error("box adjust factor must be positive, got {0}")]
    BoxAdjust(f32),
    #[error("detector input side must be positive")]
    DetectorSide,
    #[error("edge thresholds must be finite with 0 <= low <= high, got {low}/{high}")]
    EdgeThresholds { low: f32, high: f32 },
    #[error("invalid FEN suffix: {0}")]
    Suffix(#[from] FenParseError),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub frame: FrameParams,
    pub selector: SelectorParams,
    pub corners: CornerParams,
    pub rectify: RectifyParams,
    pub tessellate: TessellateParams,
    pub suffix: FenSuffix,
}

impl PipelineParams {
    /// Load parameters from a JSON file. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ParamsIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write these parameters to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ParamsIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Tessellator for the configured board and tile sizes.
    pub fn tessellator(&self) -> Result<Tessellator, TessellateError> {
        Tessellator::new(self.rectify.board_px, self.tessellate.tile_px)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tessellator()?;

        if self.frame.detector_side == 0 {
            return Err(ConfigError::DetectorSide);
        }
        if let Some(t) = self.frame.detector_edges.filter(|t| !t.is_valid()) {
            return Err(ConfigError::EdgeThresholds {
                low: t.low,
                high: t.high,
            });
        }
        if !self.corners.threshold.is_valid() {
            return Err(ConfigError::ThresholdBlock(self.corners.threshold.block_size));
        }
        let s = &self.selector;
        for (name, value) in [
            ("confidence_threshold", s.confidence_threshold),
            ("score_threshold", s.score_threshold),
            ("nms_threshold", s.nms_threshold),
            ("epsilon_ratio", self.corners.epsilon_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Threshold { name, value });
            }
        }
        if !(s.box_adjust > 0.0 && s.box_adjust.is_finite()) {
            return Err(ConfigError::BoxAdjust(s.box_adjust));
        }
        self.suffix.validate()?;
        Ok(())
    }
}
