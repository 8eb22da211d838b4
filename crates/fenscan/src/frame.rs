//! Photo normalization ahead of board detection.

use log::debug;
use serde::{Deserialize, Serialize};

use fenscan_board::{canny_edges, CannyThresholds, DetectionFrame};
use fenscan_core::{resize_area, GrayImage, GrayImageView};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameParams {
    /// Photos with a longer edge above this are downscaled first. 0 disables.
    pub max_side: usize,
    /// Side of the square image handed to the board detector.
    pub detector_side: usize,
    /// Canny thresholds turning the detector input into an edge map.
    /// `None` hands the detector plain grayscale.
    pub detector_edges: Option<CannyThresholds>,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            max_side: 1200,
            detector_side: 128,
            detector_edges: Some(CannyThresholds::default()),
        }
    }
}

/// The working image all region coordinates refer to, plus the detector input.
#[derive(Clone, Debug)]
pub struct PreparedFrame {
    /// Source photo after the optional `max_side` downscale.
    pub working: GrayImage,
    /// Top-left square of `working`, resized to `detector_side` and, when
    /// configured, reduced to its Canny edges.
    pub detection: GrayImage,
    pub frame: DetectionFrame,
}

/// Downscale, square-crop from the top-left, resize for the detector and
/// extract edges.
///
/// Returns `None` for an empty image or a zero detector side.
pub fn prepare_frame(source: &GrayImageView<'_>, params: &FrameParams) -> Option<PreparedFrame> {
    if source.width == 0 || source.height == 0 || params.detector_side == 0 {
        return None;
    }

    let long_edge = source.width.max(source.height);
    let working = if params.max_side > 0 && long_edge > params.max_side {
        let s = params.max_side as f64 / long_edge as f64;
        let w = ((source.width as f64 * s) as usize).max(1);
        let h = ((source.height as f64 * s) as usize).max(1);
        resize_area(source, w, h)
    } else {
        source.to_owned_image()
    };

    let clip = working.width.min(working.height);
    let square = working.view().crop(0, 0, clip, clip);
    let resized = resize_area(&square.view(), params.detector_side, params.detector_side);
    let detection = match &params.detector_edges {
        Some(thresholds) => canny_edges(&resized.view(), thresholds),
        None => resized,
    };
    let frame = DetectionFrame {
        side: params.detector_side as f32,
        scale: clip as f32 / params.detector_side as f32,
    };
    debug!(
        "prepared frame: {}x{} -> working {}x{}, detector {}px (scale {:.3})",
        source.width,
        source.height,
        working.width,
        working.height,
        params.detector_side,
        frame.scale
    );

    Some(PreparedFrame {
        working,
        detection,
        frame,
    })
}
