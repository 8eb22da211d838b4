use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use fenscan_core::{
    homography_from_4pt, warp_perspective_gray, CornerSet, GrayImage, GrayImageView, Homography,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Homographies whose determinant magnitude falls below this are treated as singular.
const MIN_HOMOGRAPHY_DET: f64 = 1e-9;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyParams {
    /// Side of the square top-down board image, in pixels.
    pub board_px: usize,
}

impl Default for RectifyParams {
    fn default() -> Self {
        Self { board_px: 256 }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RectifyError {
    #[error("board image side must be positive")]
    EmptyOutput,
    #[error("degenerate corner set: {0}")]
    CornerDegeneracy(&'static str),
}

/// Top-down board image plus the transforms that produced it.
#[derive(Clone, Debug)]
pub struct RectifiedBoard {
    pub image: GrayImage,
    /// Maps rectified pixels into the region the corners were found in.
    pub h_region_from_rect: Homography,
    pub h_rect_from_region: Homography,
    pub corners: CornerSet,
}

impl RectifiedBoard {
    #[inline]
    pub fn side(&self) -> usize {
        self.image.width
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        self.image.view()
    }
}

/// Canonical square corners `(0,0), (S,0), (S,S), (0,S)`.
fn rect_corners(side: usize) -> [Point2<f32>; 4] {
    let s = side as f32;
    [
        Point2::new(0.0, 0.0),
        Point2::new(s, 0.0),
        Point2::new(s, s),
        Point2::new(0.0, s),
    ]
}

/// Warp the quadrilateral `corners` of `region` onto a `board_px` square.
///
/// Top-left lands on `(0, 0)` and bottom-right on `(board_px, board_px)`, so
/// rank 8 ends up in the top rows and file a in the left columns.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(region, corners, params), fields(board_px = params.board_px))
)]
pub fn rectify_board(
    region: &GrayImageView<'_>,
    corners: &CornerSet,
    params: &RectifyParams,
) -> Result<RectifiedBoard, RectifyError> {
    if params.board_px == 0 {
        return Err(RectifyError::EmptyOutput);
    }

    let rect = rect_corners(params.board_px);
    let h_region_from_rect = homography_from_4pt(&rect, &corners.points())
        .ok_or(RectifyError::CornerDegeneracy("homography estimation failed"))?;

    let det = h_region_from_rect.determinant();
    if !det.is_finite() || det.abs() < MIN_HOMOGRAPHY_DET {
        return Err(RectifyError::CornerDegeneracy("homography is singular"));
    }
    let h_rect_from_region = h_region_from_rect
        .inverse()
        .ok_or(RectifyError::CornerDegeneracy("homography is not invertible"))?;

    let image = warp_perspective_gray(region, h_region_from_rect, params.board_px, params.board_px);
    debug!(
        "rectified {}x{} region to {}px board (det={det:.3e})",
        region.width, region.height, params.board_px
    );

    Ok(RectifiedBoard {
        image,
        h_region_from_rect,
        h_rect_from_region,
        corners: *corners,
    })
}
