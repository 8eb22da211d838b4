//! Board outline tracing inside a cropped region.
//!
//! The region is binarized with an inverted adaptive-mean threshold, outer
//! borders are traced, the largest one is simplified to a polygon and its four
//! extreme vertices become the board corners.

use imageproc::contours::{find_contours, BorderType};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use fenscan_core::{
    approximate_polygon, arc_length, largest_contour_area, order_corners, CornerSet,
    GeometryError, GrayImage, GrayImageView,
};

use crate::threshold::{adaptive_threshold_mean_inv, ThresholdError, ThresholdParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CornerError {
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerParams {
    pub threshold: ThresholdParams,
    /// Polygon simplification tolerance as a fraction of the outline perimeter.
    pub epsilon_ratio: f32,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            threshold: ThresholdParams::default(),
            epsilon_ratio: 0.02,
        }
    }
}

/// Outer borders of the foreground (non-zero) pixels of a binary image.
///
/// Contour points are pixel centers in continuous coordinates.
pub fn outer_contours(binary: &GrayImage) -> Vec<Vec<Point2<f32>>> {
    if binary.width == 0 || binary.height == 0 {
        return Vec::new();
    }
    let Some(buf) =
        image::GrayImage::from_raw(binary.width as u32, binary.height as u32, binary.data.clone())
    else {
        return Vec::new();
    };

    find_contours::<i32>(&buf)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .map(|c| {
            c.points
                .iter()
                .map(|p| Point2::new(p.x as f32 + 0.5, p.y as f32 + 0.5))
                .collect()
        })
        .collect()
}

/// Find the four outer board corners in region-local coordinates.
///
/// Fails with [`GeometryError::NoContour`] when nothing is traced, with
/// [`GeometryError::CornerDegeneracy`] when the simplified outline cannot
/// yield a proper quadrilateral and with [`ThresholdError`] for an unusable
/// threshold window.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(region, params), fields(w = region.width, h = region.height))
)]
pub fn find_board_corners(
    region: &GrayImageView<'_>,
    params: &CornerParams,
) -> Result<CornerSet, CornerError> {
    let binary = adaptive_threshold_mean_inv(region, &params.threshold)?;
    let contours = outer_contours(&binary);
    let outline = largest_contour_area(&contours)?;

    let peri = arc_length(outline, true);
    let poly = approximate_polygon(outline, params.epsilon_ratio * peri);
    debug!(
        "corner extraction: {} outer contours, largest has {} points, simplified to {} vertices",
        contours.len(),
        outline.len(),
        poly.len()
    );

    Ok(order_corners(&poly)?)
}
