//! Board region selection from raw detector boxes.
//!
//! Three coordinate frames meet here and each one is explicit:
//! - the *detection frame*: the square image the detector saw, `frame.side`
//!   pixels wide,
//! - the *source image*: the photo the detection frame was resized from,
//!   `frame.scale` source pixels per detection pixel,
//! - the *region*: the crop of the source image handed to corner extraction,
//!   positioned by [`RegionOfInterest::x`]/[`RegionOfInterest::y`].

use std::cmp::Ordering;

use log::debug;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use fenscan_core::{distance, GrayImage, GrayImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Raw board candidate as decoded from the detector output, in detection-frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl DetectionBox {
    pub fn new(cx: f32, cy: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            center: Point2::new(cx, cy),
            width,
            height,
            confidence,
        }
    }

    /// Center, size and confidence are all finite numbers.
    pub fn is_finite(&self) -> bool {
        self.center.x.is_finite()
            && self.center.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.confidence.is_finite()
    }

    /// Square box around the same center with side `max(width, height) * adjust`.
    pub fn squared(&self, adjust: f32) -> SquareBox {
        let side = self.width.max(self.height) * adjust;
        SquareBox {
            x: self.center.x - side * 0.5,
            y: self.center.y - side * 0.5,
            side,
        }
    }
}

/// Axis-aligned square `[x, x + side) x [y, y + side)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquareBox {
    pub x: f32,
    pub y: f32,
    pub side: f32,
}

impl SquareBox {
    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x + self.side * 0.5, self.y + self.side * 0.5)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.side * self.side
    }

    /// Same box expressed in a frame `factor` times larger.
    pub fn scaled(&self, factor: f32) -> SquareBox {
        SquareBox {
            x: self.x * factor,
            y: self.y * factor,
            side: self.side * factor,
        }
    }

    pub fn iou(&self, other: &SquareBox) -> f32 {
        let ix = ((self.x + self.side).min(other.x + other.side) - self.x.max(other.x)).max(0.0);
        let iy = ((self.y + self.side).min(other.y + other.side) - self.y.max(other.y)).max(0.0);
        let inter = ix * iy;
        let union = self.area() + other.area() - inter;
        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

/// Geometry of the square frame the detector ran on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Side of the detection frame in detection pixels.
    pub side: f32,
    /// Source-image pixels per detection pixel.
    pub scale: f32,
}

impl DetectionFrame {
    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.side * 0.5, self.side * 0.5)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorParams {
    /// Boxes below this confidence are dropped before NMS.
    pub confidence_threshold: f32,
    /// Boxes must score strictly above this to take part in NMS.
    pub score_threshold: f32,
    /// A box is suppressed when its IoU with a kept box exceeds this.
    pub nms_threshold: f32,
    /// Growth factor applied to the squared box side.
    pub box_adjust: f32,
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.20,
            score_threshold: 0.4,
            nms_threshold: 0.3,
            box_adjust: 1.2,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SelectError {
    #[error("no chessboard found ({candidates} candidates, none survived filtering)")]
    NoDetection { candidates: usize },
}

/// The board candidate chosen among the detector boxes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedRegion {
    /// Index of the chosen box in the detector output.
    pub index: usize,
    pub confidence: f32,
    /// Squared box in detection-frame pixels.
    pub frame_box: SquareBox,
    /// The same box in source-image pixels.
    pub image_box: SquareBox,
    /// Source-image pixels per detection pixel.
    pub scale: f32,
}

impl SelectedRegion {
    /// Integer crop rectangle of the selected box, clipped to a `width x height` image.
    pub fn roi(&self, width: usize, height: usize) -> RegionOfInterest {
        RegionOfInterest::from_box(&self.image_box, width, height)
    }
}

/// Integer crop rectangle in source-image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RegionOfInterest {
    /// Round a box to pixels and clip it to the image.
    pub fn from_box(b: &SquareBox, width: usize, height: usize) -> Self {
        let x0 = b.x.round();
        let y0 = b.y.round();
        let side = b.side.round();
        let x1 = (x0 + side).clamp(0.0, width as f32) as usize;
        let y1 = (y0 + side).clamp(0.0, height as f32) as usize;
        let x0 = x0.clamp(0.0, width as f32) as usize;
        let y0 = y0.clamp(0.0, height as f32) as usize;
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Offset that moves region-local coordinates into source-image coordinates.
    #[inline]
    pub fn origin(&self) -> Vector2<f32> {
        Vector2::new(self.x as f32, self.y as f32)
    }

    pub fn crop(&self, src: &GrayImageView<'_>) -> GrayImage {
        src.crop(self.x, self.y, self.width, self.height)
    }
}

/// Greedy IoU suppression. Returns indices into `boxes`, best first.
///
/// Only entries scoring strictly above `score_threshold` are eligible. Equal
/// confidences keep their input order.
pub fn non_max_suppression(
    boxes: &[(SquareBox, f32)],
    score_threshold: f32,
    nms_threshold: f32,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len())
        .filter(|&i| boxes[i].1 > score_threshold)
        .collect();
    order.sort_by(|&a, &b| boxes[b].1.total_cmp(&boxes[a].1));

    let mut keep: Vec<usize> = Vec::with_capacity(order.len());
    for i in order {
        let suppressed = keep
            .iter()
            .any(|&k| boxes[k].0.iou(&boxes[i].0) > nms_threshold);
        if !suppressed {
            keep.push(i);
        }
    }
    keep
}

/// Pick the board candidate closest to the center of the detection frame.
///
/// Boxes are squared and grown by `params.box_adjust`, filtered by confidence,
/// reduced by NMS, and the survivor whose center lies nearest the frame
/// center wins. Ties prefer the higher confidence, then the earlier box.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(boxes, params), fields(num_boxes = boxes.len()))
)]
pub fn select_board_region(
    boxes: &[DetectionBox],
    frame: DetectionFrame,
    params: &SelectorParams,
) -> Result<SelectedRegion, SelectError> {
    let candidates: Vec<(usize, SquareBox, f32)> = boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_finite() && b.confidence >= params.confidence_threshold)
        .map(|(i, b)| (i, b.squared(params.box_adjust), b.confidence))
        .collect();

    let scored: Vec<(SquareBox, f32)> = candidates.iter().map(|c| (c.1, c.2)).collect();
    let survivors = non_max_suppression(&scored, params.score_threshold, params.nms_threshold);
    debug!(
        "board selection: {} boxes, {} above confidence, {} after nms",
        boxes.len(),
        candidates.len(),
        survivors.len()
    );

    let mid = frame.center();
    let mut best: Option<(f32, f32, usize)> = None;
    for k in survivors {
        let (index, b, conf) = candidates[k];
        let d = distance(b.center(), mid);
        let better = match best {
            None => true,
            Some((bd, bc, bi)) => {
                let rank = d
                    .total_cmp(&bd)
                    .then(bc.total_cmp(&conf))
                    .then(index.cmp(&bi));
                rank == Ordering::Less
            }
        };
        if better {
            best = Some((d, conf, index));
        }
    }

    let Some((d, confidence, index)) = best else {
        return Err(SelectError::NoDetection {
            candidates: boxes.len(),
        });
    };

    let frame_box = boxes[index].squared(params.box_adjust);
    debug!("selected box #{index} (conf={confidence:.3}, {d:.1}px from frame center)");

    Ok(SelectedRegion {
        index,
        confidence,
        frame_box,
        image_box: frame_box.scaled(frame.scale),
        scale: frame.scale,
    })
}
