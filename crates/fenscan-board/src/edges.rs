//! Edge map used as the board detector input.

use serde::{Deserialize, Serialize};

use fenscan_core::{GrayImage, GrayImageView};

/// Hysteresis thresholds for Canny edge detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CannyThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for CannyThresholds {
    fn default() -> Self {
        Self {
            low: 128.0,
            high: 128.0,
        }
    }
}

impl CannyThresholds {
    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low >= 0.0 && self.low <= self.high
    }
}

/// Canny edge map of `src`: 255 on edges, 0 elsewhere.
pub fn canny_edges(src: &GrayImageView<'_>, thresholds: &CannyThresholds) -> GrayImage {
    if src.width == 0 || src.height == 0 {
        return GrayImage::new(src.width, src.height);
    }
    let Some(buf) =
        image::GrayImage::from_raw(src.width as u32, src.height as u32, src.data.to_vec())
    else {
        return GrayImage::new(src.width, src.height);
    };

    let edges = imageproc::edges::canny(&buf, thresholds.low, thresholds.high);
    GrayImage {
        width: src.width,
        height: src.height,
        data: edges.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_edge_is_marked_and_flat_areas_are_not() {
        let mut img = GrayImage::new(32, 32);
        for y in 0..32 {
            for x in 16..32 {
                img.put(x, y, 220);
            }
        }
        let edges = canny_edges(&img.view(), &CannyThresholds::default());
        assert!(edges.data.iter().all(|&v| v == 0 || v == 255));
        assert!((14..18).any(|x| edges.get(x, 16) == 255));
        assert_eq!(edges.get(4, 16), 0);
        assert_eq!(edges.get(28, 16), 0);
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = GrayImage::from_raw(16, 16, vec![77; 256]).expect("valid");
        let edges = canny_edges(&img.view(), &CannyThresholds::default());
        assert!(edges.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn threshold_validation() {
        assert!(CannyThresholds::default().is_valid());
        assert!(!CannyThresholds {
            low: 200.0,
            high: 100.0
        }
        .is_valid());
        assert!(!CannyThresholds {
            low: f32::NAN,
            high: 100.0
        }
        .is_valid());
    }
}
