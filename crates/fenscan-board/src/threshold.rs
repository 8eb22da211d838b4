//! Local-mean binarization used ahead of contour tracing.

use fenscan_core::{GrayImage, GrayImageView};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("threshold block size must be odd and at least 3, got {0}")]
    BlockSize(usize),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Side of the square averaging window. Must be odd and at least 3.
    pub block_size: usize,
    /// Offset subtracted from the local mean.
    pub offset: i32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            block_size: 9,
            offset: 3,
        }
    }
}

impl ThresholdParams {
    pub fn is_valid(&self) -> bool {
        self.block_size >= 3 && self.block_size % 2 == 1
    }
}

/// Inverted adaptive-mean threshold.
///
/// A pixel becomes 255 when it is at least `offset` darker than the rounded
/// mean of its `block_size` window, and 0 otherwise. Windows are extended past
/// the image edge by replicating the border row/column.
///
/// Fails with [`ThresholdError::BlockSize`] unless `block_size` is odd and at
/// least 3.
pub fn adaptive_threshold_mean_inv(
    src: &GrayImageView<'_>,
    params: &ThresholdParams,
) -> Result<GrayImage, ThresholdError> {
    if !params.is_valid() {
        return Err(ThresholdError::BlockSize(params.block_size));
    }
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return Ok(out);
    }

    let r = (params.block_size / 2) as isize;
    let side = 2 * r as u32 + 1;
    let count = side * side;
    let clamp = |v: isize, n: usize| v.clamp(0, n as isize - 1) as usize;

    // horizontal window sums with replicated border
    let mut row_sums = vec![0u32; w * h];
    for y in 0..h {
        let row = &src.data[y * w..(y + 1) * w];
        for x in 0..w {
            let xi = x as isize;
            row_sums[y * w + x] = (xi - r..=xi + r).map(|xx| row[clamp(xx, w)] as u32).sum();
        }
    }

    for y in 0..h {
        let yi = y as isize;
        for x in 0..w {
            let sum: u32 = (yi - r..=yi + r)
                .map(|yy| row_sums[clamp(yy, h) * w + x])
                .sum();
            let mean = ((sum + count / 2) / count) as i32;
            let v = src.data[y * w + x] as i32;
            if v - mean <= -params.offset {
                out.data[y * w + x] = 255;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_stays_black() {
        let img = GrayImage::from_raw(5, 4, vec![120; 20]).expect("valid");
        let bin = adaptive_threshold_mean_inv(&img.view(), &ThresholdParams::default())
            .expect("valid params");
        assert!(bin.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn dark_line_on_bright_background_is_marked() {
        let (w, h) = (15usize, 15usize);
        let mut img = GrayImage::from_raw(w, h, vec![200; w * h]).expect("valid");
        for x in 0..w {
            img.put(x, 7, 30);
        }
        let bin = adaptive_threshold_mean_inv(&img.view(), &ThresholdParams::default())
            .expect("valid params");
        for x in 0..w {
            assert_eq!(bin.get(x, 7), 255, "line pixel at x={x}");
            assert_eq!(bin.get(x, 2), 0);
            assert_eq!(bin.get(x, 6), 0);
        }
    }

    #[test]
    fn param_validation() {
        assert!(ThresholdParams::default().is_valid());
        assert!(!ThresholdParams {
            block_size: 4,
            offset: 3
        }
        .is_valid());
    }

    #[test]
    fn zero_and_even_blocks_are_rejected() {
        let img = GrayImage::from_raw(8, 8, vec![100; 64]).expect("valid");
        for block_size in [0, 1, 2, 8] {
            let params = ThresholdParams {
                block_size,
                offset: 3,
            };
            assert_eq!(
                adaptive_threshold_mean_inv(&img.view(), &params),
                Err(ThresholdError::BlockSize(block_size))
            );
        }
    }

    #[test]
    fn three_by_three_mean_uses_full_window() {
        // centre 0 inside 8 neighbours of 90: mean 80, so only the centre is marked
        let mut img = GrayImage::from_raw(3, 3, vec![90; 9]).expect("valid");
        img.put(1, 1, 0);
        let params = ThresholdParams {
            block_size: 3,
            offset: 3,
        };
        let bin = adaptive_threshold_mean_inv(&img.view(), &params).expect("valid params");
        assert_eq!(bin.get(1, 1), 255);
        assert_eq!(bin.get(0, 0), 0);
    }
}
