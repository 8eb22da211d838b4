/// Errors raised when wrapping raw pixel buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageBufferError {
    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidLength { expected: usize, got: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap a row-major 8-bit buffer, checking that its length matches.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageBufferError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(ImageBufferError::InvalidLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Copy the rectangle `[x0, x0 + w) x [y0, y0 + h)`, clipped to the image.
    pub fn crop(&self, x0: usize, y0: usize, w: usize, h: usize) -> GrayImage {
        let x1 = x0.saturating_add(w).min(self.width);
        let y1 = y0.saturating_add(h).min(self.height);
        let x0 = x0.min(x1);
        let y0 = y0.min(y1);
        let out_w = x1 - x0;
        let out_h = y1 - y0;

        let mut data = Vec::with_capacity(out_w * out_h);
        for y in y0..y1 {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + x0..row + x1]);
        }
        GrayImage {
            width: out_w,
            height: out_h,
            data,
        }
    }

    pub fn to_owned_image(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Black image of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageBufferError> {
        GrayImageView::new(width, height, &data)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn put(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, ImageBufferError> {
    if width == 0 || height == 0 {
        return Err(ImageBufferError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(ImageBufferError::InvalidDimensions { width, height })
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).round().clamp(0.0, 255.0) as u8
}

/// Resample `src` to `out_w x out_h` by pixel-area averaging.
///
/// Every destination pixel is the coverage-weighted mean of the source pixels
/// its footprint overlaps, which is exact box averaging for integer
/// downscale factors. Upscaling axes fall back to bilinear sampling.
pub fn resize_area(src: &GrayImageView<'_>, out_w: usize, out_h: usize) -> GrayImage {
    if out_w == 0 || out_h == 0 || src.width == 0 || src.height == 0 {
        return GrayImage {
            width: out_w,
            height: out_h,
            data: vec![0; out_w * out_h],
        };
    }
    if out_w == src.width && out_h == src.height {
        return src.to_owned_image();
    }

    let sx = src.width as f64 / out_w as f64;
    let sy = src.height as f64 / out_h as f64;
    if sx < 1.0 || sy < 1.0 {
        return resize_bilinear(src, out_w, out_h, sx as f32, sy as f32);
    }

    let mut data = vec![0u8; out_w * out_h];
    for oy in 0..out_h {
        let fy0 = oy as f64 * sy;
        let fy1 = fy0 + sy;
        for ox in 0..out_w {
            let fx0 = ox as f64 * sx;
            let fx1 = fx0 + sx;

            let mut acc = 0.0f64;
            let mut wsum = 0.0f64;
            let mut y = fy0.floor() as usize;
            while (y as f64) < fy1 && y < src.height {
                let wy = (fy1.min(y as f64 + 1.0) - fy0.max(y as f64)).max(0.0);
                let mut x = fx0.floor() as usize;
                while (x as f64) < fx1 && x < src.width {
                    let wx = (fx1.min(x as f64 + 1.0) - fx0.max(x as f64)).max(0.0);
                    let w = wx * wy;
                    acc += w * src.get(x, y) as f64;
                    wsum += w;
                    x += 1;
                }
                y += 1;
            }

            data[oy * out_w + ox] = if wsum > 0.0 {
                (acc / wsum).round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data,
    }
}

fn resize_bilinear(
    src: &GrayImageView<'_>,
    out_w: usize,
    out_h: usize,
    sx: f32,
    sy: f32,
) -> GrayImage {
    let max_x = (src.width - 1) as f32;
    let max_y = (src.height - 1) as f32;
    let mut data = vec![0u8; out_w * out_h];
    for oy in 0..out_h {
        let y = ((oy as f32 + 0.5) * sy - 0.5).clamp(0.0, max_y);
        for ox in 0..out_w {
            let x = ((ox as f32 + 0.5) * sx - 0.5).clamp(0.0, max_x);
            data[oy * out_w + ox] = sample_bilinear_u8(src, x, y);
        }
    }
    GrayImage {
        width: out_w,
        height: out_h,
        data,
    }
}
