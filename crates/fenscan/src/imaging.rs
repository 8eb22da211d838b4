//! Interop with the `image` crate.

use std::path::Path;

use fenscan_core::{GrayImage, GrayImageView};

/// Borrow an `image::GrayImage` as a [`GrayImageView`].
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Luma conversion of any decoded image.
pub fn to_gray(img: &::image::DynamicImage) -> GrayImage {
    let luma = img.to_luma8();
    GrayImage {
        width: luma.width() as usize,
        height: luma.height() as usize,
        data: luma.into_raw(),
    }
}

/// Copy into an `image::GrayImage`, e.g. for saving.
pub fn to_image_buffer(img: &GrayImage) -> Option<::image::GrayImage> {
    ::image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
}

/// Decode a file and convert it to grayscale.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, ::image::ImageError> {
    let img = ::image::ImageReader::open(path)?.decode()?;
    Ok(to_gray(&img))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_round_trip_through_image_crate() {
        let img = GrayImage::from_raw(3, 2, vec![1, 2, 3, 4, 5, 6]).expect("valid");
        let buf = to_image_buffer(&img).expect("buffer");
        assert_eq!(buf.get_pixel(2, 1).0, [6]);

        let view = gray_view(&buf);
        assert_eq!(view.get(1, 0), 2);
        assert_eq!(to_gray(&::image::DynamicImage::ImageLuma8(buf)), img);
    }
}
