//! Core types and utilities for chessboard photo scanning.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about detection networks, classifiers or FEN; it provides grayscale image
//! buffers, sampling, homographies and the polygon helpers the board crate
//! builds on.

mod geometry;
mod homography;
mod image;
mod logger;

pub use geometry::{
    approximate_polygon, arc_length, distance, largest_contour_area, order_corners, polygon_area,
    CornerSet, GeometryError,
};
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{
    resize_area, sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, ImageBufferError,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
