//! Geometric stages of the board scanner.
//!
//! - [`select_board_region`] picks one detector box and maps it to source pixels,
//! - [`find_board_corners`] traces the board outline inside the cropped region,
//! - [`rectify_board`] warps the region to a square top-down image,
//! - [`Tessellator`] cuts that image into 64 classifier-sized tiles.
//!
//! Every stage is a pure function of its inputs.

mod corners;
mod edges;
mod rectify;
mod select;
mod tessellate;
mod threshold;

pub use corners::{find_board_corners, outer_contours, CornerError, CornerParams};
pub use edges::{canny_edges, CannyThresholds};
pub use rectify::{rectify_board, RectifiedBoard, RectifyError, RectifyParams};
pub use select::{
    non_max_suppression, select_board_region, DetectionBox, DetectionFrame, RegionOfInterest,
    SelectError, SelectedRegion, SelectorParams, SquareBox,
};
pub use tessellate::{
    SquareView, TessellateError, TessellateParams, Tessellator, Tile, TileSet, BOARD_SQUARES,
    TILE_COUNT,
};
pub use threshold::{adaptive_threshold_mean_inv, ThresholdError, ThresholdParams};
