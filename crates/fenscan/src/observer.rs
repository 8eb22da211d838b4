use fenscan_board::{RectifiedBoard, RegionOfInterest, SelectedRegion, TileSet};
use fenscan_core::{CornerSet, GrayImage};

use crate::frame::PreparedFrame;

/// Read-only view into intermediate pipeline products, e.g. to dump debug
/// images. Every method defaults to a no-op and the pipeline behaves the same
/// with or without an observer.
pub trait PipelineObserver: Send + Sync {
    fn on_frame(&self, _frame: &PreparedFrame) {}

    fn on_region(&self, _region: &SelectedRegion, _roi: &RegionOfInterest, _crop: &GrayImage) {}

    /// Corners in region-local coordinates.
    fn on_corners(&self, _corners: &CornerSet) {}

    fn on_rectified(&self, _board: &RectifiedBoard) {}

    fn on_tiles(&self, _tiles: &TileSet) {}
}
