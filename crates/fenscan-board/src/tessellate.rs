//! Split a rectified board into 64 square tiles.
//!
//! Tile `i` covers row `i / 8` (row 0 is rank 8) and column `i % 8` (column 0
//! is file a). Each tile is the box-averaged square at `tile_px` resolution.

use serde::{Deserialize, Serialize};

use fenscan_core::{GrayImage, GrayImageView};

use crate::rectify::RectifiedBoard;

pub const BOARD_SQUARES: usize = 8;
pub const TILE_COUNT: usize = BOARD_SQUARES * BOARD_SQUARES;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellateParams {
    /// Side of each tile handed to the classifier.
    pub tile_px: usize,
}

impl Default for TessellateParams {
    fn default() -> Self {
        Self { tile_px: 32 }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TessellateError {
    #[error("board side {board_px} is not divisible into 8 squares of a multiple of {tile_px}px")]
    Configuration { board_px: usize, tile_px: usize },
    #[error("board image is {width}x{height}, expected {expected}x{expected}")]
    BoardSize {
        width: usize,
        height: usize,
        expected: usize,
    },
}

/// Borrowed square of the board, no pixels copied.
#[derive(Clone, Copy, Debug)]
pub struct SquareView<'a> {
    board: GrayImageView<'a>,
    x0: usize,
    y0: usize,
    side: usize,
}

impl<'a> SquareView<'a> {
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.board.get(self.x0 + x, self.y0 + y)
    }

    /// Box-average down by an integer `factor`.
    fn downsample(&self, factor: usize) -> GrayImage {
        let out_side = self.side / factor;
        let n = (factor * factor) as u32;
        let mut out = GrayImage::new(out_side, out_side);
        for ty in 0..out_side {
            for tx in 0..out_side {
                let mut sum = 0u32;
                for dy in 0..factor {
                    for dx in 0..factor {
                        sum += self.get(tx * factor + dx, ty * factor + dy) as u32;
                    }
                }
                out.put(tx, ty, ((sum + n / 2) / n) as u8);
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    /// 0 = rank 8.
    pub row: usize,
    /// 0 = file a.
    pub col: usize,
    pub image: GrayImage,
}

/// All 64 tiles of one board, rank 8 to rank 1, file a to file h.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSet {
    tiles: Vec<Tile>,
    tile_px: usize,
}

impl TileSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn tile_px(&self) -> usize {
        self.tile_px
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }
}

impl<'a> IntoIterator for &'a TileSet {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

/// Fixed board/tile geometry, validated once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tessellator {
    board_px: usize,
    square_px: usize,
    tile_px: usize,
}

impl Tessellator {
    pub fn new(board_px: usize, tile_px: usize) -> Result<Self, TessellateError> {
        let err = TessellateError::Configuration { board_px, tile_px };
        if board_px == 0 || tile_px == 0 || board_px % BOARD_SQUARES != 0 {
            return Err(err);
        }
        let square_px = board_px / BOARD_SQUARES;
        if square_px % tile_px != 0 {
            return Err(err);
        }
        Ok(Self {
            board_px,
            square_px,
            tile_px,
        })
    }

    #[inline]
    pub fn board_px(&self) -> usize {
        self.board_px
    }

    #[inline]
    pub fn square_px(&self) -> usize {
        self.square_px
    }

    #[inline]
    pub fn tile_px(&self) -> usize {
        self.tile_px
    }

    /// Square `index` (0..64) of a board image of the configured size.
    pub fn square<'a>(&self, board: GrayImageView<'a>, index: usize) -> SquareView<'a> {
        SquareView {
            board,
            x0: (index % BOARD_SQUARES) * self.square_px,
            y0: (index / BOARD_SQUARES) * self.square_px,
            side: self.square_px,
        }
    }

    pub fn tessellate_view(&self, board: GrayImageView<'_>) -> Result<TileSet, TessellateError> {
        if board.width != self.board_px || board.height != self.board_px {
            return Err(TessellateError::BoardSize {
                width: board.width,
                height: board.height,
                expected: self.board_px,
            });
        }

        let factor = self.square_px / self.tile_px;
        let tiles = (0..TILE_COUNT)
            .map(|index| Tile {
                index,
                row: index / BOARD_SQUARES,
                col: index % BOARD_SQUARES,
                image: self.square(board, index).downsample(factor),
            })
            .collect();

        Ok(TileSet {
            tiles,
            tile_px: self.tile_px,
        })
    }

    pub fn tessellate(&self, board: &RectifiedBoard) -> Result<TileSet, TessellateError> {
        self.tessellate_view(board.view())
    }
}
