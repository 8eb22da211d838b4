use std::fmt;
use std::str::FromStr;

use crate::piece::Piece;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    #[error("empty FEN")]
    Empty,
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} covers {width} squares, expected 8")]
    RankWidth { rank: usize, width: usize },
    #[error("invalid piece symbol {0:?}")]
    InvalidPiece(char),
    #[error("invalid side to move {0:?}")]
    InvalidSideToMove(String),
    #[error("invalid castling field {0:?}")]
    InvalidCastling(String),
    #[error("invalid en passant square {0:?}")]
    InvalidEnPassant(String),
    #[error("invalid move counter {0:?}")]
    InvalidCounter(String),
    #[error("expected 5 fields after the board, found {0}")]
    FieldCount(usize),
}

/// Piece placement of a FEN record, square 0 = a8, square 63 = h1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoardField {
    squares: [Option<Piece>; 64],
}

impl Default for BoardField {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoardField {
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    pub fn from_squares(squares: [Option<Piece>; 64]) -> Self {
        Self { squares }
    }

    pub fn squares(&self) -> &[Option<Piece>; 64] {
        &self.squares
    }

    pub fn get(&self, index: usize) -> Option<Piece> {
        self.squares.get(index).copied().flatten()
    }

    /// Replace the content of square `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, piece: Option<Piece>) {
        if let Some(sq) = self.squares.get_mut(index) {
            *sq = piece;
        }
    }

    /// Occupied squares with their index.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
    }

    /// Row `row` (0 = rank 8) as eight squares from file a to h, or `None`
    /// past the last row.
    pub fn rank(&self, row: usize) -> Option<&[Option<Piece>]> {
        self.squares.chunks_exact(8).nth(row)
    }

    /// Parse a placement field such as `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    pub fn parse(s: &str) -> Result<Self, FenParseError> {
        if s.is_empty() {
            return Err(FenParseError::Empty);
        }
        let ranks: Vec<&str> = s.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenParseError::RankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for ch in rank.chars() {
                if let Some(run) = ch.to_digit(10) {
                    if run == 0 || run > 8 {
                        return Err(FenParseError::InvalidPiece(ch));
                    }
                    col += run as usize;
                } else {
                    let piece = Piece::from_symbol(ch).ok_or(FenParseError::InvalidPiece(ch))?;
                    if col < 8 {
                        board.squares[row * 8 + col] = Some(piece);
                    }
                    col += 1;
                }
                if col > 8 {
                    break;
                }
            }
            if col != 8 {
                return Err(FenParseError::RankWidth {
                    rank: 8 - row,
                    width: col,
                });
            }
        }
        Ok(board)
    }
}

impl fmt::Display for BoardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, rank) in self.squares.chunks_exact(8).enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }
            let mut run = 0u8;
            for sq in rank {
                match sq {
                    None => run += 1,
                    Some(piece) => {
                        if run > 0 {
                            write!(f, "{run}")?;
                            run = 0;
                        }
                        write!(f, "{}", piece.symbol())?;
                    }
                }
            }
            if run > 0 {
                write!(f, "{run}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for BoardField {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
