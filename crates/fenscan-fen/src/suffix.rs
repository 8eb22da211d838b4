//! The five FEN fields that follow the piece placement.
//!
//! A photo says nothing about move order or castling history, so the scanner
//! appends a fixed suffix. [`FenSuffix::default`] is `w KQkq - 0 1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{BoardField, FenParseError};
use crate::piece::square_index;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideToMove {
    #[default]
    White,
    Black,
}

impl SideToMove {
    pub fn symbol(self) -> char {
        match self {
            SideToMove::White => 'w',
            SideToMove::Black => 'b',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

impl CastlingRights {
    pub const fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::none()
    }

    /// Parse `KQkq`, any ordered subset of it, or `-`.
    pub fn parse(s: &str) -> Result<Self, FenParseError> {
        let invalid = || FenParseError::InvalidCastling(s.to_string());
        if s == "-" {
            return Ok(Self::none());
        }
        if s.is_empty() {
            return Err(invalid());
        }

        let mut rights = Self::none();
        let mut last = 0usize;
        for ch in s.chars() {
            let (slot, order) = match ch {
                'K' => (&mut rights.white_kingside, 1),
                'Q' => (&mut rights.white_queenside, 2),
                'k' => (&mut rights.black_kingside, 3),
                'q' => (&mut rights.black_queenside, 4),
                _ => return Err(invalid()),
            };
            if order <= last {
                return Err(invalid());
            }
            *slot = true;
            last = order;
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("-");
        }
        for (on, ch) in [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ] {
            if on {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FenSuffix {
    pub side_to_move: SideToMove,
    pub castling: CastlingRights,
    /// Target square such as `e3`, or `None` for `-`.
    pub en_passant: Option<String>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for FenSuffix {
    fn default() -> Self {
        Self {
            side_to_move: SideToMove::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

fn parse_en_passant(s: &str) -> Result<Option<String>, FenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let ok = square_index(s).is_some() && (s.ends_with('3') || s.ends_with('6'));
    if !ok {
        return Err(FenParseError::InvalidEnPassant(s.to_string()));
    }
    Ok(Some(s.to_string()))
}

fn parse_counter(s: &str) -> Result<u32, FenParseError> {
    s.parse()
        .map_err(|_| FenParseError::InvalidCounter(s.to_string()))
}

impl FenSuffix {
    fn from_fields(fields: &[&str]) -> Result<Self, FenParseError> {
        let [side, castling, ep, half, full] = fields else {
            return Err(FenParseError::FieldCount(fields.len()));
        };
        let side_to_move = match *side {
            "w" => SideToMove::White,
            "b" => SideToMove::Black,
            other => return Err(FenParseError::InvalidSideToMove(other.to_string())),
        };
        Ok(Self {
            side_to_move,
            castling: CastlingRights::parse(castling)?,
            en_passant: parse_en_passant(ep)?,
            halfmove_clock: parse_counter(half)?,
            fullmove_number: parse_counter(full)?,
        })
    }

    /// Check that the suffix renders to a well-formed FEN tail.
    pub fn validate(&self) -> Result<(), FenParseError> {
        if let Some(ep) = &self.en_passant {
            parse_en_passant(ep)?;
        }
        if self.fullmove_number == 0 {
            return Err(FenParseError::InvalidCounter("0".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for FenSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.side_to_move.symbol(),
            self.castling,
            self.en_passant.as_deref().unwrap_or("-"),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl FromStr for FenSuffix {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        Self::from_fields(&fields)
    }
}

/// A complete FEN record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fen {
    pub board: BoardField,
    pub suffix: FenSuffix,
}

impl Fen {
    pub fn new(board: BoardField, suffix: FenSuffix) -> Self {
        Self { board, suffix }
    }

    /// Parse a full record. A bare placement field is accepted and gets the
    /// default suffix.
    pub fn parse(s: &str) -> Result<Self, FenParseError> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let Some((placement, rest)) = fields.split_first() else {
            return Err(FenParseError::Empty);
        };
        let board = BoardField::parse(placement)?;
        let suffix = if rest.is_empty() {
            FenSuffix::default()
        } else {
            FenSuffix::from_fields(rest)?
        };
        Ok(Self { board, suffix })
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.board, self.suffix)
    }
}

impl FromStr for Fen {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
