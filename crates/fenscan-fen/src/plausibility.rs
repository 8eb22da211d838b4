//! Sanity checks on a scanned placement.
//!
//! A misclassified tile easily produces two white kings or a pawn on the back
//! rank. These findings are reported for the caller to log or display; they
//! never reject a board.

use std::fmt;

use serde::Serialize;

use crate::board::BoardField;
use crate::piece::{square_name, Color, PieceKind};

const MAX_PAWNS: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlausibilityWarning {
    KingCount { color: Color, count: usize },
    TooManyPawns { color: Color, count: usize },
    PawnOnBackRank { color: Color, square: String },
}

fn color_name(c: Color) -> &'static str {
    match c {
        Color::White => "white",
        Color::Black => "black",
    }
}

impl fmt::Display for PlausibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlausibilityWarning::KingCount { color, count } => {
                write!(f, "{} has {count} kings", color_name(*color))
            }
            PlausibilityWarning::TooManyPawns { color, count } => {
                write!(f, "{} has {count} pawns", color_name(*color))
            }
            PlausibilityWarning::PawnOnBackRank { color, square } => {
                write!(f, "{} pawn on {square}", color_name(*color))
            }
        }
    }
}

/// Findings for `board`, in a fixed order: kings, pawn counts, then pawns on
/// rank 1 or 8 by square.
pub fn check_plausibility(board: &BoardField) -> Vec<PlausibilityWarning> {
    let mut warnings = Vec::new();
    let count = |color: Color, kind: PieceKind| {
        board
            .pieces()
            .filter(|(_, p)| p.color == color && p.kind == kind)
            .count()
    };

    for color in [Color::White, Color::Black] {
        let kings = count(color, PieceKind::King);
        if kings != 1 {
            warnings.push(PlausibilityWarning::KingCount {
                color,
                count: kings,
            });
        }
    }
    for color in [Color::White, Color::Black] {
        let pawns = count(color, PieceKind::Pawn);
        if pawns > MAX_PAWNS {
            warnings.push(PlausibilityWarning::TooManyPawns {
                color,
                count: pawns,
            });
        }
    }
    for (index, piece) in board.pieces() {
        let back_rank = index < 8 || index >= 56;
        if back_rank && piece.kind == PieceKind::Pawn {
            if let Some(square) = square_name(index) {
                warnings.push(PlausibilityWarning::PawnOnBackRank {
                    color: piece.color,
                    square,
                });
            }
        }
    }
    warnings
}
