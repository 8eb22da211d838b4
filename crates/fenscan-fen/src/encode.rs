use serde::{Deserialize, Serialize};

use crate::board::BoardField;
use crate::piece::{Piece, EMPTY_LABEL, LABEL_COUNT};
use crate::suffix::FenSuffix;

pub const SQUARE_COUNT: usize = 64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("classification shape: expected 64 squares, got {0}")]
    SquareCount(usize),
    #[error("classification shape: square {square} has label {label}, alphabet has 13 labels")]
    LabelOutOfRange { square: usize, label: usize },
    #[error("classification shape: square {square} has {width} scores, expected 13")]
    ScoreWidth { square: usize, width: usize },
}

/// Classifier output for one board, in tile order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Classification {
    /// One label per square.
    Labels(Vec<usize>),
    /// One score row of [`LABEL_COUNT`] entries per square.
    Scores(Vec<Vec<f32>>),
}

impl Classification {
    pub fn len(&self) -> usize {
        match self {
            Classification::Labels(l) => l.len(),
            Classification::Scores(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve to labels, taking the argmax of score rows.
    pub fn into_labels(self) -> Result<Vec<usize>, EncodeError> {
        match self {
            Classification::Labels(l) => Ok(l),
            Classification::Scores(s) => labels_from_scores(&s),
        }
    }
}

/// Index of the highest score. The first maximum wins and NaN never wins
/// against a number.
fn argmax(row: &[f32]) -> usize {
    let key = |v: f32| if v.is_nan() { f32::NEG_INFINITY } else { v };
    let mut best = 0usize;
    for (i, &v) in row.iter().enumerate().skip(1) {
        if key(v) > key(row[best]) {
            best = i;
        }
    }
    best
}

/// Turn per-square score rows into labels.
pub fn labels_from_scores<R: AsRef<[f32]>>(rows: &[R]) -> Result<Vec<usize>, EncodeError> {
    rows.iter()
        .enumerate()
        .map(|(square, row)| {
            let row = row.as_ref();
            if row.len() != LABEL_COUNT {
                return Err(EncodeError::ScoreWidth {
                    square,
                    width: row.len(),
                });
            }
            Ok(argmax(row))
        })
        .collect()
}

/// Build the placement from 64 labels ordered rank 8 to rank 1, file a to h.
pub fn board_from_labels(labels: &[usize]) -> Result<BoardField, EncodeError> {
    if labels.len() != SQUARE_COUNT {
        return Err(EncodeError::SquareCount(labels.len()));
    }
    let mut board = BoardField::empty();
    for (square, &label) in labels.iter().enumerate() {
        if label == EMPTY_LABEL {
            continue;
        }
        let piece = Piece::from_label(label).ok_or(EncodeError::LabelOutOfRange { square, label })?;
        board.set(square, Some(piece));
    }
    Ok(board)
}

/// Full FEN string for 64 labels: placement, a space, then `suffix`.
pub fn encode_fen(labels: &[usize], suffix: &FenSuffix) -> Result<String, EncodeError> {
    let board = board_from_labels(labels)?;
    Ok(format!("{board} {suffix}"))
}
