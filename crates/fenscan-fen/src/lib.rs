//! FEN side of the board scanner.
//!
//! Labels come in tile order (rank 8 to rank 1, file a to h) from the
//! 13-symbol alphabet `['', P, R, N, B, Q, K, p, r, n, b, q, k]`. They become a
//! [`BoardField`], whose `Display` is the compressed placement field, and get
//! a [`FenSuffix`] appended.
//!
//! ```
//! use fenscan_fen::{encode_fen, FenSuffix};
//!
//! let mut labels = [0usize; 64];
//! labels[7] = 1; // white pawn on h8
//! let fen = encode_fen(&labels, &FenSuffix::default()).unwrap();
//! assert_eq!(fen, "7P/8/8/8/8/8/8/8 w KQkq - 0 1");
//! ```

mod board;
mod encode;
mod piece;
mod plausibility;
mod render;
mod suffix;

pub use board::{BoardField, FenParseError};
pub use encode::{
    board_from_labels, encode_fen, labels_from_scores, Classification, EncodeError, SQUARE_COUNT,
};
pub use piece::{square_index, square_name, Color, Piece, PieceKind, EMPTY_LABEL, LABEL_COUNT};
pub use plausibility::{check_plausibility, PlausibilityWarning};
pub use render::render_board;
pub use suffix::{CastlingRights, Fen, FenSuffix, SideToMove};
