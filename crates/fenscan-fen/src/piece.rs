use serde::{Deserialize, Serialize};

/// Number of classifier labels: empty plus six white and six black pieces.
pub const LABEL_COUNT: usize = 13;
/// Label of an empty square.
pub const EMPTY_LABEL: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

/// Kinds in label order, `P R N B Q K`.
const LABEL_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
];

impl PieceKind {
    fn symbol(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    fn label_offset(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Rook => 1,
            PieceKind::Knight => 2,
            PieceKind::Bishop => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Piece for a classifier label. Labels 1-6 are white `P R N B Q K`,
    /// 7-12 black in the same order. Returns `None` for the empty label and
    /// for anything outside the alphabet.
    pub fn from_label(label: usize) -> Option<Self> {
        match label {
            1..=6 => Some(Self::new(Color::White, LABEL_KINDS[label - 1])),
            7..=12 => Some(Self::new(Color::Black, LABEL_KINDS[label - 7])),
            _ => None,
        }
    }

    pub fn label(self) -> usize {
        let base = match self.color {
            Color::White => 1,
            Color::Black => 7,
        };
        base + self.kind.label_offset()
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub fn symbol(self) -> char {
        let c = self.kind.symbol();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let lower = ch.to_ascii_lowercase();
        LABEL_KINDS
            .iter()
            .find(|k| k.symbol() == lower)
            .map(|&kind| Self::new(color, kind))
    }

    /// Unicode chess glyph.
    pub fn glyph(self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::King) => '♔',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::Black, PieceKind::King) => '♚',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Pawn) => '♟',
        }
    }
}

/// Algebraic name of board square `index` (0 = a8, 63 = h1).
pub fn square_name(index: usize) -> Option<String> {
    if index >= 64 {
        return None;
    }
    let file = (b'a' + (index % 8) as u8) as char;
    let rank = 8 - index / 8;
    Some(format!("{file}{rank}"))
}

/// Inverse of [`square_name`].
pub fn square_index(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let (file, rank) = (chars.next()?, chars.next()?);
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    let col = file as usize - 'a' as usize;
    let row = 8 - (rank as usize - '0' as usize);
    Some(row * 8 + col)
}
