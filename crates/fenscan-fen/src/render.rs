use std::fmt::Write;

use crate::board::BoardField;

const EMPTY_GLYPH: char = '·';
const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// Text diagram of a placement with unicode pieces and coordinates.
///
/// With `flip` the board is seen from black's side: rank 1 on top and file h
/// on the left.
///
/// ```
/// use fenscan_fen::{render_board, BoardField};
///
/// let board = BoardField::parse("8/8/8/8/8/8/8/K7").unwrap();
/// let text = render_board(&board, false);
/// assert!(text.lines().nth(8).unwrap().starts_with("1 ♔ ·"));
/// ```
pub fn render_board(board: &BoardField, flip: bool) -> String {
    let order = |i: usize| if flip { 7 - i } else { i };
    let header: Vec<String> = (0..8).map(|i| FILES[order(i)].to_string()).collect();
    let header = format!("   {}", header.join("  "));

    let mut out = String::new();
    let _ = writeln!(out, "{header}");
    for i in 0..8 {
        let row = order(i);
        let rank_num = 8 - row;
        let squares: Vec<String> = (0..8)
            .map(|j| {
                board
                    .get(row * 8 + order(j))
                    .map_or(EMPTY_GLYPH, |p| p.glyph())
                    .to_string()
            })
            .collect();
        let _ = writeln!(out, "{rank_num} {} {rank_num}", squares.join(" "));
    }
    let _ = writeln!(out, "{header}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_diagram() {
        let board =
            BoardField::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").expect("valid");
        let text = render_board(&board, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "   a  b  c  d  e  f  g  h");
        assert_eq!(lines[1], "8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8");
        assert_eq!(lines[4], "5 · · · · · · · · 5");
        assert_eq!(lines[8], "1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ 1");
        assert_eq!(lines[9], lines[0]);
    }

    #[test]
    fn flipped_diagram_starts_at_rank_one() {
        let board = BoardField::parse("7k/8/8/8/8/8/8/K7").expect("valid");
        let text = render_board(&board, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "   h  g  f  e  d  c  b  a");
        assert_eq!(lines[1], "1 · · · · · · · ♔ 1");
        assert_eq!(lines[8], "8 ♚ · · · · · · · 8");
    }
}
