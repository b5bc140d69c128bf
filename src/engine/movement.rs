//! Per-piece movement geometry.
//!
//! These checks answer "does this piece move like that on this board", and
//! nothing more: whether the move leaves the mover's own king in check is
//! decided one layer up in `movegen`. Check detection calls straight into
//! this module so it never recurses through the self-check filter.

use crate::engine::board::Position;
use crate::engine::types::{CastleSide, Color, Piece, PieceType, Square};

/// Does the piece on `from` move to `to` by its own pattern?
///
/// False when `from` is empty or `to` holds a piece of the mover's colour.
pub fn is_geometric_move(pos: &Position, from: Square, to: Square) -> bool {
    let Some(piece) = pos.piece_at(from) else {
        return false;
    };
    if pos.is_color(to, piece.color) {
        return false;
    }

    let dr = to.row() as i32 - from.row() as i32;
    let dc = to.col() as i32 - from.col() as i32;

    match piece.kind {
        PieceType::Pawn => pawn_pattern(pos, piece.color, from, to, dr, dc),
        PieceType::Knight => matches!((dr.abs(), dc.abs()), (2, 1) | (1, 2)),
        PieceType::Bishop => is_diagonal(dr, dc) && path_clear(pos, from, to),
        PieceType::Rook => is_straight(dr, dc) && path_clear(pos, from, to),
        PieceType::Queen => {
            (is_diagonal(dr, dc) || is_straight(dr, dc)) && path_clear(pos, from, to)
        }
        PieceType::King => {
            dr.abs().max(dc.abs()) == 1 || castling_side(pos, piece, from, to).is_some()
        }
    }
}

/// Is every square strictly between `from` and `to` empty?
///
/// Walks in unit steps taken from the sign of each delta, so it is only
/// meaningful for lines and diagonals.
pub fn path_clear(pos: &Position, from: Square, to: Square) -> bool {
    let step_r = (to.row() as i32 - from.row() as i32).signum();
    let step_c = (to.col() as i32 - from.col() as i32).signum();
    if step_r == 0 && step_c == 0 {
        return true;
    }

    let mut cur = from.offset(step_r, step_c);
    while let Some(sq) = cur {
        if sq == to {
            return true;
        }
        if !pos.is_empty(sq) {
            return false;
        }
        cur = sq.offset(step_r, step_c);
    }
    // Walked off the board: `to` was not on the line from `from`.
    false
}

/// Castling side for a king move, judged on piece placement alone.
///
/// The king must stand on its original square, the matching rook on its
/// corner, and every square between them must be empty.
pub fn castling_side(pos: &Position, king: Piece, from: Square, to: Square) -> Option<CastleSide> {
    let row = king.color.back_row();
    if king.kind != PieceType::King || from != Square::at(row, 4) || to.row() != row {
        return None;
    }
    let side = CastleSide::from_king_col(to.col())?;
    let (rook_col, _) = side.rook_cols();
    let rook = Square::at(row, rook_col);
    if pos.piece_at(rook) != Some(Piece::new(king.color, PieceType::Rook)) {
        return None;
    }
    path_clear(pos, from, rook).then_some(side)
}

fn pawn_pattern(pos: &Position, color: Color, from: Square, to: Square, dr: i32, dc: i32) -> bool {
    let dir = color.forward();
    let target_empty = pos.is_empty(to);

    if dc == 0 && dr == dir {
        return target_empty;
    }
    if dc == 0 && dr == 2 * dir {
        return from.row() == color.pawn_row()
            && target_empty
            && from.offset(dir, 0).is_some_and(|mid| pos.is_empty(mid));
    }
    // Diagonal step only onto an enemy piece (friendly was rejected earlier).
    dc.abs() == 1 && dr == dir && !target_empty
}

#[inline]
fn is_diagonal(dr: i32, dc: i32) -> bool {
    dr != 0 && dr.abs() == dc.abs()
}

#[inline]
fn is_straight(dr: i32, dc: i32) -> bool {
    (dr == 0) != (dc == 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
