//! Mailbox board representation.
//!
//! `Position` is a fixed-size `Copy` value: 64 optional pieces (row 0 = rank 8)
//! plus the castling rights still on the table. Legality checks simulate on a
//! copy, so nothing here ever needs to be undone.

use crate::engine::types::{CastleSide, CastlingRights, Color, Move, Piece, PieceType, Square};

// ---------------------------------------------------------------------------
// AppliedMove — what actually happened on the board
// ---------------------------------------------------------------------------

/// Side effects of a move that has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub castle: Option<CastleSide>,
    pub promoted: Option<PieceType>,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Piece placement plus castling availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    squares: [Option<Piece>; Square::NUM],
    castling_rights: CastlingRights,
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Position {
    /// Create an empty board with no pieces and no castling rights.
    pub fn empty() -> Self {
        Position {
            squares: [None; Square::NUM],
            castling_rights: CastlingRights::NONE,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut pos = Position::empty();
        for color in [Color::White, Color::Black] {
            for (col, kind) in BACK_RANK.into_iter().enumerate() {
                pos.put_piece(
                    Square::at(color.back_row(), col as u8),
                    Piece::new(color, kind),
                );
                pos.put_piece(
                    Square::at(color.pawn_row(), col as u8),
                    Piece::new(color, PieceType::Pawn),
                );
            }
        }
        pos.castling_rights = CastlingRights::ALL;
        pos
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place a piece, replacing whatever stood there.
    #[inline]
    pub fn put_piece(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = Some(piece);
    }

    /// Clear a square, returning its former occupant.
    #[inline]
    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    pub fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.castling_rights = rights;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    /// Is `sq` occupied by a piece of `color`?
    #[inline]
    pub fn is_color(&self, sq: Square, color: Color) -> bool {
        matches!(self.piece_at(sq), Some(p) if p.color == color)
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// Every occupied square of one colour, a8 first.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(p) if p.color == color => Some((sq, p)),
            _ => None,
        })
    }

    /// Square of `color`'s king, scanning a8 to h1. `None` if it is missing.
    pub fn king_sq(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceType::King);
        Square::all().find(|&sq| self.piece_at(sq) == Some(king))
    }

    /// Castling rights whose king and rook still stand on their home squares.
    pub fn effective_castling_rights(&self) -> CastlingRights {
        let mut rights = self.castling_rights;
        for color in [Color::White, Color::Black] {
            let row = color.back_row();
            let king_home = self.piece_at(Square::at(row, 4))
                == Some(Piece::new(color, PieceType::King));
            for side in [CastleSide::Kingside, CastleSide::Queenside] {
                let (rook_col, _) = side.rook_cols();
                let rook_home = self.piece_at(Square::at(row, rook_col))
                    == Some(Piece::new(color, PieceType::Rook));
                if !(king_home && rook_home) {
                    rights.remove(CastlingRights::flag(color, side));
                }
            }
        }
        rights
    }

    // -----------------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------------

    /// Apply a move without any legality check.
    ///
    /// The piece is relocated over whatever stood on the destination. A king
    /// moving two columns drags the rook from its corner to the square it
    /// crossed. A pawn landing on its far rank becomes `mv.promotion` when
    /// one is given. Castling rights touched by the move are dropped.
    ///
    /// Returns `None` (leaving the board as it was) when the origin is empty.
    pub(crate) fn make_move(&mut self, mv: Move) -> Option<AppliedMove> {
        let piece = self.remove_piece(mv.from)?;
        let captured = self.remove_piece(mv.to);
        self.put_piece(mv.to, piece);

        // ---- Castling: the rook follows unconditionally ----
        let mut castle = None;
        if piece.kind == PieceType::King && mv.from.col().abs_diff(mv.to.col()) == 2 {
            castle = CastleSide::from_king_col(mv.to.col());
            if let Some(side) = castle {
                let row = mv.to.row();
                let (rook_from, rook_to) = side.rook_cols();
                let rook = self.remove_piece(Square::at(row, rook_from));
                self.squares[Square::at(row, rook_to).index()] = rook;
            }
        }

        // ---- Promotion ----
        let mut promoted = None;
        if piece.kind == PieceType::Pawn
            && mv.to.row() == piece.color.promotion_row()
            && let Some(kind) = mv.promotion
        {
            self.put_piece(mv.to, Piece::new(piece.color, kind));
            promoted = Some(kind);
        }

        // ---- Update castling rights ----
        self.castling_rights.0 &= CASTLING_MASK[mv.from.index()];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.index()];

        Some(AppliedMove {
            mv,
            piece,
            captured,
            castle,
            promoted,
        })
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as text (rank 8 at top).
    pub fn board_string(&self) -> String {
        self.board_string_with_hints(&[])
    }

    /// Render the board, marking each hinted empty square with `*` and each
    /// hinted capture with the captured piece in brackets.
    pub fn board_string_with_hints(&self, hints: &[Square]) -> String {
        let mut s = String::with_capacity(300);
        for row in 0..8u8 {
            s.push((b'8' - row) as char);
            s.push(' ');
            for col in 0..8u8 {
                let sq = Square::at(row, col);
                let hinted = hints.contains(&sq);
                match (self.piece_at(sq), hinted) {
                    (Some(p), true) => {
                        s.push('[');
                        s.push(p.to_char());
                        s.push(']');
                    }
                    (Some(p), false) => {
                        s.push(' ');
                        s.push(p.to_char());
                        s.push(' ');
                    }
                    (None, true) => s.push_str(" * "),
                    (None, false) => s.push_str(" . "),
                }
            }
            s.push('\n');
        }
        s.push_str("   a  b  c  d  e  f  g  h");
        s
    }

    /// 8×8 array of piece tags, row 0 = rank 8. Empty squares are empty strings.
    pub fn board_array(&self) -> [[String; 8]; 8] {
        std::array::from_fn(|row| {
            std::array::from_fn(|col| {
                self.piece_at(Square::at(row as u8, col as u8))
                    .map(Piece::tag)
                    .unwrap_or_default()
            })
        })
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

/// Mask table indexed by square. When a move touches a square, AND the
/// castling rights with this mask: a king leaving home drops both of its
/// side's rights, a rook leaving (or captured on) its corner drops one.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    // a8 (0): black queenside
    mask[0]  = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    // e8 (4): both black rights
    mask[4]  = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    // h8 (7): black kingside
    mask[7]  = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    // a1 (56): white queenside
    mask[56] = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    // e1 (60): both white rights
    mask[60] = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    // h1 (63): white kingside
    mask[63] = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
