//! Legality, check detection and legal-move enumeration.
//!
//! Pipeline for a single move:
//!   1. Geometry (`movement`): does the piece move like that on this board?
//!   2. Filter: make the move on a copy, verify the mover's king is not in
//!      check. The caller's position is never touched.
//!
//! Enumeration simply asks step 1+2 for all 64 destinations. That is plenty
//! for interactive play and hint rendering; it is not meant for search.

use crate::engine::board::{AppliedMove, Position};
use crate::engine::movement::{castling_side, is_geometric_move};
use crate::engine::types::{
    CastlingPolicy, ChessError, Color, GameStatus, Move, PieceType, Square,
};

// =========================================================================
// Check detection
// =========================================================================

/// Is `color`'s king attacked by any enemy piece?
///
/// Uses raw geometry for the attackers. A position without a king of
/// `color` is never in check.
pub fn is_in_check(pos: &Position, color: Color) -> bool {
    let Some(king) = pos.king_sq(color) else {
        return false;
    };
    pos.pieces(!color)
        .any(|(from, _)| is_geometric_move(pos, from, king))
}

// =========================================================================
// Rules
// =========================================================================

/// Rule configuration plus every operation that depends on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    pub castling: CastlingPolicy,
}

impl Rules {
    pub fn new(castling: CastlingPolicy) -> Self {
        Rules { castling }
    }

    /// Is moving the piece on `from` to `to` legal, including the self-check
    /// filter? Pure: `pos` is never modified.
    pub fn is_legal(&self, pos: &Position, from: Square, to: Square) -> bool {
        let Some(piece) = pos.piece_at(from) else {
            return false;
        };
        if !is_geometric_move(pos, from, to) {
            return false;
        }

        if self.castling == CastlingPolicy::Strict
            && let Some(side) = castling_side(pos, piece, from, to)
        {
            if !pos.castling_rights().can_castle(piece.color, side)
                || is_in_check(pos, piece.color)
            {
                return false;
            }
            // The square the king crosses must not be attacked either.
            let transit = Square::at(from.row(), side.transit_col());
            if leaves_king_in_check(pos, Move::new(from, transit), piece.color) {
                return false;
            }
        }

        !leaves_king_in_check(pos, Move::new(from, to), piece.color)
    }

    /// Every destination the piece on `from` may legally move to.
    pub fn legal_moves(&self, pos: &Position, from: Square) -> Vec<Square> {
        if pos.is_empty(from) {
            return Vec::new();
        }
        Square::all()
            .filter(|&to| self.is_legal(pos, from, to))
            .collect()
    }

    /// Every legal (from, to) pair for one colour. Promotion is left unset.
    pub fn legal_moves_for(&self, pos: &Position, color: Color) -> Vec<Move> {
        pos.pieces(color)
            .flat_map(|(from, _)| {
                self.legal_moves(pos, from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    /// Does `color` have at least one legal move? Stops at the first one.
    pub fn has_any_legal_move(&self, pos: &Position, color: Color) -> bool {
        pos.pieces(color)
            .any(|(from, _)| Square::all().any(|to| self.is_legal(pos, from, to)))
    }

    /// Status of `color` as the side to move.
    pub fn status(&self, pos: &Position, color: Color) -> GameStatus {
        let in_check = is_in_check(pos, color);
        match (in_check, self.has_any_legal_move(pos, color)) {
            (true, false) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Active,
        }
    }

    /// Does moving the piece on `from` to `to` land a pawn on its far rank?
    pub fn is_promotion(&self, pos: &Position, from: Square, to: Square) -> bool {
        matches!(
            pos.piece_at(from),
            Some(p) if p.kind == PieceType::Pawn && to.row() == p.color.promotion_row()
        )
    }

    /// Validate and apply a move.
    ///
    /// Every rejection happens before the board is touched.
    pub fn apply_move(&self, pos: &mut Position, mv: Move) -> Result<AppliedMove, ChessError> {
        if pos.is_empty(mv.from) {
            return Err(ChessError::illegal(mv, "no piece on origin square"));
        }
        if !self.is_legal(pos, mv.from, mv.to) {
            return Err(ChessError::illegal(mv, "not a legal move"));
        }

        match (self.is_promotion(pos, mv.from, mv.to), mv.promotion) {
            (true, None) => return Err(ChessError::PromotionRequired(mv.to.to_algebraic())),
            (true, Some(kind)) if !kind.is_promotion_choice() => {
                return Err(ChessError::InvalidPromotion(kind.to_string()));
            }
            (false, Some(kind)) => {
                return Err(ChessError::InvalidPromotion(format!(
                    "{kind} given for a move that does not promote"
                )));
            }
            _ => {}
        }

        pos.make_move(mv)
            .ok_or_else(|| ChessError::illegal(mv, "no piece on origin square"))
    }
}

/// Would `color`'s king be in check after moving the piece on `mv.from` to
/// `mv.to` on a copy of `pos`?
///
/// Only that piece moves: a castling rook stays in its corner, so it cannot
/// shield the king's landing square.
fn leaves_king_in_check(pos: &Position, mv: Move, color: Color) -> bool {
    let mut copy = *pos;
    if let Some(piece) = copy.remove_piece(mv.from) {
        copy.put_piece(mv.to, piece);
    }
    is_in_check(&copy, color)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fen;
    use crate::engine::types::{CastlingRights, Piece};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        fen::parse(fen).unwrap().position
    }

    fn dests(rules: &Rules, p: &Position, from: &str) -> Vec<String> {
        let mut out: Vec<String> = rules
            .legal_moves(p, sq(from))
            .into_iter()
            .map(|s| s.to_algebraic())
            .collect();
        out.sort();
        out
    }

    const PLACEMENT: Rules = Rules {
        castling: CastlingPolicy::Placement,
    };
    const STRICT: Rules = Rules {
        castling: CastlingPolicy::Strict,
    };

    // -------------------------------------------------------------------
    // Starting position
    // -------------------------------------------------------------------

    #[test]
    fn starting_position_has_20_moves() {
        let p = Position::starting();
        assert_eq!(PLACEMENT.legal_moves_for(&p, Color::White).len(), 20);
        assert_eq!(PLACEMENT.legal_moves_for(&p, Color::Black).len(), 20);
    }

    #[test]
    fn starting_position_piece_counts() {
        let p = Position::starting();
        assert_eq!(dests(&PLACEMENT, &p, "e2"), ["e3", "e4"]);
        assert_eq!(dests(&PLACEMENT, &p, "b1"), ["a3", "c3"]);
        assert_eq!(dests(&PLACEMENT, &p, "g8"), ["f6", "h6"]);
        assert!(dests(&PLACEMENT, &p, "e1").is_empty());
        assert!(dests(&PLACEMENT, &p, "d8").is_empty());
    }

    #[test]
    fn legal_moves_from_empty_square() {
        assert!(PLACEMENT
            .legal_moves(&Position::starting(), sq("e4"))
            .is_empty());
    }

    // -------------------------------------------------------------------
    // Self-check filter
    // -------------------------------------------------------------------

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // White knight on e2 pinned by the rook on e8.
        let p = pos("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(dests(&PLACEMENT, &p, "e2").is_empty());
    }

    #[test]
    fn must_escape_check() {
        let p = pos("4k3/8/8/8/8/8/8/R3K2q w Q - 0 1");
        assert!(is_in_check(&p, Color::White));
        for mv in PLACEMENT.legal_moves_for(&p, Color::White) {
            let mut copy = p;
            copy.make_move(mv);
            assert!(!is_in_check(&copy, Color::White), "{mv} leaves king in check");
        }
        // The rook on a1 cannot help: only king moves remain.
        assert!(dests(&PLACEMENT, &p, "a1").is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let p = pos("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        // d2 rook covers d1, e2 and the whole second rank; capturing it is fine.
        assert_eq!(dests(&PLACEMENT, &p, "e1"), ["d2", "f1"]);
    }

    #[test]
    fn is_legal_never_mutates() {
        let p = pos("r3k2r/pppq1ppp/8/3Pp3/8/8/PPP2PPP/R3K2R w KQkq - 0 1");
        let before = p;
        for from in Square::all() {
            for to in Square::all() {
                PLACEMENT.is_legal(&p, from, to);
                STRICT.is_legal(&p, from, to);
            }
        }
        assert_eq!(p, before);
    }

    // -------------------------------------------------------------------
    // Check detection
    // -------------------------------------------------------------------

    #[test]
    fn check_by_each_piece_kind() {
        assert!(is_in_check(&pos("4k3/3P4/8/8/8/8/8/4K3 w - - 0 1"), Color::Black));
        assert!(is_in_check(&pos("4k3/8/3N4/8/8/8/8/4K3 w - - 0 1"), Color::Black));
        assert!(is_in_check(&pos("4k3/8/8/8/B7/8/8/4K3 w - - 0 1"), Color::Black));
        assert!(is_in_check(&pos("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1"), Color::Black));
        assert!(!is_in_check(&pos("4k3/8/8/8/8/8/8/Q3K3 b - - 0 1"), Color::Black));
        assert!(is_in_check(&pos("4k3/8/8/8/8/8/8/4K2q w - - 0 1"), Color::White));
    }

    #[test]
    fn pawn_does_not_check_straight_ahead() {
        assert!(!is_in_check(&pos("8/8/8/4k3/4P3/8/8/4K3 w - - 0 1"), Color::Black));
    }

    #[test]
    fn blocked_slider_does_not_check() {
        assert!(!is_in_check(&pos("4k3/4p3/8/8/8/8/8/4R1K1 w - - 0 1"), Color::Black));
    }

    #[test]
    fn missing_king_is_never_in_check() {
        let p = pos("8/8/8/8/8/8/8/q6R w - - 0 1");
        assert!(!is_in_check(&p, Color::White));
        assert!(!is_in_check(&p, Color::Black));
    }

    // -------------------------------------------------------------------
    // Terminal states
    // -------------------------------------------------------------------

    #[test]
    fn fools_mate_is_checkmate() {
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(is_in_check(&p, Color::White));
        assert!(!PLACEMENT.has_any_legal_move(&p, Color::White));
        assert_eq!(PLACEMENT.status(&p, Color::White), GameStatus::Checkmate);
    }

    #[test]
    fn stalemate_detection() {
        let p = pos("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        assert!(!is_in_check(&p, Color::Black));
        assert_eq!(PLACEMENT.status(&p, Color::Black), GameStatus::Stalemate);
    }

    #[test]
    fn check_with_escape_is_check() {
        let p = pos("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1");
        assert_eq!(PLACEMENT.status(&p, Color::Black), GameStatus::Check);
        assert_eq!(
            PLACEMENT.status(&Position::starting(), Color::White),
            GameStatus::Active
        );
    }

    // -------------------------------------------------------------------
    // Castling
    // -------------------------------------------------------------------

    #[test]
    fn castling_both_sides() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        for rules in [PLACEMENT, STRICT] {
            assert!(rules.is_legal(&p, sq("e1"), sq("g1")));
            assert!(rules.is_legal(&p, sq("e1"), sq("c1")));
            assert!(rules.is_legal(&p, sq("e8"), sq("g8")));
            assert!(rules.is_legal(&p, sq("e8"), sq("c8")));
        }
    }

    #[test]
    fn castling_blocked() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K1NR w KQkq - 0 1");
        assert!(!PLACEMENT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!PLACEMENT.is_legal(&p, sq("e1"), sq("c1")));
    }

    #[test]
    fn placement_policy_castles_through_check() {
        // f8 rook attacks f1: only the strict policy refuses.
        let p = pos("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(PLACEMENT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(STRICT.is_legal(&p, sq("e1"), sq("c1")));
    }

    #[test]
    fn castling_into_check_is_refused_by_both() {
        let p = pos("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!PLACEMENT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("g1")));
    }

    #[test]
    fn strict_policy_refuses_castling_out_of_check() {
        let p = pos("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(PLACEMENT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("c1")));
    }

    #[test]
    fn castling_rook_does_not_shield_the_king() {
        // d1 rook checks along the back rank; the h1 rook would land on f1.
        let p = pos("4k3/8/8/8/8/8/8/3rK2R w K - 0 1");
        assert!(is_in_check(&p, Color::White));
        assert!(!PLACEMENT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("g1")));
    }

    #[test]
    fn castling_rook_does_not_shield_the_king_queenside() {
        let p = pos("4k3/8/8/8/8/8/8/R3Kr2 w Q - 0 1");
        assert!(is_in_check(&p, Color::White));
        assert!(!PLACEMENT.is_legal(&p, sq("e1"), sq("c1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("c1")));
        // Stepping out of the line is still fine.
        assert!(PLACEMENT.is_legal(&p, sq("e1"), sq("d2")));
    }

    #[test]
    fn strict_policy_needs_rights() {
        let p = pos("4k3/8/8/8/8/8/8/R3K2R w Q - 0 1");
        assert!(PLACEMENT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(!STRICT.is_legal(&p, sq("e1"), sq("g1")));
        assert!(STRICT.is_legal(&p, sq("e1"), sq("c1")));
    }

    // -------------------------------------------------------------------
    // Application
    // -------------------------------------------------------------------

    #[test]
    fn apply_rejects_without_mutation() {
        let mut p = Position::starting();
        let before = p;
        assert!(PLACEMENT.apply_move(&mut p, Move::new(sq("e2"), sq("e5"))).is_err());
        assert!(PLACEMENT.apply_move(&mut p, Move::new(sq("e4"), sq("e5"))).is_err());
        assert!(PLACEMENT.apply_move(&mut p, Move::new(sq("e1"), sq("e2"))).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn apply_castling_relocates_rook() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let applied = PLACEMENT
            .apply_move(&mut p, Move::new(sq("e1"), sq("c1")))
            .unwrap();
        assert!(applied.castle.is_some());
        assert_eq!(p.piece_at(sq("d1")), Some(Piece::new(Color::White, PieceType::Rook)));
        assert!(p.is_empty(sq("a1")));
        assert!(p.is_empty(sq("e1")));
        assert!(!p.castling_rights().has(CastlingRights::WHITE_KINGSIDE));
    }

    #[test]
    fn apply_promotion_contract() {
        let mut p = pos("7k/P7/8/8/8/8/8/4K3 w - - 0 1");
        let before = p;
        assert_eq!(
            PLACEMENT.apply_move(&mut p, Move::new(sq("a7"), sq("a8"))),
            Err(ChessError::PromotionRequired("a8".into()))
        );
        assert!(matches!(
            PLACEMENT.apply_move(&mut p, Move::with_promotion(sq("a7"), sq("a8"), PieceType::King)),
            Err(ChessError::InvalidPromotion(_))
        ));
        assert!(matches!(
            PLACEMENT.apply_move(&mut p, Move::with_promotion(sq("e1"), sq("e2"), PieceType::Queen)),
            Err(ChessError::InvalidPromotion(_))
        ));
        assert_eq!(p, before);

        let applied = PLACEMENT
            .apply_move(&mut p, Move::with_promotion(sq("a7"), sq("a8"), PieceType::Rook))
            .unwrap();
        assert_eq!(applied.promoted, Some(PieceType::Rook));
        assert_eq!(p.piece_at(sq("a8")), Some(Piece::new(Color::White, PieceType::Rook)));
        assert!(p.is_empty(sq("a7")));
        // The new rook gives check along the eighth rank.
        assert!(is_in_check(&p, Color::Black));
    }

    #[test]
    fn no_en_passant() {
        // Black just played f7-f5; exf6 is not offered.
        let p = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(dests(&PLACEMENT, &p, "e5"), ["e6"]);
    }
}
