//! FEN parsing and generation.
//!
//! The position tracks placement and castling rights only, so on output the
//! en-passant field is always `-` and the halfmove clock is always `0`. On
//! input both fields are syntax-checked and then dropped.

use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, ChessError, Color, Piece, PieceType, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The parts of a FEN record this crate keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FenRecord {
    pub position: Position,
    pub side_to_move: Color,
    pub fullmove_number: u16,
}

/// Parse a six-field FEN string.
///
/// Rejects malformed ranks, unknown piece letters and more than one king of
/// a colour. A missing king is accepted.
pub fn parse(fen: &str) -> Result<FenRecord, ChessError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(ChessError::InvalidFen(format!(
            "expected 6 fields, got {}",
            fields.len()
        )));
    }

    let mut position = Position::empty();

    // ----- Field 1: Piece placement -----
    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::InvalidFen(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (row, rank_str) in ranks.iter().enumerate() {
        let rank = 8 - row;
        let mut col: usize = 0;
        for ch in rank_str.chars() {
            if col > 7 {
                return Err(ChessError::InvalidFen(format!(
                    "too many squares in rank {rank}"
                )));
            }
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid empty count '{ch}' in rank {rank}"
                    )));
                }
                col += digit as usize;
            } else if let Some((color, kind)) = PieceType::from_char(ch) {
                let sq = Square::at(row as u8, col as u8);
                position.put_piece(sq, Piece::new(color, kind));
                col += 1;
            } else {
                return Err(ChessError::InvalidFen(format!(
                    "invalid character '{ch}' in piece placement"
                )));
            }
        }
        if col != 8 {
            return Err(ChessError::InvalidFen(format!(
                "rank {rank} has {col} squares instead of 8"
            )));
        }
    }

    for color in [Color::White, Color::Black] {
        let kings = position
            .pieces(color)
            .filter(|(_, p)| p.kind == PieceType::King)
            .count();
        if kings > 1 {
            return Err(ChessError::InvalidFen(format!(
                "{color} has {kings} kings (expected at most 1)"
            )));
        }
    }

    // ----- Field 2: Side to move -----
    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => {
            return Err(ChessError::InvalidFen(format!(
                "invalid side to move: '{other}'"
            )));
        }
    };

    // ----- Field 3: Castling availability -----
    let rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
        ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
    })?;
    position.set_castling_rights(rights);

    // ----- Field 4: En passant target square (not tracked) -----
    if fields[3] != "-" && Square::from_algebraic(fields[3]).is_none() {
        return Err(ChessError::InvalidFen(format!(
            "invalid en passant square: '{}'",
            fields[3]
        )));
    }

    // ----- Field 5: Halfmove clock (not tracked) -----
    fields[4].parse::<u16>().map_err(|_| {
        ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
    })?;

    // ----- Field 6: Fullmove number -----
    let fullmove_number = fields[5].parse::<u16>().map_err(|_| {
        ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
    })?;
    if fullmove_number == 0 {
        return Err(ChessError::InvalidFen(
            "fullmove number must be >= 1".to_string(),
        ));
    }

    Ok(FenRecord {
        position,
        side_to_move,
        fullmove_number,
    })
}

/// Export a position as FEN.
pub fn encode(position: &Position, side_to_move: Color, fullmove_number: u16) -> String {
    let mut fen = String::with_capacity(80);

    // ----- Field 1: Piece placement -----
    for row in 0..8u8 {
        let mut empty_count = 0u8;
        for col in 0..8u8 {
            match position.piece_at(Square::at(row, col)) {
                Some(piece) => {
                    if empty_count > 0 {
                        fen.push((b'0' + empty_count) as char);
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                }
                None => empty_count += 1,
            }
        }
        if empty_count > 0 {
            fen.push((b'0' + empty_count) as char);
        }
        if row < 7 {
            fen.push('/');
        }
    }

    // ----- Fields 2-6 -----
    fen.push(' ');
    fen.push(side_to_move.to_fen_char());
    fen.push(' ');
    fen.push_str(&position.effective_castling_rights().to_fen());
    fen.push_str(" - 0 ");
    fen.push_str(&fullmove_number.max(1).to_string());

    fen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(fen: &str) -> String {
        let rec = parse(fen).unwrap();
        encode(&rec.position, rec.side_to_move, rec.fullmove_number)
    }

    #[test]
    fn starting_fen_matches_starting_position() {
        let rec = parse(STARTING_FEN).unwrap();
        assert_eq!(rec.position, Position::starting());
        assert_eq!(rec.side_to_move, Color::White);
        assert_eq!(rec.fullmove_number, 1);
        assert_eq!(encode(&Position::starting(), Color::White, 1), STARTING_FEN);
    }

    #[test]
    fn fen_round_trip_black_to_move() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        assert_eq!(round_trip(fen), fen);
    }

    #[test]
    fn fen_round_trip_endgame() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 12";
        assert_eq!(round_trip(fen), fen);
    }

    #[test]
    fn en_passant_and_clock_are_dropped() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 4 3";
        assert_eq!(
            round_trip(fen),
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3"
        );
    }

    #[test]
    fn castling_field_follows_placement() {
        // Rights claimed for a rook that is not there are not emitted.
        let fen = "4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1";
        assert_eq!(round_trip(fen), "4k3/8/8/8/8/8/8/4K2R w K - 0 1");
    }

    #[test]
    fn kingless_position_is_accepted() {
        let rec = parse("8/8/8/8/8/8/8/R7 w - - 0 1").unwrap();
        assert_eq!(rec.position.king_sq(Color::White), None);
    }

    #[test]
    fn fen_error_wrong_field_count() {
        assert!(matches!(
            parse("8/8/8/8/8/8/8/8 w - -"),
            Err(ChessError::InvalidFen(_))
        ));
    }

    #[test]
    fn fen_error_wrong_rank_count() {
        assert!(parse("8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn fen_error_bad_rank_width() {
        assert!(parse("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(parse("7/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(parse("ppppppppp/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn fen_error_invalid_piece_char() {
        assert!(parse("rnbqkbnx/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn fen_error_two_kings() {
        assert!(parse("4k3/8/8/8/8/8/8/K3K3 w - - 0 1").is_err());
    }

    #[test]
    fn fen_error_invalid_fields() {
        assert!(parse("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(parse("4k3/8/8/8/8/8/8/4K3 w KX - 0 1").is_err());
        assert!(parse("4k3/8/8/8/8/8/8/4K3 w - z9 0 1").is_err());
        assert!(parse("4k3/8/8/8/8/8/8/4K3 w - - x 1").is_err());
        assert!(parse("4k3/8/8/8/8/8/8/4K3 w - - 0 0").is_err());
    }
}
