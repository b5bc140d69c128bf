//! Stateful game controller wrapping Position.
//!
//! `Game` owns the board, whose turn it is and the status that follows from
//! both. It is the type the front end and the opponent suppliers talk to.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::board::{AppliedMove, Position};
use crate::engine::fen;
use crate::engine::movegen::{self, Rules};
use crate::engine::types::{ChessError, Color, GameStatus, Move, Square};

// =========================================================================
// GameSnapshot
// =========================================================================

/// Serialisable view of a game for display and logging.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: String,
    pub fen: String,
    pub turn: Color,
    pub status: GameStatus,
    pub in_check: bool,
    pub fullmove_number: u16,
    pub board: [[String; 8]; 8],
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// Game
// =========================================================================

/// One game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    side_to_move: Color,
    rules: Rules,
    status: GameStatus,
    fullmove_number: u16,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// New game from the starting position under the given rules.
    pub fn with_rules(rules: Rules) -> Self {
        Self::from_parts(Position::starting(), Color::White, 1, rules)
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str, rules: Rules) -> Result<Self, ChessError> {
        let record = fen::parse(fen)?;
        Ok(Self::from_parts(
            record.position,
            record.side_to_move,
            record.fullmove_number,
            rules,
        ))
    }

    fn from_parts(position: Position, side_to_move: Color, fullmove: u16, rules: Rules) -> Self {
        let status = rules.status(&position, side_to_move);
        Self {
            position,
            side_to_move,
            rules,
            status,
            fullmove_number: fullmove,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Status of the side to move.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Whether the game is over.
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Is the side to move in check?
    pub fn is_in_check(&self) -> bool {
        matches!(self.status, GameStatus::Check | GameStatus::Checkmate)
    }

    /// Winner, once the game has ended in checkmate.
    pub fn winner(&self) -> Option<Color> {
        (self.status == GameStatus::Checkmate).then_some(!self.side_to_move)
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Legal destinations for the piece on `from` (move hints).
    pub fn legal_moves(&self, from: Square) -> Vec<Square> {
        self.rules.legal_moves(&self.position, from)
    }

    /// Every legal move of the side to move.
    pub fn all_legal_moves(&self) -> Vec<Move> {
        self.rules
            .legal_moves_for(&self.position, self.side_to_move)
    }

    /// Whether `from` → `to` is a legal pawn move onto the far rank, so the
    /// caller must pick a promotion piece before calling `make_move`.
    pub fn needs_promotion(&self, from: Square, to: Square) -> bool {
        self.rules.is_promotion(&self.position, from, to)
            && self.rules.is_legal(&self.position, from, to)
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        fen::encode(&self.position, self.side_to_move, self.fullmove_number)
    }

    /// 8×8 array of piece tags ("wP", "bK", …), rank 8 first.
    pub fn board_array(&self) -> [[String; 8]; 8] {
        self.position.board_array()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id.clone(),
            fen: self.to_fen(),
            turn: self.side_to_move,
            status: self.status,
            in_check: self.is_in_check(),
            fullmove_number: self.fullmove_number,
            board: self.board_array(),
            created_at: self.created_at,
        }
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Play a move for the side to move.
    ///
    /// Returns `ChessError::GameOver` if the game is finished,
    /// `ChessError::NotYourTurn` if the origin holds the opponent's piece,
    /// and whatever `Rules::apply_move` rejects otherwise. A rejected move
    /// leaves the game untouched.
    pub fn make_move(&mut self, mv: Move) -> Result<AppliedMove, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }

        match self.position.piece_at(mv.from) {
            None => return Err(ChessError::illegal(mv, "no piece on origin square")),
            Some(p) if p.color != self.side_to_move => {
                return Err(ChessError::NotYourTurn(self.side_to_move));
            }
            Some(_) => {}
        }

        let applied = self.rules.apply_move(&mut self.position, mv)?;

        if self.side_to_move == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = !self.side_to_move;
        self.status = self.rules.status(&self.position, self.side_to_move);

        tracing::debug!(
            game_id = %self.id,
            mv = %mv,
            status = %self.status,
            "move applied"
        );

        Ok(applied)
    }

    /// Is `color`'s king in check in the current position?
    pub fn is_color_in_check(&self, color: Color) -> bool {
        movegen::is_in_check(&self.position, color)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
