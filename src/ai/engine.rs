//! Move supplier trait and the built-in RandomAi.
//!
//! The `MoveSupplier` trait is the seam between the session and whatever
//! picks the computer's moves. Two implementations are provided:
//!   - `RandomAi`  — plays a random legal move; used when no engine is configured.
//!   - `UciEngine` — drives an external UCI process (see `ai::uci`).

use std::future::Future;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::game::Game;
use crate::engine::types::{Move, PieceType};

use super::EngineError;

// =========================================================================
// MoveSupplier trait
// =========================================================================

/// Anything that can pick a move for the side to move.
pub trait MoveSupplier {
    /// Choose a move for the current position of `game`.
    fn best_move(&mut self, game: &Game)
    -> impl Future<Output = Result<Move, EngineError>> + Send;

    /// Human-readable name for this supplier.
    fn name(&self) -> &str;
}

// =========================================================================
// RandomAi
// =========================================================================

/// Picks a uniformly random legal move.
pub struct RandomAi {
    rng: StdRng,
}

impl RandomAi {
    /// A fixed seed makes the move sequence reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn pick(&mut self, game: &Game) -> Result<Move, EngineError> {
        if game.is_game_over() {
            return Err(EngineError::NoMove);
        }
        let moves = game.all_legal_moves();
        let mut mv = *moves.choose(&mut self.rng).ok_or(EngineError::NoMove)?;
        if game.needs_promotion(mv.from, mv.to)
            && let Some(&kind) = PieceType::PROMOTIONS.choose(&mut self.rng)
        {
            mv.promotion = Some(kind);
        }
        Ok(mv)
    }
}

impl Default for RandomAi {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MoveSupplier for RandomAi {
    fn best_move(
        &mut self,
        game: &Game,
    ) -> impl Future<Output = Result<Move, EngineError>> + Send {
        let picked = self.pick(game);
        async move { picked }
    }

    fn name(&self) -> &str {
        "RandomAi"
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::movegen::Rules;
    use crate::engine::types::Square;

    #[tokio::test]
    async fn random_ai_returns_legal_move() {
        let game = Game::new();
        let mut ai = RandomAi::new(Some(7));
        let mv = ai.best_move(&game).await.unwrap();
        assert!(game.legal_moves(mv.from).contains(&mv.to));
        assert_eq!(mv.promotion, None);
    }

    #[tokio::test]
    async fn seeded_random_ai_is_reproducible() {
        let game = Game::new();
        let mut a = RandomAi::new(Some(42));
        let mut b = RandomAi::new(Some(42));
        for _ in 0..5 {
            assert_eq!(
                a.best_move(&game).await.unwrap(),
                b.best_move(&game).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn random_ai_names_a_promotion_piece() {
        // The lone pawn push is the only legal non-king option; repeat until
        // the supplier picks it.
        let game = Game::from_fen("k7/4P3/8/8/8/8/8/K7 w - - 0 1", Rules::default()).unwrap();
        let mut ai = RandomAi::new(Some(1));
        let e7 = Square::from_algebraic("e7").unwrap();
        let mut saw_promotion = false;
        for _ in 0..50 {
            let mv = ai.best_move(&game).await.unwrap();
            if mv.from == e7 {
                assert!(mv.promotion.is_some_and(PieceType::is_promotion_choice));
                saw_promotion = true;
            }
        }
        assert!(saw_promotion);
    }

    #[tokio::test]
    async fn random_ai_has_nothing_after_mate() {
        let game = Game::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            Rules::default(),
        )
        .unwrap();
        let mut ai = RandomAi::default();
        assert!(matches!(
            ai.best_move(&game).await,
            Err(EngineError::NoMove)
        ));
        assert_eq!(ai.name(), "RandomAi");
    }
}
