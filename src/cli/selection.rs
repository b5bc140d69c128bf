//! Click-style square selection.
//!
//! First click on one of the mover's pieces selects it, a second click on the
//! same square drops the selection, and a click anywhere else asks for a move.
//! The selection survives a rejected move so the player can try another
//! destination; the session clears it once a move is played.

use crate::engine::game::Game;
use crate::engine::types::{Move, Square};

/// Outcome of one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Click {
    /// A piece was picked up; `hints` are its legal destinations.
    Selected { from: Square, hints: Vec<Square> },
    /// The selected piece was put back.
    Cleared,
    /// The player asks to move the selected piece.
    Move(Move),
    /// Nothing selected and the square does not hold one of the mover's pieces.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
}

impl Selection {
    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Legal destinations of the selected piece, if any.
    pub fn hints(&self, game: &Game) -> Vec<Square> {
        self.selected
            .map(|from| game.legal_moves(from))
            .unwrap_or_default()
    }

    pub fn click(&mut self, game: &Game, sq: Square) -> Click {
        let own_piece = game.position().is_color(sq, game.side_to_move());
        match self.selected {
            Some(from) if from == sq => {
                self.selected = None;
                Click::Cleared
            }
            // Clicking another of one's own pieces switches the selection.
            _ if own_piece => {
                self.selected = Some(sq);
                Click::Selected {
                    from: sq,
                    hints: game.legal_moves(sq),
                }
            }
            Some(from) => Click::Move(Move::new(from, sq)),
            None => Click::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn select_shows_hints() {
        let game = Game::new();
        let mut sel = Selection::default();
        assert_eq!(
            sel.click(&game, sq("g1")),
            Click::Selected {
                from: sq("g1"),
                hints: vec![sq("f3"), sq("h3")]
            }
        );
        assert_eq!(sel.selected(), Some(sq("g1")));
        assert_eq!(sel.hints(&game), vec![sq("f3"), sq("h3")]);
    }

    #[test]
    fn empty_or_enemy_square_is_ignored() {
        let game = Game::new();
        let mut sel = Selection::default();
        assert_eq!(sel.click(&game, sq("e4")), Click::Ignored);
        assert_eq!(sel.click(&game, sq("e7")), Click::Ignored);
        assert_eq!(sel.selected(), None);
        assert!(sel.hints(&game).is_empty());
    }

    #[test]
    fn same_square_drops_selection() {
        let game = Game::new();
        let mut sel = Selection::default();
        sel.click(&game, sq("e2"));
        assert_eq!(sel.click(&game, sq("e2")), Click::Cleared);
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn other_square_requests_move_and_keeps_selection() {
        let game = Game::new();
        let mut sel = Selection::default();
        sel.click(&game, sq("e2"));
        assert_eq!(
            sel.click(&game, sq("e5")),
            Click::Move(Move::new(sq("e2"), sq("e5")))
        );
        assert_eq!(sel.selected(), Some(sq("e2")));
    }

    #[test]
    fn own_piece_switches_selection() {
        let game = Game::new();
        let mut sel = Selection::default();
        sel.click(&game, sq("e2"));
        assert!(matches!(
            sel.click(&game, sq("d2")),
            Click::Selected { from, .. } if from == sq("d2")
        ));
    }
}
