pub mod board;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod movement;
pub mod types;

pub use board::{AppliedMove, Position};
pub use game::{Game, GameSnapshot};
pub use movegen::{Rules, is_in_check};
pub use types::*;
