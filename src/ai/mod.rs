//! Computer opponents.
//!
//! The session hands a `Game` to a `MoveSupplier` and gets a move back. The
//! supplier never touches the board; the session applies whatever it returns
//! through the normal legality checks.

use std::time::Duration;

use crate::engine::types::ChessError;

pub mod engine;
pub mod uci;

pub use engine::{MoveSupplier, RandomAi};
pub use uci::UciEngine;

/// Errors raised while asking a computer opponent for a move.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("engine closed its output")]
    Closed,

    #[error("unexpected engine output: {0}")]
    Protocol(String),

    #[error("engine has no move to play")]
    NoMove,

    #[error(transparent)]
    Chess(#[from] ChessError),
}
