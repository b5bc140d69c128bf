//! Parsing of terminal input lines.

use std::str::FromStr;

use crate::engine::types::{ChessError, Move, Square};

pub const HELP: &str = "\
Commands:
  e2e4, e7e8q    move (promotion letter q/r/b/n optional; asked for if missing)
  e2             click a square: select a piece, click again to move or drop it
  moves <sq>     show legal destinations of the piece on <sq>
  board          redraw the board
  fen            print the position as FEN
  state          print the game state as JSON
  restart        start a new game
  help           show this text
  quit           leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Select(Square),
    Moves(Square),
    Board,
    Fen,
    State,
    Restart,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no command given")]
    Empty,

    #[error("unknown command '{0}' (type help)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Chess(#[from] ChessError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_ascii_lowercase();
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(CommandError::Empty);
        };

        let command = match word {
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "?" => Command::Help,
            "board" => Command::Board,
            "fen" => Command::Fen,
            "state" => Command::State,
            "restart" | "new" => Command::Restart,
            "moves" => {
                let sq = words
                    .next()
                    .and_then(Square::from_algebraic)
                    .ok_or(CommandError::Usage("moves <square>, e.g. moves e2"))?;
                Command::Moves(sq)
            }
            w if w.len() == 2 => match Square::from_algebraic(w) {
                Some(sq) => Command::Select(sq),
                None => return Err(CommandError::Unknown(w.to_string())),
            },
            w if (w.len() == 4 || w.len() == 5)
                && w.get(0..2).and_then(Square::from_algebraic).is_some() =>
            {
                Command::Move(Move::from_uci(w)?)
            }
            w => return Err(CommandError::Unknown(w.to_string())),
        };

        if words.next().is_some() {
            return Err(CommandError::Unknown(line));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PieceType;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn parse_moves() {
        assert_eq!(
            "e2e4".parse::<Command>(),
            Ok(Command::Move(Move::new(sq("e2"), sq("e4"))))
        );
        assert_eq!(
            " E7E8Q ".parse::<Command>(),
            Ok(Command::Move(Move::with_promotion(
                sq("e7"),
                sq("e8"),
                PieceType::Queen
            )))
        );
        // An unusable promotion letter is dropped, the squares still count.
        assert_eq!(
            "e7e8k".parse::<Command>(),
            Ok(Command::Move(Move::new(sq("e7"), sq("e8"))))
        );
        assert!(matches!(
            "e2e9".parse::<Command>(),
            Err(CommandError::Chess(ChessError::InvalidSquare(_)))
        ));
    }

    #[test]
    fn parse_clicks_and_words() {
        assert_eq!("g1".parse::<Command>(), Ok(Command::Select(sq("g1"))));
        assert_eq!("moves b1".parse::<Command>(), Ok(Command::Moves(sq("b1"))));
        assert_eq!("board".parse::<Command>(), Ok(Command::Board));
        assert_eq!("FEN".parse::<Command>(), Ok(Command::Fen));
        assert_eq!("state".parse::<Command>(), Ok(Command::State));
        assert_eq!("new".parse::<Command>(), Ok(Command::Restart));
        assert_eq!("?".parse::<Command>(), Ok(Command::Help));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
        assert!(matches!("i9".parse::<Command>(), Err(CommandError::Unknown(_))));
        assert!(matches!("castle".parse::<Command>(), Err(CommandError::Unknown(_))));
        assert!(matches!("moves".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("moves z1".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("board now".parse::<Command>(), Err(CommandError::Unknown(_))));
    }
}
