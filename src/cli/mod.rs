//! Terminal front end.
//!
//! Reads one command per line, prints the board and status after every
//! change, and lets a `MoveSupplier` answer for black when one is given.
//! Input and output are generic so tests can script a whole session.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, info, warn};

use crate::ai::{EngineError, MoveSupplier};
use crate::engine::game::Game;
use crate::engine::movegen::Rules;
use crate::engine::types::{Color, GameStatus, Move, PieceType, Square};

pub mod commands;
pub mod selection;

pub use commands::{Command, CommandError, HELP};
pub use selection::{Click, Selection};

/// Errors that end a terminal session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("could not render game state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run a session until `quit` or end of input and return the final game.
///
/// With `opponent` set the human plays white and the supplier plays black;
/// without it both sides are entered at the terminal.
pub async fn run<R, W, S>(
    input: R,
    output: W,
    rules: Rules,
    opponent: Option<&mut S>,
) -> Result<Game, SessionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: MoveSupplier,
{
    let mut session = Session {
        lines: input.lines(),
        out: output,
        game: Game::with_rules(rules),
        rules,
        selection: Selection::default(),
    };
    session.play(opponent).await?;
    Ok(session.game)
}

/// Whether the loop should keep reading.
enum Flow {
    Continue,
    Quit,
}

struct Session<R, W> {
    lines: Lines<R>,
    out: W,
    game: Game,
    rules: Rules,
    selection: Selection,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn play<S: MoveSupplier>(
        &mut self,
        mut opponent: Option<&mut S>,
    ) -> Result<(), SessionError> {
        match opponent.as_deref() {
            Some(s) => {
                info!(
                    game_id = %self.game.id,
                    created_at = %self.game.created_at,
                    opponent = s.name(),
                    "session started"
                );
                self.say(&format!("You play White against {}.", s.name())).await?;
            }
            None => {
                info!(
                    game_id = %self.game.id,
                    created_at = %self.game.created_at,
                    "session started"
                );
                self.say("Local game: White and Black take turns.").await?;
            }
        }
        self.say("Type help for commands.").await?;
        self.show().await?;

        loop {
            if let Some(supplier) = opponent.as_deref_mut()
                && self.game.side_to_move() == Color::Black
                && !self.game.is_game_over()
            {
                self.computer_turn(supplier).await?;
                continue;
            }

            let prompt = format!("{}> ", self.game.side_to_move().title());
            self.write(&prompt).await?;
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            if let Flow::Quit = self.handle(&line).await? {
                break;
            }
        }

        info!(
            game_id = %self.game.id,
            status = %self.game.status(),
            "session ended"
        );
        Ok(())
    }

    async fn handle(&mut self, line: &str) -> Result<Flow, SessionError> {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => return Ok(Flow::Continue),
            Err(e) => {
                self.say(&e.to_string()).await?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => self.say(HELP).await?,
            Command::Board => self.show().await?,
            Command::Fen => {
                let fen = self.game.to_fen();
                self.say(&fen).await?;
            }
            Command::State => {
                let json = serde_json::to_string_pretty(&self.game.snapshot())?;
                self.say(&json).await?;
            }
            Command::Restart => {
                self.game = Game::with_rules(self.rules);
                self.selection.clear();
                info!(
                    game_id = %self.game.id,
                    created_at = %self.game.created_at,
                    "game restarted"
                );
                self.say("New game.").await?;
                self.show().await?;
            }
            Command::Moves(sq) => self.show_hints(sq).await?,
            Command::Select(sq) => return self.click(sq).await,
            Command::Move(mv) => {
                if self.playable().await? {
                    return self.human_move(mv).await;
                }
            }
        }
        Ok(Flow::Continue)
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    async fn click(&mut self, sq: Square) -> Result<Flow, SessionError> {
        if !self.playable().await? {
            return Ok(Flow::Continue);
        }
        match self.selection.click(&self.game, sq) {
            Click::Selected { from, hints } => {
                self.show().await?;
                if hints.is_empty() {
                    self.say(&format!("{from} has no legal moves.")).await?;
                }
            }
            Click::Cleared => self.show().await?,
            Click::Move(mv) => return self.human_move(mv).await,
            Click::Ignored => {
                let side = self.game.side_to_move().title();
                self.say(&format!("Select one of {side}'s pieces.")).await?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn human_move(&mut self, mut mv: Move) -> Result<Flow, SessionError> {
        if mv.promotion.is_none() && self.game.needs_promotion(mv.from, mv.to) {
            match self.ask_promotion().await? {
                Some(kind) => mv.promotion = Some(kind),
                None => return Ok(Flow::Quit),
            }
        }

        match self.game.make_move(mv) {
            Ok(_) => {
                self.selection.clear();
                self.show().await?;
            }
            Err(e) => {
                debug!(game_id = %self.game.id, mv = %mv, error = %e, "move rejected");
                self.say(&format!("Illegal move: {e}")).await?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Ask until the player names N, B, R or Q. `None` on end of input.
    async fn ask_promotion(&mut self) -> Result<Option<PieceType>, SessionError> {
        loop {
            self.write("Promote to (q/r/b/n): ").await?;
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            let mut chars = line.trim().chars();
            if let (Some(c), None) = (chars.next(), chars.next())
                && let Some(kind) = PieceType::from_promotion_char(c)
            {
                return Ok(Some(kind));
            }
            self.say("Choose q, r, b or n.").await?;
        }
    }

    async fn computer_turn<S: MoveSupplier>(
        &mut self,
        supplier: &mut S,
    ) -> Result<(), SessionError> {
        let mv = match supplier.best_move(&self.game).await {
            Ok(mv) => mv,
            Err(e) => {
                warn!(game_id = %self.game.id, engine = supplier.name(), error = %e, "engine failed");
                return Err(e.into());
            }
        };

        if let Err(e) = self.game.make_move(mv) {
            warn!(game_id = %self.game.id, mv = %mv, error = %e, "engine move rejected");
            return Err(EngineError::Chess(e).into());
        }
        self.say(&format!("Computer plays {mv}")).await?;
        self.show().await
    }

    /// False (after telling the player) once the game has ended.
    async fn playable(&mut self) -> Result<bool, SessionError> {
        if self.game.is_game_over() {
            self.say("The game is over. Type restart or quit.").await?;
            return Ok(false);
        }
        Ok(true)
    }

    // -----------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------

    async fn show(&mut self) -> Result<(), SessionError> {
        let hints = self.selection.hints(&self.game);
        let board = self.game.position().board_string_with_hints(&hints);
        self.say(&board).await?;
        let status = status_lines(&self.game);
        self.say(&status).await
    }

    async fn show_hints(&mut self, from: Square) -> Result<(), SessionError> {
        let hints = self.game.legal_moves(from);
        let board = self.game.position().board_string_with_hints(&hints);
        self.say(&board).await?;
        if hints.is_empty() {
            self.say(&format!("No legal moves from {from}.")).await
        } else {
            let list: Vec<String> = hints.iter().map(|s| s.to_algebraic()).collect();
            self.say(&format!("{from}: {}", list.join(" "))).await
        }
    }

    async fn say(&mut self, text: &str) -> Result<(), SessionError> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn write(&mut self, text: &str) -> Result<(), SessionError> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

/// `Turn: <color>` plus the check or result line.
pub fn status_lines(game: &Game) -> String {
    let turn = game.side_to_move();
    match game.status() {
        GameStatus::Active => format!("Turn: {}", turn.title()),
        GameStatus::Check => format!("Turn: {}\nCheck!", turn.title()),
        GameStatus::Checkmate => {
            format!("Checkmate! {} wins", (!turn).title())
        }
        GameStatus::Stalemate => "Stalemate! Draw".to_string(),
    }
}
