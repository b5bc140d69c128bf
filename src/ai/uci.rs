//! UCI driver for an external engine process.
//!
//! Protocol subset used:
//!   uci → … uciok
//!   setoption name Skill Level value <n>
//!   isready → readyok
//!   position fen <fen>
//!   go depth <d> → … bestmove <move> [ponder <move>]
//!   quit

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::engine::game::Game;
use crate::engine::types::{Difficulty, Move, PieceType};

use super::EngineError;
use super::engine::MoveSupplier;

/// A running UCI engine.
pub struct UciEngine {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    difficulty: Difficulty,
    timeout: Duration,
}

impl UciEngine {
    /// Start `program`, complete the handshake and set the skill level.
    pub async fn spawn(
        program: &str,
        args: &[&str],
        difficulty: Difficulty,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = child.stdout.take().ok_or(EngineError::Closed)?;

        let mut engine = UciEngine {
            name: program.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            difficulty,
            timeout,
        };

        engine.send("uci").await?;
        loop {
            let line = engine.next_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                engine.name = name.trim().to_string();
            } else if line.trim() == "uciok" {
                break;
            }
        }

        engine
            .send(&format!(
                "setoption name Skill Level value {}",
                difficulty.skill_level()
            ))
            .await?;
        engine.send("isready").await?;
        while engine.next_line().await?.trim() != "readyok" {}

        info!(engine = %engine.name, %difficulty, "engine ready");
        Ok(engine)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Ask for a move in the position described by `fen`.
    pub async fn best_move_for_fen(&mut self, fen: &str) -> Result<Move, EngineError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {}", self.difficulty.search_depth()))
            .await?;
        loop {
            let line = self.next_line().await?;
            if let Some(result) = parse_bestmove(&line) {
                return result;
            }
        }
    }

    /// Send `quit` and wait briefly for the process to exit.
    pub async fn quit(mut self) -> Result<(), EngineError> {
        self.send("quit").await?;
        match tokio::time::timeout(self.timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(engine = %self.name, ?status, "engine exited");
            }
            Err(_) => {
                warn!(engine = %self.name, "engine ignored quit; killing");
                self.child.kill().await?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Line I/O
    // -----------------------------------------------------------------

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        debug!(engine = %self.name, command, "to engine");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self) -> Result<String, EngineError> {
        match tokio::time::timeout(self.timeout, self.stdout.next_line()).await {
            Err(_) => {
                warn!(engine = %self.name, timeout = ?self.timeout, "engine timed out");
                Err(EngineError::Timeout(self.timeout))
            }
            Ok(Ok(Some(line))) => Ok(line),
            Ok(Ok(None)) => Err(EngineError::Closed),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

impl MoveSupplier for UciEngine {
    fn best_move(
        &mut self,
        game: &Game,
    ) -> impl Future<Output = Result<Move, EngineError>> + Send {
        async move {
            if game.is_game_over() {
                return Err(EngineError::NoMove);
            }
            let mut mv = self.best_move_for_fen(&game.to_fen()).await?;
            // Engines normally append the piece letter; without one the
            // computer promotes to a queen.
            if mv.promotion.is_none() && game.needs_promotion(mv.from, mv.to) {
                mv.promotion = Some(PieceType::Queen);
            }
            Ok(mv)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse a `bestmove` line. `None` for any other line.
pub fn parse_bestmove(line: &str) -> Option<Result<Move, EngineError>> {
    let mut words = line.split_whitespace();
    if words.next() != Some("bestmove") {
        return None;
    }
    Some(match words.next() {
        None => Err(EngineError::Protocol(line.to_string())),
        Some("(none)") | Some("0000") => Err(EngineError::NoMove),
        Some(text) => Move::from_uci(text).map_err(EngineError::from),
    })
}

// =========================================================================
// Tests
// =========================================================================
