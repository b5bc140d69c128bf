use std::time::Duration;

use crate::engine::types::{CastlingPolicy, Difficulty};

/// Who plays black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Two humans share the terminal.
    Local,
    /// The human plays white against a move supplier.
    Computer,
}

/// Session configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Local two-player game or play against the computer.
    pub mode: PlayMode,
    /// UCI engine binary. `None` falls back to the random mover.
    pub engine_path: Option<String>,
    /// Computer strength.
    pub difficulty: Difficulty,
    /// Per-reply engine timeout in milliseconds.
    pub engine_timeout_ms: u64,
    /// How much of the castling rule is enforced.
    pub castling: CastlingPolicy,
    /// Seed for the random mover.
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            mode: match lookup("CHESS_MODE").as_deref().map(str::to_lowercase) {
                Some(m) if m == "computer" || m == "ai" => PlayMode::Computer,
                _ => defaults.mode,
            },
            engine_path: lookup("CHESS_ENGINE_PATH").filter(|p| !p.trim().is_empty()),
            difficulty: lookup("CHESS_DIFFICULTY")
                .and_then(|v| Difficulty::from_str_loose(&v))
                .unwrap_or(defaults.difficulty),
            engine_timeout_ms: lookup("CHESS_ENGINE_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.engine_timeout_ms),
            castling: lookup("CHESS_CASTLING")
                .and_then(|v| CastlingPolicy::from_str_loose(&v))
                .unwrap_or(defaults.castling),
            seed: lookup("CHESS_SEED").and_then(|v| v.parse().ok()),
        }
    }

    /// Engine timeout as a `Duration`.
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            mode: PlayMode::Local,
            engine_path: None,
            difficulty: Difficulty::Hard,
            engine_timeout_ms: 5000,
            castling: CastlingPolicy::Placement,
            seed: None,
        }
    }
}
