use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Row delta of a pawn step: white moves toward row 0, black toward row 7.
    #[inline]
    pub const fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row holding this side's king and rooks at the start.
    #[inline]
    pub const fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row the pawns start on (the only row a double step is allowed from).
    #[inline]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Farthest row from this side; a pawn arriving here promotes.
    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// FEN side-to-move letter.
    pub fn to_fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Capitalised name for status text ("White", "Black").
    pub fn title(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Kinds a pawn may promote to.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    #[inline]
    pub fn is_promotion_choice(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a FEN piece letter; the case carries the colour.
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }

    /// Parse a promotion letter (case-insensitive). Only N, B, R and Q qualify.
    pub fn from_promotion_char(c: char) -> Option<PieceType> {
        match PieceType::from_char(c) {
            Some((_, kind)) if kind.is_promotion_choice() => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A coloured piece. An empty square is `None`, never a `Piece`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }

    /// FEN letter for this piece.
    pub fn to_char(self) -> char {
        self.kind.to_char(self.color)
    }

    /// Two-letter tag such as "wP" or "bK".
    pub fn tag(self) -> String {
        let p = self.kind.to_char(Color::White);
        format!("{}{p}", self.color.to_fen_char())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the board, stored as `row * 8 + col`.
///
/// Row 0 is black's back rank (rank 8), row 7 is white's (rank 1); column 0
/// is the a-file. Only the checked constructors create squares, so every
/// `Square` is on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    /// Square from raw coordinates, `None` when off the board.
    #[inline]
    pub fn new(row: i32, col: i32) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square((row * 8 + col) as u8))
        } else {
            None
        }
    }

    /// Unchecked constructor for compile-time constants.
    pub(crate) const fn at(row: u8, col: u8) -> Self {
        Square(row * 8 + col)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.0 & 7
    }

    /// The square `(drow, dcol)` away, if it is on the board.
    #[inline]
    pub fn offset(self, drow: i32, dcol: i32) -> Option<Self> {
        Square::new(self.row() as i32 + drow, self.col() as i32 + dcol)
    }

    /// All 64 squares, a8 first, h1 last.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::NUM as u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if col < 8 && rank < 8 {
            Some(Square::at(7 - rank, col))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col()) as char;
        let rank = (b'8' - self.row()) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A proposed move: origin, destination and the promotion choice (only
/// meaningful when a pawn reaches the far rank).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Parse engine move text such as "e2e4" or "e7e8q".
    ///
    /// A fifth character never changes the squares. It becomes the promotion
    /// choice when it names a knight, bishop, rook or queen, and is dropped
    /// otherwise.
    pub fn from_uci(s: &str) -> Result<Self, ChessError> {
        let s = s.trim();
        let (Some(from), Some(to)) = (s.get(0..2), s.get(2..4)) else {
            return Err(ChessError::InvalidSquare(s.to_string()));
        };
        let from = Square::from_algebraic(from)
            .ok_or_else(|| ChessError::InvalidSquare(from.to_string()))?;
        let to =
            Square::from_algebraic(to).ok_or_else(|| ChessError::InvalidSquare(to.to_string()))?;
        let promotion = s[4..].chars().next().and_then(PieceType::from_promotion_char);
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char(Color::Black))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Castling
// ---------------------------------------------------------------------------

/// Which rook the king castles with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// (rook origin column, rook destination column).
    pub const fn rook_cols(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (7, 5),
            CastleSide::Queenside => (0, 3),
        }
    }

    /// Column the king crosses on its way.
    pub const fn transit_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// Side for a king landing on `col`, if that is a castling column.
    pub fn from_king_col(col: u8) -> Option<Self> {
        match col {
            6 => Some(CastleSide::Kingside),
            2 => Some(CastleSide::Queenside),
            _ => None,
        }
    }
}

/// Castling availability bitfield: bits 0-3 = WK, WQ, BK, BQ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Bit for one colour and side.
    pub const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queenside) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::Kingside) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn can_castle(self, color: Color, side: CastleSide) -> bool {
        self.has(Self::flag(color, side))
    }

    #[inline]
    pub fn remove(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        let mut rights = 0u8;
        for c in s.chars() {
            match c {
                'K' => rights |= Self::WHITE_KINGSIDE,
                'Q' => rights |= Self::WHITE_QUEENSIDE,
                'k' => rights |= Self::BLACK_KINGSIDE,
                'q' => rights |= Self::BLACK_QUEENSIDE,
                _ => return None,
            }
        }
        Some(CastlingRights(rights))
    }

    /// Convert to FEN castling string.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.has(flag) {
                s.push(c);
            }
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// How much of the castling rule is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CastlingPolicy {
    /// King and rook on their home squares with an empty path between them.
    /// Prior moves and attacked squares are not considered.
    #[default]
    Placement,
    /// Placement plus: neither piece has moved, the king is not in check and
    /// does not cross an attacked square.
    Strict,
}

impl CastlingPolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "placement" => Some(CastlingPolicy::Placement),
            "strict" => Some(CastlingPolicy::Strict),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// GameStatus & Difficulty
// ---------------------------------------------------------------------------

/// Status of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computer opponent strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Value sent as the engine's "Skill Level" option.
    pub fn skill_level(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 5,
            Difficulty::Hard => 10,
        }
    }

    /// Depth passed with `go depth`.
    pub fn search_depth(self) -> u32 {
        self.skill_level()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the rules engine and game session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("invalid move: {from} -> {to}: {reason}")]
    InvalidMove {
        from: String,
        to: String,
        reason: String,
    },

    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("pawn reaching {0} must name a promotion piece")]
    PromotionRequired(String),

    #[error("it is {0}'s turn")]
    NotYourTurn(Color),

    #[error("game is already over: {0}")]
    GameOver(String),
}

impl ChessError {
    pub(crate) fn illegal(mv: Move, reason: &str) -> Self {
        ChessError::InvalidMove {
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
