use crate::Position;

/// A cell's resolved nature. Transitions away from `Unknown` at most once;
/// flipping between `Safe` and `Mine` is an invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Unknown,
    Safe,
    Mine,
}

/// One grid position's identity and clue. Plain `Copy` data so that grid
/// snapshots are a single wholesale array copy with no per-cell heap churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellState {
    pub x: i32,
    pub y: i32,
    pub identity: Identity,
    /// Flips false -> true at most once. A known mine may also be marked
    /// revealed during game-over disclosure.
    pub revealed: bool,
    /// Mine-neighbor count; meaningful only once `revealed` is set.
    pub number: u8,
    /// Why the identity was deduced, for explainability and debugging.
    pub reason: Option<&'static str>,
}

impl CellState {
    pub(crate) fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            identity: Identity::Unknown,
            revealed: false,
            number: 0,
            reason: None,
        }
    }

    /// The stand-in for out-of-bounds lookups: always safe, always revealed,
    /// so propagation never needs to special-case board edges.
    pub(crate) fn sentinel(pos: Position) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            identity: Identity::Safe,
            revealed: true,
            number: 0,
            reason: None,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn is_unknown(&self) -> bool {
        self.identity == Identity::Unknown
    }
}
