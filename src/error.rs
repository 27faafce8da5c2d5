use crate::cell::Identity;
use crate::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Board must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Too many mines ({mines}) for board size {width}x{height}")]
    TooManyMines {
        width: usize,
        height: usize,
        mines: usize,
    },
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("Cell at {pos:?} is already {have:?} and cannot become {want:?}")]
    ContradictoryIdentity {
        pos: Position,
        have: Identity,
        want: Identity,
    },
    #[error("Grid is contradictory: {0}")]
    InvalidGrid(&'static str),
    #[error("Propagation failed to settle after {rounds} rounds on:\n{grid}")]
    PropagationDiverged { rounds: usize, grid: String },
    #[error("Layout generation failed to settle after {steps} steps on:\n{grid}")]
    GenerationDiverged { steps: usize, grid: String },
    #[error("No consistent mine layout found in {attempts} attempts for:\n{grid}")]
    GenerationExhausted { attempts: usize, grid: String },
    #[error("Fixture line {line} does not match the width of the first line")]
    RaggedFixture { line: usize },
    #[error("Unrecognized fixture character {0:?}")]
    UnrecognizedFixtureChar(char),
    #[error("Game is already over")]
    GameOver,
    #[error("Game is still in progress")]
    StillPlaying,
}
