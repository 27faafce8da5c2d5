pub mod cell;
pub mod error;
pub mod game;
pub mod grid;
pub mod position;

pub use cell::{CellState, Identity};
pub use error::EngineError;
pub use game::{Game, GameState};
pub use grid::{LogicGrid, Propagation};
pub use position::Position;
