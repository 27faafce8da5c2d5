//! Session layer tying a [`LogicGrid`] to a random source and a win/loss
//! state machine. The grid itself never decides that a game is over; this
//! module watches it after every reveal.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cell::{CellState, Identity};
use crate::error::EngineError;
use crate::grid::LogicGrid;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// A single game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    grid: LogicGrid,
    rng: StdRng,
    state: GameState,
}

impl Game {
    /// Start a game with entropy from the OS.
    pub fn new(width: usize, height: usize, mine_count: usize) -> Result<Self, EngineError> {
        Self::build(width, height, mine_count, StdRng::from_entropy())
    }

    /// Start a game with a fixed seed. Two games with the same seed and the
    /// same sequence of reveals play out identically.
    pub fn with_seed(
        width: usize,
        height: usize,
        mine_count: usize,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::build(width, height, mine_count, StdRng::seed_from_u64(seed))
    }

    fn build(
        width: usize,
        height: usize,
        mine_count: usize,
        rng: StdRng,
    ) -> Result<Self, EngineError> {
        let grid = LogicGrid::new(width, height, mine_count)?;
        Ok(Game {
            grid,
            rng,
            state: GameState::Playing,
        })
    }

    pub fn grid(&self) -> &LogicGrid {
        &self.grid
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid.width(), self.grid.height())
    }

    pub fn cell(&self, pos: Position) -> CellState {
        self.grid.cell(pos)
    }

    /// Reveal a cell and update the win/loss state.
    pub fn reveal(&mut self, pos: Position) -> Result<GameState, EngineError> {
        if self.state != GameState::Playing {
            return Err(EngineError::GameOver);
        }
        self.grid.reveal(pos, &mut self.rng)?;
        if self.grid.has_failed() {
            self.state = GameState::Lost;
        } else if self.is_cleared() {
            self.state = GameState::Won;
        }
        Ok(self.state)
    }

    /// Every cell is either revealed or a mine: the player has won.
    fn is_cleared(&self) -> bool {
        self.grid.positions().all(|pos| {
            let cell = self.grid.cell(pos);
            cell.revealed || cell.identity == Identity::Mine
        })
    }

    /// After a loss, commit the remaining unknowns to one consistent layout
    /// and uncover every mine so the UI can show what was hit and missed.
    pub fn disclose_mines(&mut self) -> Result<(), EngineError> {
        if self.state != GameState::Lost {
            return Err(EngineError::StillPlaying);
        }
        let layout = self.grid.generate_assignment(&mut self.rng)?;
        self.grid.adopt_layout(&layout)?;
        Ok(())
    }
}
