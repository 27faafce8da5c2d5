use itertools::iproduct;
use log::trace;
use ndarray::Array2;

use crate::cell::{CellState, Identity};
use crate::error::EngineError;
use crate::position::Position;

mod arbitrate;
mod fixture;
mod generate;
mod propagate;
mod reveal;

pub use propagate::Propagation;

/// The deduction grid. Mines have no fixed locations; each cell carries a
/// tri-state identity that is resolved lazily, always consistently with the
/// clues already shown. Deep-copying the grid yields an independent snapshot
/// used for hypothesis testing.
#[derive(Debug, Clone)]
pub struct LogicGrid {
    width: usize,
    height: usize,
    mine_count: usize,
    cells: Array2<CellState>,
    /// Mines not yet pinned to a cell. Together with `missing_safes` this
    /// always equals the number of unknown cells (on a valid grid).
    missing_mines: usize,
    missing_safes: usize,
    /// True once either counter hits zero: every remaining identity is forced.
    done: bool,
    /// Terminal. A grid that contradicts itself must not be used further.
    invalid: Option<&'static str>,
    /// Set exactly once, when an actual mine is revealed.
    failed: bool,
}

impl LogicGrid {
    pub fn new(width: usize, height: usize, mine_count: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        if mine_count > width * height {
            return Err(EngineError::TooManyMines {
                width,
                height,
                mines: mine_count,
            });
        }
        let cells = Array2::from_shape_fn((height, width), |(y, x)| {
            CellState::new(x as i32, y as i32)
        });
        let missing_safes = width * height - mine_count;
        Ok(Self {
            width,
            height,
            mine_count,
            cells,
            missing_mines: mine_count,
            missing_safes,
            done: mine_count == 0 || missing_safes == 0,
            invalid: None,
            failed: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn total_cells(&self) -> usize {
        self.width * self.height
    }

    pub fn missing_mines(&self) -> usize {
        self.missing_mines
    }

    pub fn missing_safes(&self) -> usize {
        self.missing_safes
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// The reason the grid went contradictory, if it did.
    pub fn invalid_reason(&self) -> Option<&'static str> {
        self.invalid
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    pub(crate) fn index(&self, pos: Position) -> (usize, usize) {
        (pos.y as usize, pos.x as usize)
    }

    /// Cell lookup. Out-of-bounds coordinates yield a sentinel that is safe
    /// and revealed, which spares every deduction rule from edge handling.
    pub fn cell(&self, pos: Position) -> CellState {
        if self.in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            CellState::sentinel(pos)
        }
    }

    /// All in-bounds coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width, self.height);
        iproduct!(0..height, 0..width).map(|(y, x)| Position::new(x as i32, y as i32))
    }

    /// The Moore neighborhood of `pos`, clipped to the board.
    pub fn neighbor_positions(&self, pos: Position) -> Vec<Position> {
        pos.neighbors().filter(|&p| self.in_bounds(p)).collect()
    }

    /// Unknown cells adjacent to at least one revealed clue: the cells any
    /// deduction or guess can actually say something about.
    pub fn boundary_cells(&self) -> Vec<Position> {
        self.positions()
            .filter(|&pos| {
                self.cell(pos).is_unknown()
                    && self.neighbor_positions(pos).iter().any(|&n| {
                        let cell = self.cell(n);
                        cell.revealed && cell.identity != Identity::Mine
                    })
            })
            .collect()
    }

    pub(crate) fn unknown_cells(&self) -> Vec<Position> {
        self.positions()
            .filter(|&pos| self.cell(pos).is_unknown())
            .collect()
    }

    pub fn unknown_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_unknown()).count()
    }

    pub(crate) fn is_untouched(&self) -> bool {
        self.cells.iter().all(|cell| !cell.revealed)
    }

    pub(crate) fn mark_invalid(&mut self, reason: &'static str) {
        if self.invalid.is_none() {
            trace!("grid went invalid: {reason}");
            self.invalid = Some(reason);
        }
    }

    /// Pin a cell as a mine. Contradicting an established identity is a
    /// fatal invariant violation; overrunning the mine budget marks the grid
    /// invalid instead, which is how doomed hypotheses are detected.
    pub(crate) fn make_mine(
        &mut self,
        pos: Position,
        reason: &'static str,
    ) -> Result<(), EngineError> {
        if !self.in_bounds(pos) {
            return Err(EngineError::OutOfBounds(pos));
        }
        match self.cell(pos).identity {
            Identity::Mine => return Ok(()),
            Identity::Safe => {
                return Err(EngineError::ContradictoryIdentity {
                    pos,
                    have: Identity::Safe,
                    want: Identity::Mine,
                })
            }
            Identity::Unknown => {}
        }
        let idx = self.index(pos);
        self.cells[idx].identity = Identity::Mine;
        self.cells[idx].reason = Some(reason);
        trace!("({}, {}) is a mine: {reason}", pos.x, pos.y);
        if self.missing_mines == 0 {
            self.mark_invalid("more mines forced than the board holds");
            return Ok(());
        }
        self.missing_mines -= 1;
        if self.missing_mines == 0 {
            self.done = true;
        }
        Ok(())
    }

    /// Pin a cell as safe. Mirror of [`LogicGrid::make_mine`].
    pub(crate) fn make_safe(
        &mut self,
        pos: Position,
        reason: &'static str,
    ) -> Result<(), EngineError> {
        if !self.in_bounds(pos) {
            return Err(EngineError::OutOfBounds(pos));
        }
        match self.cell(pos).identity {
            Identity::Safe => return Ok(()),
            Identity::Mine => {
                return Err(EngineError::ContradictoryIdentity {
                    pos,
                    have: Identity::Mine,
                    want: Identity::Safe,
                })
            }
            Identity::Unknown => {}
        }
        let idx = self.index(pos);
        self.cells[idx].identity = Identity::Safe;
        self.cells[idx].reason = Some(reason);
        trace!("({}, {}) is safe: {reason}", pos.x, pos.y);
        if self.missing_safes == 0 {
            self.mark_invalid("more safe cells forced than the board holds");
            return Ok(());
        }
        self.missing_safes -= 1;
        if self.missing_safes == 0 {
            self.done = true;
        }
        Ok(())
    }

    /// Verify a full assignment: every cell decided, exactly `mine_count`
    /// mines, and every revealed clue matching its actual mine neighbors.
    /// Revealed mines carry no clue and are only tallied.
    pub fn is_consistent(&self) -> bool {
        let mut mines = 0;
        for pos in self.positions() {
            let cell = self.cell(pos);
            match cell.identity {
                Identity::Mine => mines += 1,
                Identity::Unknown => return false,
                Identity::Safe => {
                    if cell.revealed {
                        let adjacent = self
                            .neighbor_positions(pos)
                            .iter()
                            .filter(|&&n| self.cell(n).identity == Identity::Mine)
                            .count();
                        if adjacent != cell.number as usize {
                            return false;
                        }
                    }
                }
            }
        }
        mines == self.mine_count
    }

    /// Recompute clue numbers for unrevealed cells from the current mine
    /// placement. Only meaningful on a fully assigned grid.
    pub(crate) fn update_numbers(&mut self) {
        for pos in self.positions() {
            if self.cell(pos).revealed {
                continue;
            }
            let count = self
                .neighbor_positions(pos)
                .iter()
                .filter(|&&n| self.cell(n).identity == Identity::Mine)
                .count();
            let idx = self.index(pos);
            self.cells[idx].number = count as u8;
        }
    }

    /// Take over identities from a generated layout and expose every mine,
    /// for full-board disclosure after a loss.
    pub(crate) fn adopt_layout(&mut self, layout: &LogicGrid) -> Result<(), EngineError> {
        for pos in self.positions() {
            if self.cell(pos).is_unknown() {
                match layout.cell(pos).identity {
                    Identity::Mine => self.make_mine(pos, "disclosed at game over")?,
                    _ => self.make_safe(pos, "disclosed at game over")?,
                }
            }
            if self.cell(pos).identity == Identity::Mine {
                let idx = self.index(pos);
                self.cells[idx].revealed = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_unknown() {
        let grid = LogicGrid::new(4, 3, 5).unwrap();
        assert_eq!(grid.unknown_count(), 12);
        assert_eq!(grid.missing_mines(), 5);
        assert_eq!(grid.missing_safes(), 7);
        assert!(!grid.is_done());
        assert!(grid.invalid_reason().is_none());
        assert!(!grid.has_failed());
    }

    #[test]
    fn test_construction_rejects_bad_parameters() {
        assert!(matches!(
            LogicGrid::new(0, 3, 0),
            Err(EngineError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            LogicGrid::new(3, 3, 10),
            Err(EngineError::TooManyMines { .. })
        ));
        // A fully mined board is legal to construct.
        assert!(LogicGrid::new(3, 3, 9).is_ok());
    }

    #[test]
    fn test_out_of_bounds_lookup_is_safe_sentinel() {
        let grid = LogicGrid::new(2, 2, 1).unwrap();
        for pos in [
            Position::new(-1, 0),
            Position::new(0, -1),
            Position::new(2, 0),
            Position::new(0, 2),
        ] {
            let cell = grid.cell(pos);
            assert_eq!(cell.identity, Identity::Safe);
            assert!(cell.revealed);
        }
    }

    #[test]
    fn test_neighbor_positions_clip_to_bounds() {
        let grid = LogicGrid::new(3, 3, 1).unwrap();
        assert_eq!(grid.neighbor_positions(Position::new(0, 0)).len(), 3);
        assert_eq!(grid.neighbor_positions(Position::new(1, 0)).len(), 5);
        assert_eq!(grid.neighbor_positions(Position::new(1, 1)).len(), 8);
    }

    #[test]
    fn test_counters_track_unknowns() {
        let mut grid = LogicGrid::new(3, 3, 2).unwrap();
        grid.make_mine(Position::new(0, 0), "test").unwrap();
        grid.make_safe(Position::new(1, 0), "test").unwrap();
        assert_eq!(
            grid.missing_mines() + grid.missing_safes(),
            grid.unknown_count()
        );
        assert_eq!(grid.missing_mines(), 1);
        assert_eq!(grid.missing_safes(), 6);
    }

    #[test]
    fn test_identity_is_monotonic() {
        let mut grid = LogicGrid::new(3, 3, 2).unwrap();
        let pos = Position::new(1, 1);
        grid.make_safe(pos, "test").unwrap();
        // Re-asserting the same identity is a no-op.
        grid.make_safe(pos, "again").unwrap();
        assert_eq!(grid.missing_safes(), 6);
        // Contradicting it is fatal.
        assert!(matches!(
            grid.make_mine(pos, "test"),
            Err(EngineError::ContradictoryIdentity { .. })
        ));
        assert_eq!(grid.cell(pos).identity, Identity::Safe);
    }

    #[test]
    fn test_overrunning_the_mine_budget_invalidates() {
        let mut grid = LogicGrid::new(2, 1, 1).unwrap();
        grid.make_mine(Position::new(0, 0), "test").unwrap();
        assert!(grid.is_done());
        grid.make_mine(Position::new(1, 0), "test").unwrap();
        assert!(grid.invalid_reason().is_some());
    }

    #[test]
    fn test_done_once_either_counter_hits_zero() {
        let mut grid = LogicGrid::new(2, 1, 1).unwrap();
        assert!(!grid.is_done());
        grid.make_safe(Position::new(0, 0), "test").unwrap();
        assert!(grid.is_done());
        // Degenerate mine counts are done from the start.
        assert!(LogicGrid::new(2, 2, 0).unwrap().is_done());
        assert!(LogicGrid::new(2, 2, 4).unwrap().is_done());
    }

    #[test]
    fn test_boundary_cells_require_a_revealed_neighbor() {
        let mut grid = LogicGrid::new(3, 3, 1).unwrap();
        assert!(grid.boundary_cells().is_empty());
        let corner = Position::new(0, 0);
        grid.make_safe(corner, "test").unwrap();
        let idx = grid.index(corner);
        grid.cells[idx].revealed = true;
        let boundary = grid.boundary_cells();
        assert_eq!(boundary.len(), 3);
        assert!(boundary.contains(&Position::new(1, 0)));
        assert!(boundary.contains(&Position::new(0, 1)));
        assert!(boundary.contains(&Position::new(1, 1)));
    }

    #[test]
    fn test_snapshots_do_not_alias() {
        let mut grid = LogicGrid::new(3, 3, 2).unwrap();
        let snapshot = grid.clone();
        grid.make_mine(Position::new(0, 0), "test").unwrap();
        assert!(snapshot.cell(Position::new(0, 0)).is_unknown());
        assert_eq!(snapshot.missing_mines(), 2);
    }
}
