use log::{debug, trace};

use super::LogicGrid;
use crate::cell::Identity;
use crate::error::EngineError;
use crate::position::Position;

/// How far a deduction pass is allowed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    hypotheticals: bool,
    exhaustive: bool,
}

impl Propagation {
    /// Unit rules and the pigeonhole only. Used while randomly generating
    /// layouts, where case-splitting would be wasted work.
    pub fn local() -> Self {
        Self {
            hypotheticals: false,
            exhaustive: false,
        }
    }

    /// Case-splitting allowed, stopping at the first boundary cell it
    /// manages to decide. The ordinary-play mode.
    pub fn greedy() -> Self {
        Self {
            hypotheticals: true,
            exhaustive: false,
        }
    }

    /// Case-splitting over every boundary cell before giving up, with the
    /// nested passes allowed to split again. Needed wherever a definitive
    /// answer is required, i.e. click arbitration.
    pub fn exhaustive() -> Self {
        Self {
            hypotheticals: true,
            exhaustive: true,
        }
    }
}

/// Nested case-splits stop growing past this depth.
const MAX_SPLIT_DEPTH: u32 = 2;

pub(crate) const HYPOTHESIS: &str = "hypothesis under test";

impl LogicGrid {
    /// Run deductions to a fixpoint. An invalid grid is left as-is (the
    /// caller inspects `invalid_reason`); blowing the round cap means the
    /// solver itself failed to terminate and is a hard error.
    pub fn propagate(&mut self, mode: Propagation) -> Result<(), EngineError> {
        self.propagate_at(mode, 0)
    }

    fn propagate_at(&mut self, mode: Propagation, depth: u32) -> Result<(), EngineError> {
        if self.invalid.is_some() {
            return Ok(());
        }
        // Every round that continues has learned at least one identity, so
        // a correct fixpoint can never need more rounds than cells.
        let round_limit = self.total_cells() + 2;
        for round in 0..round_limit {
            let mut learned = self.unit_pass()?;
            if self.invalid.is_some() {
                return Ok(());
            }
            if mode.hypotheticals && !learned {
                learned = self.hypothesis_pass(mode, depth)?;
                if self.invalid.is_some() {
                    return Ok(());
                }
            }
            if self.pigeonhole_pass()? || self.invalid.is_some() {
                return Ok(());
            }
            if !learned {
                trace!("propagation settled after {} rounds", round + 1);
                return Ok(());
            }
        }
        Err(EngineError::PropagationDiverged {
            rounds: round_limit,
            grid: self.to_string(),
        })
    }

    /// Local unit propagation: each revealed clue either has all its mines
    /// (remaining neighbors are safe) or needs every remaining neighbor
    /// (they are all mines). A clue out of range invalidates the grid.
    fn unit_pass(&mut self) -> Result<bool, EngineError> {
        let mut learned = false;
        let clues: Vec<Position> = self
            .positions()
            .filter(|&pos| {
                let cell = self.cell(pos);
                cell.revealed && cell.identity != Identity::Mine
            })
            .collect();
        for pos in clues {
            let clue = self.cell(pos).number as i32;
            let neighbors = self.neighbor_positions(pos);
            let mut known_mines = 0;
            let mut known_safes = 0;
            let mut unknowns = Vec::new();
            for &n in &neighbors {
                match self.cell(n).identity {
                    Identity::Mine => known_mines += 1,
                    Identity::Safe => known_safes += 1,
                    Identity::Unknown => unknowns.push(n),
                }
            }
            let missing_mines = clue - known_mines;
            let missing_safes = (neighbors.len() as i32 - clue) - known_safes;
            if missing_mines < 0 || missing_safes < 0 {
                self.mark_invalid("a clue disagrees with its neighborhood");
                return Ok(learned);
            }
            if unknowns.is_empty() {
                continue;
            }
            if missing_mines == 0 {
                for n in unknowns {
                    self.make_safe(n, "its clue already has all of its mines")?;
                }
                learned = true;
            } else if missing_safes == 0 {
                for n in unknowns {
                    self.make_mine(n, "its clue needs every remaining neighbor")?;
                }
                learned = true;
            }
            if self.invalid.is_some() {
                return Ok(learned);
            }
        }
        Ok(learned)
    }

    /// Case-split every still-unknown boundary cell: whichever of the two
    /// forced snapshots collapses, the real cell must be the opposite. In
    /// greedy mode the pass returns as soon as it decides one cell.
    fn hypothesis_pass(&mut self, mode: Propagation, depth: u32) -> Result<bool, EngineError> {
        let nested = Propagation {
            hypotheticals: mode.exhaustive && depth < MAX_SPLIT_DEPTH,
            exhaustive: false,
        };
        let mut learned = false;
        for pos in self.boundary_cells() {
            if !self.cell(pos).is_unknown() {
                continue;
            }
            let mut if_mine = self.clone();
            if_mine.make_mine(pos, HYPOTHESIS)?;
            if_mine.propagate_at(nested, depth + 1)?;
            if if_mine.invalid.is_some() {
                self.make_safe(pos, "a mine here would contradict the visible clues")?;
                learned = true;
                if self.invalid.is_some() || !mode.exhaustive {
                    return Ok(learned);
                }
                continue;
            }
            let mut if_safe = self.clone();
            if_safe.make_safe(pos, HYPOTHESIS)?;
            if_safe.propagate_at(nested, depth + 1)?;
            if if_safe.invalid.is_some() {
                self.make_mine(pos, "marking this safe would contradict the visible clues")?;
                learned = true;
                if self.invalid.is_some() || !mode.exhaustive {
                    return Ok(learned);
                }
            }
        }
        Ok(learned)
    }

    /// Global pigeonhole: once one budget is spent, every remaining unknown
    /// cell takes the other identity. Firing ends propagation immediately.
    fn pigeonhole_pass(&mut self) -> Result<bool, EngineError> {
        if self.invalid.is_some() {
            return Ok(false);
        }
        if self.missing_safes == 0 && self.missing_mines > 0 {
            debug!("pigeonhole: {} unplaced mines fill the unknowns", self.missing_mines);
            for pos in self.unknown_cells() {
                self.make_mine(pos, "every remaining cell must hold a mine")?;
            }
            return Ok(true);
        }
        if self.missing_mines == 0 && self.missing_safes > 0 {
            debug!("pigeonhole: mine budget spent, unknowns are safe");
            for pos in self.unknown_cells() {
                self.make_safe(pos, "the mine budget is already spent")?;
            }
            return Ok(true);
        }
        Ok(false)
    }
}
