use log::debug;

use super::propagate::{Propagation, HYPOTHESIS};
use super::LogicGrid;
use crate::cell::Identity;
use crate::error::EngineError;
use crate::position::Position;

const BOTH_IMPOSSIBLE: &str = "neither identity of the revealed cell is consistent";

impl LogicGrid {
    /// Decide what a still-unknown cell is, the instant the player reveals
    /// it. First match wins:
    ///
    /// 1. a mine there is contradictory -> safe
    /// 2. safety there is contradictory -> mine
    /// 3. a provably safe move was ignored elsewhere -> mine
    /// 4. the boundary cannot even hold the mine budget -> safe
    /// 5. peer search shows no placement keeps every mine on the boundary
    ///    -> mine
    /// 6. benefit of the doubt -> safe
    ///
    /// Every decision records a reason and cascades through propagation.
    pub(crate) fn arbitrate(&mut self, pos: Position) -> Result<(), EngineError> {
        debug!("arbitrating reveal of ({}, {})", pos.x, pos.y);
        let if_mine = self.hypothesis(pos, true)?;
        let if_safe = self.hypothesis(pos, false)?;
        match (if_mine.invalid.is_some(), if_safe.invalid.is_some()) {
            (true, true) => {
                self.mark_invalid(BOTH_IMPOSSIBLE);
                return Err(EngineError::InvalidGrid(BOTH_IMPOSSIBLE));
            }
            (true, false) => {
                self.make_safe(pos, "a mine here would contradict the visible clues")?
            }
            (false, true) => {
                self.make_mine(pos, "this cell cannot be safe given the visible clues")?
            }
            (false, false) => self.arbitrate_ambiguous(pos)?,
        }
        self.propagate(Propagation::greedy())?;
        if let Some(reason) = self.invalid {
            return Err(EngineError::InvalidGrid(reason));
        }
        Ok(())
    }

    /// The genuinely ambiguous case: both identities are consistent, so the
    /// engine picks the fair one (rules 3-6).
    fn arbitrate_ambiguous(&mut self, pos: Position) -> Result<(), EngineError> {
        // Rule 3: the player ignored a cell already proven safe.
        let ignored_safe = self.positions().any(|p| {
            let cell = self.cell(p);
            p != pos && cell.identity == Identity::Safe && !cell.revealed
        });
        if ignored_safe {
            return self.make_mine(pos, "a provably safe cell was left unrevealed");
        }

        // Rule 4: the boundary alone cannot carry the budget, so no single
        // cell can be blamed for it.
        let boundary = self.boundary_cells();
        if boundary.len() < self.missing_mines {
            return self.make_safe(pos, "too few boundary cells to pin the remaining mines on");
        }

        // Rule 5: punish a blind guess only when no placement keeps every
        // remaining mine on cells the player could reason about.
        if self.boundary_cannot_absorb_budget(&boundary, pos)? {
            return self.make_mine(pos, "the remaining mines cannot all sit on the boundary");
        }

        // Rule 6.
        self.make_safe(pos, "benefit of the doubt")
    }

    /// Probe each boundary cell as a mine. If a probe collapses, or knocks
    /// other boundary cells out as mines, the boundary's capacity shrinks
    /// below the budget and some mine must spill onto unconstrained cells
    /// such as the one just clicked.
    fn boundary_cannot_absorb_budget(
        &self,
        boundary: &[Position],
        clicked: Position,
    ) -> Result<bool, EngineError> {
        for &probe in boundary {
            if probe == clicked {
                continue;
            }
            let snap = self.hypothesis(probe, true)?;
            let excluded = if snap.invalid.is_some() {
                1
            } else {
                boundary
                    .iter()
                    .filter(|&&p| {
                        p != clicked && p != probe && snap.cell(p).identity == Identity::Safe
                    })
                    .count()
            };
            if excluded > 0 && boundary.len() - excluded < self.missing_mines {
                debug!(
                    "probe at ({}, {}) leaves the boundary {} short of the budget",
                    probe.x,
                    probe.y,
                    self.missing_mines - (boundary.len() - excluded)
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// An independent snapshot with `pos` forced one way and the
    /// consequences driven to a definitive answer.
    fn hypothesis(&self, pos: Position, as_mine: bool) -> Result<LogicGrid, EngineError> {
        let mut snap = self.clone();
        if as_mine {
            snap.make_mine(pos, HYPOTHESIS)?;
        } else {
            snap.make_safe(pos, HYPOTHESIS)?;
        }
        snap.propagate(Propagation::exhaustive())?;
        Ok(snap)
    }
}
