use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use super::propagate::Propagation;
use super::LogicGrid;
use crate::error::EngineError;

/// Fresh snapshots to try before declaring the board unsolvable.
const GENERATION_RETRY_LIMIT: usize = 32;

impl LogicGrid {
    /// Produce one full mine layout compatible with current knowledge, by
    /// randomized generate-and-test on a snapshot: pick an undecided cell
    /// (boundary first), flip a weighted coin, propagate, repeat until the
    /// snapshot is fully decided, then validate it. Inconsistent snapshots
    /// are discarded and retried; running out of steps or retries is a
    /// solver defect and fails loudly, never a partial result.
    pub fn generate_assignment<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<LogicGrid, EngineError> {
        if let Some(reason) = self.invalid {
            return Err(EngineError::InvalidGrid(reason));
        }
        let step_limit = self.total_cells() + 8;
        'attempt: for attempt in 0..GENERATION_RETRY_LIMIT {
            let mut grid = self.clone();
            let mut steps = 0;
            while grid.unknown_count() > 0 {
                steps += 1;
                if steps > step_limit {
                    return Err(EngineError::GenerationDiverged {
                        steps: step_limit,
                        grid: self.to_string(),
                    });
                }
                grid.guess_step(rng)?;
                if grid.invalid.is_some() {
                    trace!("layout attempt {attempt} went contradictory, restarting");
                    continue 'attempt;
                }
            }
            if grid.is_consistent() {
                grid.update_numbers();
                return Ok(grid);
            }
            trace!("layout attempt {attempt} failed the consistency check");
        }
        Err(EngineError::GenerationExhausted {
            attempts: GENERATION_RETRY_LIMIT,
            grid: self.to_string(),
        })
    }

    /// One generation step: force a random undecided cell, preferring cells
    /// the visible clues constrain, then cascade the consequences.
    fn guess_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EngineError> {
        let mut places = self.boundary_cells();
        if places.is_empty() {
            places = self.unknown_cells();
        }
        if let Some(&pos) = places.choose(rng) {
            let undecided = self.missing_mines + self.missing_safes;
            // Weight the coin by the remaining budgets so sparse and dense
            // boards both settle quickly.
            if undecided > 0 && rng.gen_ratio(self.missing_mines as u32, undecided as u32) {
                self.make_mine(pos, "placed while generating a candidate layout")?;
            } else {
                self.make_safe(pos, "spared while generating a candidate layout")?;
            }
        }
        self.propagate(Propagation::local())
    }
}
