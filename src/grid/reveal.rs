use log::debug;
use rand::Rng;

use super::propagate::Propagation;
use super::LogicGrid;
use crate::cell::Identity;
use crate::error::EngineError;
use crate::position::Position;

impl LogicGrid {
    /// The primary action: resolve the clicked cell (arbitrating if it is
    /// still unknown), then either fail the game on a mine or reveal a
    /// clue number drawn from one generated layout, flood-filling through
    /// zero-clue regions. Revealing an already-revealed cell is a no-op, as
    /// is revealing after the game has failed.
    pub fn reveal<R: Rng + ?Sized>(
        &mut self,
        pos: Position,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        if let Some(reason) = self.invalid {
            return Err(EngineError::InvalidGrid(reason));
        }
        if !self.in_bounds(pos) {
            return Err(EngineError::OutOfBounds(pos));
        }
        if self.failed || self.cell(pos).revealed {
            return Ok(());
        }
        if self.is_untouched() {
            self.open_safely(pos)?;
        }
        if self.cell(pos).is_unknown() {
            self.arbitrate(pos)?;
        }
        match self.cell(pos).identity {
            Identity::Mine => {
                let idx = self.index(pos);
                self.cells[idx].revealed = true;
                self.failed = true;
                debug!("mine revealed at ({}, {}), game over", pos.x, pos.y);
                Ok(())
            }
            Identity::Safe => self.flood_reveal(pos, rng),
            Identity::Unknown => Err(EngineError::InvalidGrid(
                "arbitration left the revealed cell undecided",
            )),
        }
    }

    /// First click of a session: pre-force the clicked cell and its whole
    /// neighborhood safe, so the opening carries zero risk. Skipped when the
    /// board is too mine-dense for the safe budget to cover the opening.
    fn open_safely(&mut self, pos: Position) -> Result<(), EngineError> {
        let mut zone = vec![pos];
        zone.extend(self.neighbor_positions(pos));
        let need = zone
            .iter()
            .filter(|&&p| self.cell(p).is_unknown())
            .count();
        if self.missing_safes < need {
            debug!("not enough safe budget for a guaranteed opening");
            return Ok(());
        }
        for p in zone {
            if self.cell(p).is_unknown() {
                self.make_safe(p, "guaranteed safe opening")?;
            }
        }
        self.propagate(Propagation::greedy())
    }

    /// Reveal a known-safe cell, taking its clue from `assignment`, and keep
    /// flooding through neighbors of zero clues. Propagation re-runs after
    /// every single reveal so knowledge never lags the board.
    fn flood_reveal<R: Rng + ?Sized>(
        &mut self,
        pos: Position,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        let assignment = self.generate_assignment(rng)?;
        let mut pending = vec![pos];
        while let Some(p) = pending.pop() {
            let cell = self.cell(p);
            if cell.revealed {
                continue;
            }
            match cell.identity {
                // A zero clue never borders a mine, so the flood cannot
                // reach one; skip just in case knowledge says otherwise.
                Identity::Mine => continue,
                Identity::Unknown => self.make_safe(p, "cleared by the reveal flood")?,
                Identity::Safe => {}
            }
            let number = assignment.cell(p).number;
            let idx = self.index(p);
            self.cells[idx].number = number;
            self.cells[idx].revealed = true;
            self.propagate(Propagation::greedy())?;
            if let Some(reason) = self.invalid {
                return Err(EngineError::InvalidGrid(reason));
            }
            if number == 0 {
                pending.extend(self.neighbor_positions(p));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_reveal_is_always_safe() {
        for seed in 0..10 {
            let mut grid = LogicGrid::new(9, 9, 10).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            grid.reveal(Position::new(4, 4), &mut rng).unwrap();
            assert!(!grid.has_failed());
            assert!(grid.cell(Position::new(4, 4)).revealed);
            // The whole opening neighborhood was pre-forced safe.
            for n in Position::new(4, 4).neighbors() {
                assert_eq!(grid.cell(n).identity, Identity::Safe);
            }
        }
    }

    #[test]
    fn test_revealing_a_known_mine_fails_the_game() {
        let mut grid = LogicGrid::from_fixture(
            "*???
             ?1??
             ????",
            2,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        grid.reveal(Position::new(0, 0), &mut rng).unwrap();
        assert!(grid.has_failed());
        let cell = grid.cell(Position::new(0, 0));
        assert!(cell.revealed);
        assert_eq!(cell.identity, Identity::Mine);
        // Terminal: further reveals are no-ops.
        grid.reveal(Position::new(3, 2), &mut rng).unwrap();
        assert!(!grid.cell(Position::new(3, 2)).revealed);
    }

    #[test]
    fn test_zero_clue_floods_its_region() {
        // No mines at all: one click opens the entire board.
        let mut grid = LogicGrid::new(5, 4, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        grid.reveal(Position::new(2, 2), &mut rng).unwrap();
        for pos in grid.positions().collect::<Vec<_>>() {
            let cell = grid.cell(pos);
            assert!(cell.revealed);
            assert_eq!(cell.number, 0);
        }
    }

    #[test]
    fn test_revealed_numbers_stay_consistent() {
        let mut grid = LogicGrid::new(6, 6, 6).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        grid.reveal(Position::new(3, 3), &mut rng).unwrap();
        assert!(grid.invalid_reason().is_none());
        // Whatever was revealed admits at least one full layout, and every
        // generated layout reproduces the shown clues.
        let layout = grid.generate_assignment(&mut rng).unwrap();
        assert!(layout.is_consistent());
        for pos in grid.positions() {
            let cell = grid.cell(pos);
            if cell.revealed {
                assert_eq!(layout.cell(pos).number, cell.number);
            }
        }
    }

    #[test]
    fn test_reveal_soak_on_a_played_board() {
        // A mostly-solved board with a handful of open cells; revealing into
        // the unknown region must always leave a solvable, uncorrupted grid.
        let fixture = "?21112*?10
                       ???-??-?31
                       2*22222**1
                       2221*33332
                       1*112**11*
                       1221122111
                       02*2000111
                       02*20001*2
                       012332112*
                       001***1011";
        for seed in 0..10 {
            let mut grid = LogicGrid::from_fixture(fixture, 20).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            grid.reveal(Position::new(6, 1), &mut rng).unwrap();
            assert!(grid.cell(Position::new(6, 1)).revealed);
            assert!(!grid.has_failed());
            assert!(grid.invalid_reason().is_none());
            assert_eq!(
                grid.missing_mines() + grid.missing_safes(),
                grid.unknown_count()
            );
            let layout = grid.generate_assignment(&mut rng).unwrap();
            assert!(layout.is_consistent());
        }
    }

    #[test]
    fn test_out_of_bounds_reveal_is_an_error() {
        let mut grid = LogicGrid::new(3, 3, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            grid.reveal(Position::new(5, 5), &mut rng),
            Err(EngineError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_fully_mined_board_loses_immediately() {
        let mut grid = LogicGrid::new(3, 3, 9).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        grid.reveal(Position::new(1, 1), &mut rng).unwrap();
        assert!(grid.has_failed());
    }
}
