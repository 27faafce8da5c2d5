use std::fmt;

use super::LogicGrid;
use crate::cell::Identity;
use crate::error::EngineError;
use crate::position::Position;

/// One character per cell: `!` revealed mine, `*` unrevealed known mine,
/// a digit for a revealed clue, `-` known-safe-but-unrevealed, `?` unknown;
/// then a trailing count of mines still unplaced. Diagnostics only, and the
/// literal fixture format of the test suite.
impl fmt::Display for LogicGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell(Position::new(x as i32, y as i32));
                let glyph = match (cell.identity, cell.revealed) {
                    (Identity::Mine, true) => '!',
                    (Identity::Mine, false) => '*',
                    (Identity::Safe, true) => {
                        char::from_digit(u32::from(cell.number), 10).unwrap_or('#')
                    }
                    (Identity::Safe, false) => '-',
                    (Identity::Unknown, _) => '?',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        write!(f, " + {} mines left to find", self.missing_mines)
    }
}

impl LogicGrid {
    /// Parse the dump format back into a grid. Lines are trimmed, blank
    /// lines and the trailing mine-count line are ignored, so a literal
    /// indented string in a test parses as written.
    pub fn from_fixture(text: &str, mine_count: usize) -> Result<Self, EngineError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('+'))
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut grid = LogicGrid::new(width, height, mine_count)?;
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(EngineError::RaggedFixture { line: y });
            }
            for (x, glyph) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match glyph {
                    '?' => {}
                    '*' => grid.make_mine(pos, "given by fixture")?,
                    '!' => {
                        grid.make_mine(pos, "given by fixture")?;
                        let idx = grid.index(pos);
                        grid.cells[idx].revealed = true;
                        grid.failed = true;
                    }
                    '-' => grid.make_safe(pos, "given by fixture")?,
                    // 9 is not a clue any 8-cell neighborhood can satisfy.
                    digit @ '0'..='8' => {
                        grid.make_safe(pos, "given by fixture")?;
                        let idx = grid.index(pos);
                        grid.cells[idx].revealed = true;
                        grid.cells[idx].number = digit.to_digit(10).unwrap_or(0) as u8;
                    }
                    other => return Err(EngineError::UnrecognizedFixtureChar(other)),
                }
            }
        }
        Ok(grid)
    }
}
