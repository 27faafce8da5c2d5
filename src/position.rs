#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The full Moore neighborhood, unclipped. The grid is responsible for
    /// discarding coordinates that fall outside its bounds.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dx| {
                (dx != 0 || dy != 0).then(|| Position::new(self.x + dx, self.y + dy))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_cover_moore_neighborhood() {
        let neighbors: Vec<Position> = Position::new(1, 1).neighbors().collect();

        assert_eq!(neighbors.len(), 8);
        for x in 0..=2 {
            for y in 0..=2 {
                let pos = Position::new(x, y);
                if pos == Position::new(1, 1) {
                    assert!(!neighbors.contains(&pos));
                } else {
                    assert!(neighbors.contains(&pos));
                }
            }
        }
    }

    #[test]
    fn test_neighbors_is_restartable() {
        let pos = Position::new(0, 0);
        let first: Vec<Position> = pos.neighbors().collect();
        let second: Vec<Position> = pos.neighbors().collect();
        assert_eq!(first, second);
    }
}
