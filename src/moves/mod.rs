pub mod move_buffer;
pub mod move_gen;
pub mod move_info;
pub mod precomputed;

#[cfg(test)]
mod tests;

/// Compass directions as seen from White's side of the board.
/// Discriminants index [`precomputed::MoveTables::rays`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthEast = 6,
    SouthWest = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// (file, rank) step
    pub const fn deltas(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (-1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
        }
    }

    /// Square index offset for a single step
    pub const fn value(self) -> i8 {
        let (df, dr) = self.deltas();
        dr * 8 + df
    }

    /// Whether stepping in this direction increases the square index.
    /// Decides if the nearest blocker on a ray is its lowest or highest bit.
    pub const fn is_forward(self) -> bool {
        self.value() > 0
    }
}
