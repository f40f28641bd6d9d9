use crate::{BitBoard, Side, moves::Direction};

/// Attack patterns computed at compile time.
///
/// Knights, kings and pawns use a direct lookup. Sliding pieces use one ray
/// per direction, cut at the first blocker by [`MoveTables::ray_until_blocker`].
#[derive(Debug)]
pub struct MoveTables {
    pub knight_moves: [BitBoard; 64],
    pub king_moves: [BitBoard; 64],
    /// [side][square], squares a pawn of `side` on `square` attacks
    pub pawn_attacks: [[BitBoard; 64]; 2],
    /// [direction][square], empty-board ray excluding the origin
    pub rays: [[BitBoard; 64]; 8],
}

pub static MOVE_TABLES: MoveTables = MoveTables::new();

impl Default for MoveTables {
    fn default() -> Self {
        Self::new()
    }
}

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

impl MoveTables {
    pub const fn new() -> Self {
        let mut tables = Self {
            knight_moves: [BitBoard(0); 64],
            king_moves: [BitBoard(0); 64],
            pawn_attacks: [[BitBoard(0); 64]; 2],
            rays: [[BitBoard(0); 64]; 8],
        };

        tables.init_knight_moves();
        tables.init_king_moves();
        tables.init_pawn_attacks();
        tables.init_rays();

        tables
    }

    /// Square reached from `square` by (file, rank) steps, if still on the board
    const fn offset(square: usize, file_delta: i8, rank_delta: i8) -> Option<usize> {
        let file = (square % 8) as i8 + file_delta;
        let rank = (square / 8) as i8 + rank_delta;
        if file >= 0 && file < 8 && rank >= 0 && rank < 8 {
            Some((rank * 8 + file) as usize)
        } else {
            None
        }
    }

    const fn init_knight_moves(&mut self) {
        let mut square = 0;
        while square < 64 {
            let mut i = 0;
            while i < KNIGHT_DELTAS.len() {
                let (df, dr) = KNIGHT_DELTAS[i];
                if let Some(target) = Self::offset(square, df, dr) {
                    self.knight_moves[square].set(target);
                }
                i += 1;
            }
            square += 1;
        }
    }

    const fn init_king_moves(&mut self) {
        let mut square = 0;
        while square < 64 {
            let mut i = 0;
            while i < Direction::ALL.len() {
                let (df, dr) = Direction::ALL[i].deltas();
                if let Some(target) = Self::offset(square, df, dr) {
                    self.king_moves[square].set(target);
                }
                i += 1;
            }
            square += 1;
        }
    }

    const fn init_pawn_attacks(&mut self) {
        let mut square = 0;
        while square < 64 {
            if let Some(t) = Self::offset(square, -1, 1) {
                self.pawn_attacks[Side::White.index()][square].set(t);
            }
            if let Some(t) = Self::offset(square, 1, 1) {
                self.pawn_attacks[Side::White.index()][square].set(t);
            }
            if let Some(t) = Self::offset(square, -1, -1) {
                self.pawn_attacks[Side::Black.index()][square].set(t);
            }
            if let Some(t) = Self::offset(square, 1, -1) {
                self.pawn_attacks[Side::Black.index()][square].set(t);
            }
            square += 1;
        }
    }

    const fn init_rays(&mut self) {
        let mut d = 0;
        while d < Direction::ALL.len() {
            let (df, dr) = Direction::ALL[d].deltas();
            let mut square = 0;
            while square < 64 {
                let mut ray = BitBoard(0);
                let mut current = square;
                while let Some(next) = Self::offset(current, df, dr) {
                    ray.set(next);
                    current = next;
                }
                self.rays[d][square] = ray;
                square += 1;
            }
            d += 1;
        }
    }

    #[inline(always)]
    pub const fn ray(&self, direction: Direction, square: usize) -> BitBoard {
        self.rays[direction as usize][square]
    }

    /// Ray from `square` in `direction`, stopping at (and including) the first
    /// occupied square.
    #[inline(always)]
    pub const fn ray_until_blocker(
        &self,
        direction: Direction,
        square: usize,
        occupied: BitBoard,
    ) -> BitBoard {
        let ray = self.ray(direction, square);
        let blockers = ray.and(occupied);
        let nearest = if direction.is_forward() {
            blockers.lsb()
        } else {
            blockers.msb()
        };
        match nearest {
            Some(blocker) => BitBoard(ray.0 ^ self.ray(direction, blocker).0),
            None => ray,
        }
    }

    #[inline(always)]
    pub const fn rook_attacks(&self, square: usize, occupied: BitBoard) -> BitBoard {
        self.ray_until_blocker(Direction::North, square, occupied)
            .or(self.ray_until_blocker(Direction::South, square, occupied))
            .or(self.ray_until_blocker(Direction::East, square, occupied))
            .or(self.ray_until_blocker(Direction::West, square, occupied))
    }

    #[inline(always)]
    pub const fn bishop_attacks(&self, square: usize, occupied: BitBoard) -> BitBoard {
        self.ray_until_blocker(Direction::NorthEast, square, occupied)
            .or(self.ray_until_blocker(Direction::NorthWest, square, occupied))
            .or(self.ray_until_blocker(Direction::SouthEast, square, occupied))
            .or(self.ray_until_blocker(Direction::SouthWest, square, occupied))
    }

    #[inline(always)]
    pub const fn queen_attacks(&self, square: usize, occupied: BitBoard) -> BitBoard {
        self.rook_attacks(square, occupied)
            .or(self.bishop_attacks(square, occupied))
    }

    #[inline(always)]
    pub const fn pawn_attacks(&self, square: usize, side: Side) -> BitBoard {
        self.pawn_attacks[side.index()][square]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knight_moves_corner_and_center() {
        // a1 -> b3, c2
        assert_eq!(MOVE_TABLES.knight_moves[0], BitBoard(1 << 17 | 1 << 10));
        // d4 has eight targets
        assert_eq!(MOVE_TABLES.knight_moves[27].pop_count(), 8);
        // h8 -> g6, f7
        assert_eq!(MOVE_TABLES.knight_moves[63], BitBoard(1 << 46 | 1 << 53));
    }

    #[test]
    fn test_king_moves_edges() {
        assert_eq!(MOVE_TABLES.king_moves[0].pop_count(), 3);
        assert_eq!(MOVE_TABLES.king_moves[4].pop_count(), 5);
        assert_eq!(MOVE_TABLES.king_moves[36].pop_count(), 8);
    }

    #[test]
    fn test_pawn_attacks_do_not_wrap() {
        // White pawn on a2 only attacks b3
        assert_eq!(MOVE_TABLES.pawn_attacks(8, Side::White), BitBoard(1 << 17));
        // Black pawn on h7 only attacks g6
        assert_eq!(MOVE_TABLES.pawn_attacks(55, Side::Black), BitBoard(1 << 46));
    }

    #[test]
    fn test_rays_stop_at_blocker() {
        // Rook on a1, blocker on a4 and d1
        let occupied = BitBoard(1 << 24 | 1 << 3);
        let attacks = MOVE_TABLES.rook_attacks(0, occupied);
        let expected = BitBoard(1 << 8 | 1 << 16 | 1 << 24 | 1 << 1 | 1 << 2 | 1 << 3);
        assert_eq!(attacks, expected);

        // Bishop on d4 with a blocker on b2 (backward ray) and f6 (forward ray)
        let occupied = BitBoard(1 << 9 | 1 << 45);
        let attacks = MOVE_TABLES.bishop_attacks(27, occupied);
        assert!(attacks.contains_square(9));
        assert!(!attacks.contains_square(0));
        assert!(attacks.contains_square(45));
        assert!(!attacks.contains_square(54));
        assert_eq!(attacks.pop_count(), 2 + 3 + 3 + 2);
    }
}
