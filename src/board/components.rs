use std::{
    fmt::{Display, Write},
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not},
    str::FromStr,
};

use crate::{error::EngineError, prelude::*};

#[derive(Debug, Default, Hash, PartialEq, Eq, PartialOrd, Clone, Copy)]
#[repr(transparent)]
pub struct BitBoard(pub u64);

impl BitAndAssign for BitBoard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl BitOrAssign for BitBoard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl BitOr for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitXor for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl BitBoard {
    pub const EMPTY: Self = Self(0);

    #[inline(always)]
    pub const fn from_square(index: usize) -> Self {
        Self(1 << index)
    }

    #[inline(always)]
    pub const fn set(&mut self, index: usize) {
        self.0 |= 1 << index;
    }

    #[inline(always)]
    pub const fn clear(&mut self, index: usize) {
        self.0 &= !(1 << index);
    }

    #[inline(always)]
    pub const fn pop_count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn print_bitboard(&self) -> String {
        let mut out = String::with_capacity(8 * 8 * 2);
        for rank in (0..8).rev() {
            let row: Vec<&str> = (0..8)
                .map(|file| {
                    if self.contains_square(rank * 8 + file) {
                        "1"
                    } else {
                        "0"
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", row.join(" "));
        }
        out
    }

    #[inline(always)]
    pub const fn lsb(&self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        Some(self.0.trailing_zeros() as usize)
    }

    #[inline(always)]
    pub const fn msb(&self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        Some(63 - self.0.leading_zeros() as usize)
    }

    /// Removes and returns the least significant set square
    #[inline(always)]
    pub const fn pop_lsb(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(idx)
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn any(&self) -> bool {
        self.0 != 0
    }

    #[inline(always)]
    pub const fn iter_bits(&self) -> BitBoardIterator {
        BitBoardIterator { remaining: self.0 }
    }

    #[inline(always)]
    pub const fn or(self, rhs: Self) -> Self {
        BitBoard(self.0 | rhs.0)
    }

    #[inline(always)]
    pub const fn and(self, rhs: Self) -> Self {
        BitBoard(self.0 & rhs.0)
    }

    #[inline(always)]
    pub const fn not(self) -> Self {
        BitBoard(!self.0)
    }

    #[inline(always)]
    pub const fn contains_square(&self, index: usize) -> bool {
        (self.0 & (1 << index)) != 0
    }
}

/// Iterator that yields each set bit position in a BitBoard
pub struct BitBoardIterator {
    remaining: u64,
}

impl Iterator for BitBoardIterator {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let exact = self.remaining.count_ones() as usize;
        (exact, Some(exact))
    }
}

impl ExactSizeIterator for BitBoardIterator {}

#[derive(Default, Debug, Hash, PartialEq, Eq, PartialOrd, Clone, Copy)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Self::Output {
        self.flip()
    }
}

impl Side {
    pub const SIDES: [Side; 2] = [Side::White, Side::Black];

    pub const fn flip(&self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    /// +1 for White, -1 for Black. Converts white-relative scores to the mover's view.
    #[inline(always)]
    pub const fn sign(&self) -> i32 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

#[derive(Default, PartialEq, Eq, Debug, PartialOrd, Clone, Copy, Hash)]
pub enum Piece {
    #[default]
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Piece::Pawn => write!(f, "Pawn"),
            Piece::Knight => write!(f, "Knight"),
            Piece::Bishop => write!(f, "Bishop"),
            Piece::Rook => write!(f, "Rook"),
            Piece::Queen => write!(f, "Queen"),
            Piece::King => write!(f, "King"),
        }
    }
}

impl Piece {
    pub const PIECES: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Pieces a pawn may promote to, strongest first
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    pub const PIECE_CHARS: [[char; 6]; 2] = [
        ['P', 'N', 'B', 'R', 'Q', 'K'], // White
        ['p', 'n', 'b', 'r', 'q', 'k'], // Black
    ];

    pub fn all() -> impl Iterator<Item = (Piece, Side)> {
        Side::SIDES
            .into_iter()
            .flat_map(|side| Self::PIECES.into_iter().map(move |piece| (piece, side)))
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        match self {
            Piece::Pawn => 0,
            Piece::Knight => 1,
            Piece::Bishop => 2,
            Piece::Rook => 3,
            Piece::Queen => 4,
            Piece::King => 5,
        }
    }

    /// Material value in centipawns. The king is never traded so it carries none.
    #[inline(always)]
    pub const fn value(&self) -> i32 {
        match self {
            Piece::Pawn => 100,
            Piece::Knight => 320,
            Piece::Bishop => 330,
            Piece::Rook => 500,
            Piece::Queen => 900,
            Piece::King => 0,
        }
    }

    /// Value used when this piece is the victim in MVV-LVA ordering
    #[inline(always)]
    pub const fn victim_score(&self) -> i32 {
        match self {
            Piece::Pawn => 100,
            Piece::Knight => 320,
            Piece::Bishop => 330,
            Piece::Rook => 500,
            Piece::Queen => 900,
            Piece::King => 20_000,
        }
    }

    pub const fn to_char(&self, side: Side) -> char {
        Self::PIECE_CHARS[side.index()][self.index()]
    }

    /// Parses a FEN piece letter, upper case being white
    pub const fn from_char(c: char) -> Option<(Piece, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, side))
    }

    /// Letter used in SAN, None for pawns
    pub const fn san_letter(&self) -> Option<char> {
        match self {
            Piece::Pawn => None,
            Piece::Knight => Some('N'),
            Piece::Bishop => Some('B'),
            Piece::Rook => Some('R'),
            Piece::Queen => Some('Q'),
            Piece::King => Some('K'),
        }
    }
}

/// Compact struct to hold piece and side
#[derive(Debug, Default, Hash, PartialEq, Eq, PartialOrd, Clone, Copy)]
pub struct PieceInfo {
    pub piece: Piece,
    pub side: Side,
}

impl PieceInfo {
    pub const fn new(piece: Piece, side: Side) -> Self {
        Self { piece, side }
    }
}

/// Piece placement of a position.
///
/// Twelve base bitboards, one per (side, piece), plus the composite side and
/// occupancy sets and a mailbox for square lookups. Every mutation goes
/// through [`BoardState::put`], [`BoardState::remove`] or
/// [`BoardState::relocate`], which keep all four views in agreement.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct BoardState {
    /// Union of each side's pieces
    all_sides: [BitBoard; 2],
    /// Union of both sides
    occupied: BitBoard,
    /// [side][Pawn, Knight, Bishop, Rook, Queen, King]
    all_pieces: [[BitBoard; 6]; 2],
    /// Maps square to piece info
    mailbox: [Option<PieceInfo>; 64],
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            all_sides: [BitBoard::default(); 2],
            occupied: BitBoard::default(),
            all_pieces: [[BitBoard::default(); 6]; 2],
            mailbox: [None; 64],
        }
    }
}

impl BoardState {
    pub fn to_fen_pieces(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                match self.mailbox[rank * 8 + file] {
                    Some(info) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(info.piece.to_char(info.side));
                    }
                    None => empty_count += 1,
                }
            }

            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }

            if rank > 0 {
                fen.push('/');
            }
        }

        fen
    }

    #[inline(always)]
    pub const fn mailbox(&self) -> &[Option<PieceInfo>; 64] {
        &self.mailbox
    }

    #[inline(always)]
    pub const fn piece_bb(&self, side: Side, piece: Piece) -> BitBoard {
        self.all_pieces[side.index()][piece.index()]
    }

    #[inline(always)]
    pub const fn side_bb(&self, side: Side) -> BitBoard {
        self.all_sides[side.index()]
    }

    #[inline(always)]
    pub const fn occupied(&self) -> BitBoard {
        self.occupied
    }

    #[inline(always)]
    pub const fn ortho_sliders(&self, side: Side) -> BitBoard {
        self.all_pieces[side.index()][Piece::Rook.index()]
            .or(self.all_pieces[side.index()][Piece::Queen.index()])
    }

    #[inline(always)]
    pub const fn diag_sliders(&self, side: Side) -> BitBoard {
        self.all_pieces[side.index()][Piece::Bishop.index()]
            .or(self.all_pieces[side.index()][Piece::Queen.index()])
    }

    #[inline(always)]
    pub const fn is_occupied(&self, square: usize) -> bool {
        self.occupied.contains_square(square)
    }

    #[inline(always)]
    pub const fn piece_at(&self, square: usize) -> Option<PieceInfo> {
        self.mailbox[square]
    }

    #[inline(always)]
    pub fn king_square(&self, side: Side) -> Option<usize> {
        self.piece_bb(side, Piece::King).lsb()
    }

    /// Number of pieces on the board, kings and pawns included
    #[inline(always)]
    pub const fn piece_count(&self) -> u32 {
        self.occupied.pop_count()
    }

    /// Places a piece on an empty square.
    #[inline(always)]
    pub fn put(&mut self, side: Side, piece: Piece, square: usize) {
        debug_assert!(
            self.mailbox[square].is_none(),
            "[put] {square} already holds {:?}",
            self.mailbox[square]
        );
        self.all_pieces[side.index()][piece.index()].set(square);
        self.all_sides[side.index()].set(square);
        self.occupied.set(square);
        self.mailbox[square] = Some(PieceInfo::new(piece, side));
    }

    #[inline(always)]
    pub fn remove(&mut self, side: Side, piece: Piece, square: usize) {
        debug_assert_eq!(
            self.mailbox[square],
            Some(PieceInfo::new(piece, side)),
            "[remove] {piece} of {side} not found on {square}"
        );
        self.all_pieces[side.index()][piece.index()].clear(square);
        self.all_sides[side.index()].clear(square);
        self.occupied.clear(square);
        self.mailbox[square] = None;
    }

    /// Moves a piece between squares. Destination must be empty, captures
    /// are removed beforehand.
    #[inline(always)]
    pub fn relocate(&mut self, side: Side, piece: Piece, from: usize, to: usize) {
        self.remove(side, piece, from);
        self.put(side, piece, to);
    }

    /// Checked placement used while building a position from outside input
    pub fn place(&mut self, side: Side, piece: Piece, square: usize) -> miette::Result<()> {
        miette::ensure!(square < NUM_SQUARES, "[place] square {square} is off the board");
        miette::ensure!(
            self.mailbox[square].is_none(),
            "[place] Some piece already exists at {}",
            Square(square)
        );
        self.put(side, piece, square);
        Ok(())
    }

    /// Verifies the composite sets and mailbox agree with the twelve base
    /// boards and that no square is claimed twice.
    pub fn is_consistent(&self) -> bool {
        let mut seen = BitBoard::EMPTY;
        for side in Side::SIDES {
            let mut union = BitBoard::EMPTY;
            for piece in Piece::PIECES {
                let bb = self.piece_bb(side, piece);
                if (seen & bb).any() {
                    return false;
                }
                seen |= bb;
                union |= bb;
                if bb
                    .iter_bits()
                    .any(|sq| self.mailbox[sq] != Some(PieceInfo::new(piece, side)))
                {
                    return false;
                }
            }
            if union != self.side_bb(side) {
                return false;
            }
        }
        let mailbox_count = self.mailbox.iter().filter(|p| p.is_some()).count();
        seen == self.occupied && mailbox_count == seen.pop_count() as usize
    }
}

/// Castling rights are stored in a [`u8`], using the low four bits:
/// ```text
/// Bit: 3 2 1 0
///      q k Q K
///      | | | +-- White kingside right
///      | | +---- White queenside right
///      | +------ Black kingside right
///      +-------- Black queenside right
/// ```
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Clone, Copy)]
#[repr(transparent)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NO_CASTLING: u8 = 0;
    /// White King side castling
    pub const WHITE_00: u8 = 0b0001;
    /// White Queen side castling
    pub const WHITE_000: u8 = 0b0010;
    /// Black King side castling
    pub const BLACK_00: u8 = 0b0100;
    /// Black Queen side castling
    pub const BLACK_000: u8 = 0b1000;

    pub const WHITE_CASTLING: Self = Self(Self::WHITE_00 | Self::WHITE_000);
    pub const BLACK_CASTLING: Self = Self(Self::BLACK_00 | Self::BLACK_000);
    pub const ANY_CASTLING: Self = Self(Self::BLACK_CASTLING.0 | Self::WHITE_CASTLING.0);

    /// Rights that survive a move touching each square. Moving from or to a
    /// king or rook home square clears the matching rights.
    pub const SQUARE_MASKS: [u8; NUM_SQUARES] = {
        let mut masks = [0b1111u8; NUM_SQUARES];
        masks[0] = !Self::WHITE_000 & 0b1111; // a1
        masks[4] = !(Self::WHITE_00 | Self::WHITE_000) & 0b1111; // e1
        masks[7] = !Self::WHITE_00 & 0b1111; // h1
        masks[56] = !Self::BLACK_000 & 0b1111; // a8
        masks[60] = !(Self::BLACK_00 | Self::BLACK_000) & 0b1111; // e8
        masks[63] = !Self::BLACK_00 & 0b1111; // h8
        masks
    };

    #[inline(always)]
    pub const fn all() -> Self {
        Self::ANY_CASTLING
    }

    #[inline(always)]
    pub const fn empty() -> Self {
        Self(Self::NO_CASTLING)
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == Self::NO_CASTLING
    }

    #[inline(always)]
    pub const fn allows(&self, rights: u8) -> bool {
        self.0 & rights != Self::NO_CASTLING
    }

    #[inline(always)]
    pub const fn can_castle(&self, side: Side, kingside: bool) -> bool {
        match (side, kingside) {
            (Side::White, true) => self.allows(Self::WHITE_00),
            (Side::White, false) => self.allows(Self::WHITE_000),
            (Side::Black, true) => self.allows(Self::BLACK_00),
            (Side::Black, false) => self.allows(Self::BLACK_000),
        }
    }

    #[inline(always)]
    pub const fn add_right(&mut self, rights: u8) {
        self.0 |= rights;
    }

    #[inline(always)]
    pub const fn remove_right(&mut self, rights: u8) {
        self.0 &= !rights
    }

    /// Applies [`CastlingRights::SQUARE_MASKS`] for a move between `from` and `to`
    #[inline(always)]
    pub const fn update_for_move(&mut self, from: usize, to: usize) {
        self.0 &= Self::SQUARE_MASKS[from] & Self::SQUARE_MASKS[to];
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (bit, c) in [
            (Self::WHITE_00, 'K'),
            (Self::WHITE_000, 'Q'),
            (Self::BLACK_00, 'k'),
            (Self::BLACK_000, 'q'),
        ] {
            if self.allows(bit) {
                f.write_char(c)?;
            }
        }
        Ok(())
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::empty()
    }
}

/// Represents a single square on the board.
/// # Representation
/// ```text
///  A8(56) B8 C8 D8 E8 F8 G8 H8(63)
///  ...
///  A1(0)  B1 C1 D1 E1 F1 G1 H1(7)
/// ```
#[derive(Default, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[repr(transparent)]
pub struct Square(pub usize);

impl Square {
    /// Returns a Square from a given index. Will return None if index is out of bounds
    #[inline(always)]
    pub const fn new(index: usize) -> Option<Self> {
        if index < NUM_SQUARES {
            return Some(Self(index));
        }
        None
    }

    /// Returns a Square from a 0-indexed file and rank.
    #[inline(always)]
    pub const fn from_coords(file: usize, rank: usize) -> Option<Self> {
        if file < 8 && rank < 8 {
            return Some(Square(rank * 8 + file));
        }
        None
    }

    #[inline(always)]
    pub const fn row(&self) -> usize {
        self.0 / 8
    }

    #[inline(always)]
    pub const fn col(&self) -> usize {
        self.0 % 8
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0
    }

    /// Same file, opposite rank
    #[inline(always)]
    pub const fn flip_rank(&self) -> Self {
        Self(self.0 ^ 56)
    }
}

impl From<Square> for usize {
    fn from(value: Square) -> Self {
        value.0
    }
}

impl FromStr for Square {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(EngineError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(EngineError::InvalidSquare(s.to_string()));
        }
        Ok(Self(((rank - b'1') * 8 + (file - b'a')) as usize))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (self.col() as u8 + b'a') as char;
        let rank = (self.row() as u8 + b'1') as char;
        write!(f, "{file}{rank}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_bitboard() {
        let out = "0 0 0 0 0 0 0 0
0 0 0 0 0 0 0 0
0 0 0 0 0 0 0 0
0 0 0 0 0 0 0 0
0 0 0 0 1 0 0 0
0 0 0 0 0 0 0 0
0 0 0 0 0 0 0 0
0 0 0 0 0 0 0 0
";
        let b = BitBoard::from_square(28);
        assert_eq!(out, b.print_bitboard())
    }

    #[test]
    fn test_display_square() {
        assert_eq!(Square(0).to_string(), "a1");
        assert_eq!(Square(7).to_string(), "h1");
        assert_eq!(Square(11).to_string(), "d2");
        assert_eq!(Square(28).to_string(), "e4");
        assert_eq!(Square(56).to_string(), "a8");
        assert_eq!(Square(63).to_string(), "h8");
    }

    #[test]
    fn test_parse_square() {
        assert_eq!("e4".parse::<Square>().unwrap(), Square(28));
        assert_eq!("H8".parse::<Square>().unwrap(), Square(63));
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
    }

    #[test]
    fn test_pop_lsb_drains_in_order() {
        let mut bb = BitBoard(0b1010_0001);
        assert_eq!(bb.pop_lsb(), Some(0));
        assert_eq!(bb.pop_lsb(), Some(5));
        assert_eq!(bb.pop_lsb(), Some(7));
        assert_eq!(bb.pop_lsb(), None);
        assert_eq!(BitBoard(1 << 40 | 1 << 3).msb(), Some(40));
    }

    #[test]
    fn test_board_state_composites_follow_mutations() {
        let mut state = BoardState::default();
        state.put(Side::White, Piece::Rook, 0);
        state.put(Side::Black, Piece::Knight, 57);
        state.relocate(Side::White, Piece::Rook, 0, 8);
        assert!(state.is_consistent());
        assert_eq!(state.occupied(), BitBoard(1 << 8 | 1 << 57));
        assert_eq!(state.side_bb(Side::White), BitBoard(1 << 8));
        assert_eq!(
            state.piece_at(57),
            Some(PieceInfo::new(Piece::Knight, Side::Black))
        );

        state.remove(Side::Black, Piece::Knight, 57);
        assert!(state.is_consistent());
        assert_eq!(state.side_bb(Side::Black), BitBoard::EMPTY);
        assert!(state.place(Side::White, Piece::Pawn, 8).is_err());
    }

    #[test]
    fn test_castling_masks() {
        let mut rights = CastlingRights::all();
        rights.update_for_move(7, 23);
        assert_eq!(rights.to_string(), "Qkq");
        rights.update_for_move(60, 61);
        assert_eq!(rights.to_string(), "Q");
        rights.update_for_move(1, 0);
        assert_eq!(rights.to_string(), "-");
    }
}
