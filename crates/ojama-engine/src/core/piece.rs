use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize, Serializer};

use super::{COLS, grid::Block, signed};

/// The falling piece: kind, current shape matrix, and anchor position.
///
/// Pieces are values: movement and rotation return new `Piece` instances, and
/// [`try_move`](crate::try_move) and [`try_rotate`](crate::try_rotate) decide whether the
/// result may replace the current one.
///
/// # Coordinate System
///
/// - The anchor is the top-left corner of the piece's square shape matrix
/// - Columns grow rightward, rows grow downward, `(0, 0)` is the top-left visible cell
/// - The row may be negative while the piece is still above the visible area
///
/// # Example
///
/// ```
/// use ojama_engine::{Piece, PieceKind};
///
/// let piece = Piece::spawn_of(PieceKind::T);
/// assert_eq!((piece.position().col(), piece.position().row()), (4, 0));
///
/// let moved = piece.shifted(1, 2).rotated_right();
/// assert_eq!((moved.position().col(), moved.position().row()), (5, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    kind: PieceKind,
    position: PiecePosition,
    shape: PieceShape,
}

impl Piece {
    /// Creates a piece of the given kind in its spawn orientation at `position`.
    #[must_use]
    pub const fn new(kind: PieceKind, position: PiecePosition) -> Self {
        Self {
            kind,
            position,
            shape: kind.spawn_shape(),
        }
    }

    /// Creates a piece of the given kind at its spawn position.
    ///
    /// The shape is horizontally centered (`COLS / 2 - size / 2`) with its top row at row 0.
    #[must_use]
    pub fn spawn_of(kind: PieceKind) -> Self {
        const CENTER: i32 = signed(COLS / 2);
        let shape = kind.spawn_shape();
        let col = CENTER - i32::from(shape.size()) / 2;
        Self::new(kind, PiecePosition::new(col, 0))
    }

    /// Picks a piece kind uniformly at random and creates it at its spawn position.
    #[must_use]
    pub fn spawn<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::spawn_of(rng.random())
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub const fn shape(&self) -> &PieceShape {
        &self.shape
    }

    /// Returns the absolute `(col, row)` of every filled cell.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.occupied_cells().map(move |(dx, dy)| {
            (
                self.position.col + i32::from(dx),
                self.position.row + i32::from(dy),
            )
        })
    }

    #[must_use]
    pub const fn shifted(&self, d_col: i32, d_row: i32) -> Self {
        Self {
            position: self.position.shifted(d_col, d_row),
            ..*self
        }
    }

    #[must_use]
    pub const fn with_shape(&self, shape: PieceShape) -> Self {
        Self { shape, ..*self }
    }

    /// Returns the piece rotated 90° clockwise around its shape matrix.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        self.with_shape(self.shape.rotated_right())
    }
}

/// Anchor position of a piece (top-left corner of its shape matrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    col: i32,
    row: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn row(self) -> i32 {
        self.row
    }

    #[must_use]
    pub const fn shifted(self, d_col: i32, d_row: i32) -> Self {
        Self::new(self.col + d_col, self.row + d_row)
    }
}

/// Enum representing the type of piece.
///
/// The discriminant is the numeric cell tag written into the grid on lock-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 1,
    /// O-piece.
    O = 2,
    /// T-piece.
    T = 3,
    /// L-piece.
    L = 4,
    /// J-piece.
    J = 5,
    /// S-piece.
    S = 6,
    /// Z-piece.
    Z = 7,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in tag order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Returns the numeric cell tag (`1..=7`).
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1..=7 => Some(Self::ALL[tag as usize - 1]),
            _ => None,
        }
    }

    /// Returns the shape matrix of the spawn orientation.
    #[must_use]
    pub const fn spawn_shape(self) -> PieceShape {
        SPAWN_SHAPES[self as usize - 1]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use ojama_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use ojama_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

const MAX_SHAPE_SIZE: usize = 4;

/// Square shape matrix of a piece.
///
/// Only the top-left `size × size` corner is meaningful (4 for I, 2 for O, 3 otherwise).
/// Filled cells hold `Block::Piece(kind)`. Rotation keeps the matrix size, so the
/// bounding box never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    size: u8,
    cells: [[Block; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl PieceShape {
    /// Side length of the square matrix.
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// Returns the matrix rows, each `size` cells long.
    pub fn rows(&self) -> impl Iterator<Item = &[Block]> {
        let size = usize::from(self.size);
        self.cells[..size].iter().map(move |row| &row[..size])
    }

    /// Returns the `(dx, dy)` offset of every filled cell, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..self.size).flat_map(move |dy| {
            (0..self.size)
                .filter(move |&dx| !self.cells[usize::from(dy)][usize::from(dx)].is_empty())
                .map(move |dx| (dx, dy))
        })
    }

    /// Rotates the matrix 90° clockwise: transpose, then reverse each row.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        let size = self.size as usize;
        let mut cells = [[Block::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                cells[y][x] = self.cells[size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        Self {
            size: self.size,
            cells,
        }
    }
}

impl Serialize for PieceShape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // One string per matrix row, e.g. [".T.", "TTT", "..."]
        serializer.collect_seq(
            self.rows()
                .map(|row| row.iter().map(|b| b.as_char()).collect::<String>()),
        )
    }
}

const SPAWN_SHAPES: [PieceShape; PieceKind::LEN] = {
    use Block::Empty as E;
    const I: Block = Block::Piece(PieceKind::I);
    const O: Block = Block::Piece(PieceKind::O);
    const T: Block = Block::Piece(PieceKind::T);
    const L: Block = Block::Piece(PieceKind::L);
    const J: Block = Block::Piece(PieceKind::J);
    const S: Block = Block::Piece(PieceKind::S);
    const Z: Block = Block::Piece(PieceKind::Z);
    const EEEE: [Block; 4] = [E; 4];

    const fn shape(size: u8, cells: [[Block; 4]; 4]) -> PieceShape {
        PieceShape { size, cells }
    }

    [
        shape(4, [EEEE, [I, I, I, I], EEEE, EEEE]),
        shape(2, [[O, O, E, E], [O, O, E, E], EEEE, EEEE]),
        shape(3, [[E, T, E, E], [T, T, T, E], EEEE, EEEE]),
        shape(3, [[E, E, L, E], [L, L, L, E], EEEE, EEEE]),
        shape(3, [[J, E, E, E], [J, J, J, E], EEEE, EEEE]),
        shape(3, [[E, S, S, E], [S, S, E, E], EEEE, EEEE]),
        shape(3, [[Z, Z, E, E], [E, Z, Z, E], EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn shape_rows(shape: &PieceShape) -> Vec<String> {
        shape
            .rows()
            .map(|row| row.iter().map(|b| b.as_char()).collect())
            .collect()
    }

    #[test]
    fn test_spawn_shapes() {
        let shapes = PieceKind::ALL.map(|kind| shape_rows(&kind.spawn_shape()));
        assert_eq!(shapes[0], ["....", "IIII", "....", "...."]);
        assert_eq!(shapes[1], ["OO", "OO"]);
        assert_eq!(shapes[2], [".T.", "TTT", "..."]);
        assert_eq!(shapes[3], ["..L", "LLL", "..."]);
        assert_eq!(shapes[4], ["J..", "JJJ", "..."]);
        assert_eq!(shapes[5], [".SS", "SS.", "..."]);
        assert_eq!(shapes[6], ["ZZ.", ".ZZ", "..."]);
    }

    #[test]
    fn test_every_piece_has_four_cells() {
        for kind in PieceKind::ALL {
            let mut shape = kind.spawn_shape();
            for _ in 0..4 {
                assert_eq!(shape.occupied_cells().count(), 4, "{kind:?}");
                shape = shape.rotated_right();
            }
        }
    }

    #[test]
    fn test_spawn_position_is_centered() {
        let cols = PieceKind::ALL.map(|kind| Piece::spawn_of(kind).position().col());
        // I: 5 - 4/2, O: 5 - 2/2, others: 5 - 3/2
        assert_eq!(cols, [3, 4, 4, 4, 4, 4, 4]);
        for kind in PieceKind::ALL {
            assert_eq!(Piece::spawn_of(kind).position().row(), 0);
        }
    }

    #[test]
    fn test_rotation_clockwise() {
        let t = PieceKind::T.spawn_shape().rotated_right();
        assert_eq!(shape_rows(&t), [".T.", ".TT", ".T."]);

        let i = PieceKind::I.spawn_shape().rotated_right();
        assert_eq!(shape_rows(&i), ["..I.", "..I.", "..I.", "..I."]);

        let l = PieceKind::L.spawn_shape().rotated_right();
        assert_eq!(shape_rows(&l), [".L.", ".L.", ".LL"]);
    }

    #[test]
    fn test_four_rotations_restore_shape() {
        for kind in PieceKind::ALL {
            let spawn = kind.spawn_shape();
            let half = spawn.rotated_right().rotated_right();
            let full = half.rotated_right().rotated_right();
            assert_eq!(full, spawn, "{kind:?}");
        }
    }

    #[test]
    fn test_o_rotation_is_identity() {
        let o = PieceKind::O.spawn_shape();
        assert_eq!(o.rotated_right(), o);
    }

    #[test]
    fn test_occupied_positions_follow_anchor() {
        let piece = Piece::new(PieceKind::O, PiecePosition::new(-1, -1));
        let mut positions = piece.occupied_positions().collect::<Vec<_>>();
        positions.sort_unstable();
        assert_eq!(positions, [(-1, -1), (-1, 0), (0, -1), (0, 0)]);
    }

    #[test]
    fn test_piece_kind_tags() {
        for (i, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(kind.tag()), i + 1);
            assert_eq!(PieceKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_tag(0), None);
        assert_eq!(PieceKind::from_tag(8), None);
    }

    #[test]
    fn test_spawn_is_deterministic_and_covers_all_kinds() {
        let mut rng1 = Pcg32::seed_from_u64(7);
        let mut rng2 = Pcg32::seed_from_u64(7);
        let mut seen = [false; PieceKind::LEN];
        for _ in 0..200 {
            let piece = Piece::spawn(&mut rng1);
            assert_eq!(piece, Piece::spawn(&mut rng2));
            assert_eq!(piece, Piece::spawn_of(piece.kind()));
            seen[usize::from(piece.kind().tag()) - 1] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece::spawn_of(PieceKind::S);
        let value = serde_json::to_value(piece).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "kind": "S",
                "position": { "col": 4, "row": 0 },
                "shape": [".SS", "SS.", "..."],
            })
        );
    }
}
