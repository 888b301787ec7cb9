use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    COLS, ROWS,
    piece::{Piece, PieceKind},
};

/// A single cell of the playfield.
///
/// Each variant maps to a numeric tag: `0` for [`Block::Empty`], `1..=7` for settled
/// pieces (see [`PieceKind::tag`]) and `8` for [`Block::Garbage`]. Settled pieces and
/// garbage are equally solid; the distinction only matters for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Locked cell of a piece of the given kind.
    Piece(PieceKind),
    /// Obstruction block merged in by a garbage unit.
    Garbage,
}

impl Block {
    /// Numeric tag of [`Block::Garbage`].
    pub const GARBAGE_TAG: u8 = 8;

    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Block::Empty)
    }

    /// Returns the numeric cell tag (`0`, `1..=7` or `8`).
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Block::Empty => 0,
            Block::Piece(kind) => kind.tag(),
            Block::Garbage => Self::GARBAGE_TAG,
        }
    }

    /// Parses a numeric cell tag.
    ///
    /// ```
    /// use ojama_engine::{Block, PieceKind};
    ///
    /// assert_eq!(Block::from_tag(0), Some(Block::Empty));
    /// assert_eq!(Block::from_tag(3), Some(Block::Piece(PieceKind::T)));
    /// assert_eq!(Block::from_tag(8), Some(Block::Garbage));
    /// assert_eq!(Block::from_tag(9), None);
    /// ```
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Block::Empty),
            Self::GARBAGE_TAG => Some(Block::Garbage),
            _ => match PieceKind::from_tag(tag) {
                Some(kind) => Some(Block::Piece(kind)),
                None => None,
            },
        }
    }

    /// Returns the single character used in the text form of a [`Grid`].
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Piece(kind) => kind.as_char(),
            Block::Garbage => '#',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Block::Empty),
            '#' => Some(Block::Garbage),
            _ => match PieceKind::from_char(c) {
                Some(kind) => Some(Block::Piece(kind)),
                None => None,
            },
        }
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.tag())
    }
}

/// A single row of the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRow {
    cells: [Block; COLS],
}

impl GridRow {
    pub const EMPTY: Self = Self {
        cells: [Block::Empty; COLS],
    };

    #[must_use]
    pub fn cells(&self) -> &[Block; COLS] {
        &self.cells
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }
}

/// The settled blocks of the playfield.
///
/// The grid is always [`COLS`] wide and [`ROWS`] tall. Row `0` is the top visible row and
/// rows grow downward. Coordinates passed to the query methods are signed so that
/// pieces partially above the visible area can be checked without special cases.
///
/// # Text form
///
/// A grid formats to (and parses from) [`ROWS`] lines of [`COLS`] characters, one
/// [`Block::as_char`] per cell:
///
/// ```
/// use ojama_engine::{Block, Grid};
///
/// let mut text = "..........\n".repeat(19);
/// text.push_str("IIII.#OOOO\n");
///
/// let grid: Grid = text.parse().unwrap();
/// assert_eq!(grid.cell(5, 19), Some(Block::Garbage));
/// assert!(grid.is_occupied(0, 19));
/// assert!(!grid.is_occupied(4, 19));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [GridRow; ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const EMPTY: Self = Self {
        rows: [GridRow::EMPTY; ROWS],
    };

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Block; COLS]> {
        self.rows.iter().map(GridRow::cells)
    }

    /// Returns the cell at the given position, or `None` outside the playfield.
    #[must_use]
    pub fn cell(&self, col: i32, row: i32) -> Option<Block> {
        let col = usize::try_from(col).ok()?;
        let row = usize::try_from(row).ok()?;
        self.rows.get(row)?.cells.get(col).copied()
    }

    /// Overwrites a single cell.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the playfield.
    pub fn set_cell(&mut self, col: usize, row: usize, block: Block) {
        self.rows[row].cells[col] = block;
    }

    /// Returns whether a position blocks a piece cell.
    ///
    /// - Columns outside `0..COLS` are occupied (side walls).
    /// - Rows at or below [`ROWS`] are occupied (floor).
    /// - Rows above the playfield (`row < 0`) are free.
    /// - Otherwise the position is occupied iff the cell is not empty.
    #[must_use]
    pub fn is_occupied(&self, col: i32, row: i32) -> bool {
        let Some(col) = usize::try_from(col).ok().filter(|&col| col < COLS) else {
            return true;
        };
        let Ok(row) = usize::try_from(row) else {
            return false;
        };
        self.rows
            .get(row)
            .is_none_or(|grid_row| !grid_row.cells[col].is_empty())
    }

    /// Writes the piece's cells into the grid with the piece's kind.
    ///
    /// Cells above the visible area are dropped.
    pub fn place(&mut self, piece: &Piece) {
        let block = Block::Piece(piece.kind());
        for (col, row) in piece.occupied_positions() {
            let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
                continue;
            };
            if let Some(cell) = self
                .rows
                .get_mut(row)
                .and_then(|grid_row| grid_row.cells.get_mut(col))
            {
                *cell = block;
            }
        }
    }

    /// Clears filled rows and returns the number of rows cleared.
    ///
    /// Remaining rows keep their relative order and shift down; empty rows are
    /// inserted at the top.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..ROWS).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(GridRow::EMPTY);
        count
    }

    /// Returns the row of the highest settled cell in a column.
    #[must_use]
    pub fn column_top(&self, col: usize) -> Option<usize> {
        self.rows
            .iter()
            .position(|grid_row| grid_row.cells.get(col).is_some_and(|b| !b.is_empty()))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for block in row {
                write!(f, "{}", block.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridParseError {
    #[display("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[display("row {row}: expected {expected} cells, got {actual}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("row {row}: invalid cell character {ch:?}")]
    InvalidCell { row: usize, ch: char },
}

impl FromStr for Grid {
    type Err = GridParseError;

    /// Parses the text form. Surrounding whitespace on each line and blank lines are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        if lines.len() != ROWS {
            return Err(GridParseError::RowCount {
                expected: ROWS,
                actual: lines.len(),
            });
        }

        let mut grid = Grid::EMPTY;
        for (row, (line, grid_row)) in lines.iter().zip(&mut grid.rows).enumerate() {
            let width = line.chars().count();
            if width != COLS {
                return Err(GridParseError::RowWidth {
                    row,
                    expected: COLS,
                    actual: width,
                });
            }
            for (ch, cell) in line.chars().zip(&mut grid_row.cells) {
                *cell = Block::from_char(ch).ok_or(GridParseError::InvalidCell { row, ch })?;
            }
        }
        Ok(grid)
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // One string per row, e.g. "..TTT..##."
        serializer.collect_seq(
            self.rows()
                .map(|row| row.iter().map(|b| b.as_char()).collect::<String>()),
        )
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        rows.join("\n").parse().map_err(serde::de::Error::custom)
    }
}
