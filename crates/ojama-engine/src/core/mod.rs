pub use self::{grid::*, movement::*, piece::*};

pub(crate) mod grid;
pub(crate) mod movement;
pub(crate) mod piece;

/// Number of columns in the playfield.
pub const COLS: usize = 10;
/// Number of rows in the playfield.
pub const ROWS: usize = 20;

/// Converts a playfield index into a signed board coordinate.
///
/// Meant for values bounded by [`COLS`] / [`ROWS`].
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
#[must_use]
pub const fn signed(n: usize) -> i32 {
    n as i32
}
