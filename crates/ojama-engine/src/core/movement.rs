//! Collision-checked translation and rotation of the falling piece.
//!
//! Every function validates against [`Grid::is_occupied`], so walls, the floor and
//! settled blocks all collide the same way, while rows above the playfield are free.

use crate::PieceCollisionError;

use super::{
    grid::Grid,
    piece::{Piece, PieceShape},
};

/// Checks whether `piece`, offset by `(d_col, d_row)` and optionally using `shape`
/// instead of its own, fits on the grid.
///
/// # Example
///
/// ```
/// use ojama_engine::{Grid, Piece, PieceKind, is_valid_placement};
///
/// let grid = Grid::EMPTY;
/// let piece = Piece::spawn_of(PieceKind::O);
///
/// assert!(is_valid_placement(&grid, &piece, 0, -5, None));
/// assert!(!is_valid_placement(&grid, &piece, -5, 0, None));
/// assert!(!is_valid_placement(&grid, &piece, 0, 19, None));
/// ```
#[must_use]
pub fn is_valid_placement(
    grid: &Grid,
    piece: &Piece,
    d_col: i32,
    d_row: i32,
    shape: Option<&PieceShape>,
) -> bool {
    let origin = piece.position().shifted(d_col, d_row);
    let shape = shape.unwrap_or(piece.shape());
    shape.occupied_cells().all(|(dx, dy)| {
        !grid.is_occupied(origin.col() + i32::from(dx), origin.row() + i32::from(dy))
    })
}

/// Moves the piece by `(d_col, d_row)` if the destination is free.
///
/// The piece is left untouched on failure.
pub fn try_move(
    grid: &Grid,
    piece: &mut Piece,
    d_col: i32,
    d_row: i32,
) -> Result<(), PieceCollisionError> {
    if !is_valid_placement(grid, piece, d_col, d_row, None) {
        return Err(PieceCollisionError);
    }
    *piece = piece.shifted(d_col, d_row);
    Ok(())
}

/// Rotates the piece 90° clockwise in place if the rotated shape fits.
///
/// There is no kick: a blocked rotation fails and the piece keeps its orientation.
pub fn try_rotate(grid: &Grid, piece: &mut Piece) -> Result<(), PieceCollisionError> {
    let rotated = piece.shape().rotated_right();
    if !is_valid_placement(grid, piece, 0, 0, Some(&rotated)) {
        return Err(PieceCollisionError);
    }
    *piece = piece.with_shape(rotated);
    Ok(())
}

/// Moves the piece down until it collides and returns the number of rows travelled.
pub fn hard_drop(grid: &Grid, piece: &mut Piece) -> usize {
    let mut distance = 0;
    while try_move(grid, piece, 0, 1).is_ok() {
        distance += 1;
    }
    distance
}

/// Returns where the piece would come to rest after a hard drop.
#[must_use]
pub fn drop_position(grid: &Grid, piece: &Piece) -> Piece {
    let mut dropped = *piece;
    hard_drop(grid, &mut dropped);
    dropped
}

#[cfg(test)]
mod tests {
    use crate::{Block, PieceKind, PiecePosition};

    use super::*;

    fn grid(text: &str) -> Grid {
        text.parse().unwrap()
    }

    #[test]
    fn test_rows_above_grid_are_valid() {
        let grid = Grid::EMPTY;
        let piece = Piece::spawn_of(PieceKind::I);
        assert!(is_valid_placement(&grid, &piece, 0, -10, None));
        // Column range still applies above the grid
        assert!(!is_valid_placement(&grid, &piece, -4, -10, None));
        assert!(!is_valid_placement(&grid, &piece, 4, -10, None));
    }

    #[test]
    fn test_walls_and_floor() {
        let grid = Grid::EMPTY;
        // I spawns at col 3 filling cols 3..=6 on its second matrix row
        let piece = Piece::spawn_of(PieceKind::I);
        assert!(is_valid_placement(&grid, &piece, -3, 0, None));
        assert!(!is_valid_placement(&grid, &piece, -4, 0, None));
        assert!(is_valid_placement(&grid, &piece, 3, 0, None));
        assert!(!is_valid_placement(&grid, &piece, 4, 0, None));
        // Filled row of the I sits at matrix row 1: row 19 is the last valid one
        assert!(is_valid_placement(&grid, &piece, 0, 18, None));
        assert!(!is_valid_placement(&grid, &piece, 0, 19, None));
    }

    #[test]
    fn test_valid_placement_matches_overlap() {
        let mut grid = Grid::EMPTY;
        grid.set_cell(5, 10, Block::Garbage);
        let piece = Piece::new(PieceKind::T, PiecePosition::new(4, 0));

        // Every offset is valid iff no filled cell lands on (5, 10) or outside the walls/floor.
        for d_row in -3..=20 {
            for d_col in -6..=8 {
                let moved = piece.shifted(d_col, d_row);
                let overlaps = moved.occupied_positions().any(|(c, r)| {
                    !(0..10).contains(&c) || r >= 20 || (c, r) == (5, 10)
                });
                assert_eq!(
                    is_valid_placement(&grid, &piece, d_col, d_row, None),
                    !overlaps,
                    "offset ({d_col}, {d_row})"
                );
            }
        }
    }

    #[test]
    fn test_shape_override() {
        let grid = Grid::EMPTY;
        // Vertical I hanging off the bottom is invalid, horizontal one is fine
        let piece = Piece::spawn_of(PieceKind::I).shifted(0, 17);
        let vertical = piece.shape().rotated_right();
        assert!(is_valid_placement(&grid, &piece, 0, 0, None));
        assert!(!is_valid_placement(&grid, &piece, 0, 0, Some(&vertical)));
    }

    #[test]
    fn test_o_piece_falls_to_row_18() {
        let grid = Grid::EMPTY;
        let mut piece = Piece::spawn_of(PieceKind::O);
        assert_eq!(piece.position(), PiecePosition::new(4, 0));

        for step in 0..18 {
            assert!(try_move(&grid, &mut piece, 0, 1).is_ok(), "step {step}");
        }
        assert_eq!(piece.position(), PiecePosition::new(4, 18));
        assert_eq!(try_move(&grid, &mut piece, 0, 1), Err(PieceCollisionError));
        assert_eq!(piece.position(), PiecePosition::new(4, 18));
    }

    #[test]
    fn test_failed_move_leaves_piece_unchanged() {
        let grid = grid(&format!("{}#.........\n", "..........\n".repeat(19)));
        let mut piece = Piece::new(PieceKind::L, PiecePosition::new(0, 17));
        let before = piece;

        assert!(try_move(&grid, &mut piece, -1, 0).is_err());
        assert_eq!(piece, before);
        // The L's bottom row would land on the block at (0, 19)
        assert!(try_move(&grid, &mut piece, 0, 1).is_err());
        assert_eq!(piece, before);
    }

    #[test]
    fn test_rotate_unobstructed() {
        let grid = Grid::EMPTY;
        let mut piece = Piece::spawn_of(PieceKind::T).shifted(0, 5);
        let original = piece;

        for _ in 0..4 {
            assert!(try_rotate(&grid, &mut piece).is_ok());
        }
        assert_eq!(piece, original);
    }

    #[test]
    fn test_rotate_blocked_keeps_orientation() {
        let grid = Grid::EMPTY;
        // Horizontal I on the floor: the vertical shape would go through it.
        let mut piece = Piece::spawn_of(PieceKind::I).shifted(0, 18);
        let before = piece;

        assert_eq!(try_rotate(&grid, &mut piece), Err(PieceCollisionError));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_rotate_blocked_by_wall_without_kick() {
        let grid = Grid::EMPTY;
        // Vertical I flush against the left wall (filled column is matrix column 2).
        let mut piece = Piece::spawn_of(PieceKind::I)
            .rotated_right()
            .shifted(-5, 5);
        assert!(piece.occupied_positions().all(|(c, _)| c == 0));
        let before = piece;

        assert!(try_rotate(&grid, &mut piece).is_err());
        assert_eq!(piece, before);
    }

    #[test]
    fn test_hard_drop_distance() {
        let grid = grid(&format!(
            "{}\
             ....#.....\n\
             ..........\n",
            "..........\n".repeat(18)
        ));
        let mut piece = Piece::spawn_of(PieceKind::O);

        // O covers cols 4..=5; the block at (4, 18) stops it with its bottom at row 17.
        assert_eq!(hard_drop(&grid, &mut piece), 16);
        assert_eq!(piece.position(), PiecePosition::new(4, 16));
        assert_eq!(hard_drop(&grid, &mut piece), 0);
    }

    #[test]
    fn test_drop_position_does_not_move_piece() {
        let grid = Grid::EMPTY;
        let piece = Piece::spawn_of(PieceKind::Z);
        let dropped = drop_position(&grid, &piece);
        assert_eq!(piece.position().row(), 0);
        assert_eq!(dropped.position().row(), 18);
    }
}
