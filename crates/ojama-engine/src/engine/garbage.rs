use rand::Rng;
use serde::Serialize;

use crate::core::{Block, COLS, Grid, ROWS, signed};

/// Probability that a column of a new garbage row is left open.
pub const GARBAGE_HOLE_PROBABILITY: f64 = 0.3;
/// Vertical position a garbage unit starts from (just above the visible grid).
pub const GARBAGE_SPAWN_ROW: f64 = -1.0;
/// Rows a garbage unit descends per tick.
pub const GARBAGE_SPEED: f64 = 0.5;

/// An obstruction row falling from the top of the playfield.
///
/// The unit descends independently of the active piece with sub-row precision and
/// merges into the grid once it reaches its landing row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GarbageUnit {
    pattern: [Block; COLS],
    row: f64,
    speed: f64,
}

impl GarbageUnit {
    /// Builds a unit with a random hole pattern at the spawn row.
    ///
    /// Each column is independently left empty with [`GARBAGE_HOLE_PROBABILITY`].
    pub fn emit<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let pattern = std::array::from_fn(|_| {
            if rng.random_bool(GARBAGE_HOLE_PROBABILITY) {
                Block::Empty
            } else {
                Block::Garbage
            }
        });
        Self::with_pattern(pattern)
    }

    /// Builds a unit with an explicit pattern at the spawn row.
    ///
    /// Any non-empty cell in `pattern` is treated as a garbage block.
    #[must_use]
    pub fn with_pattern(pattern: [Block; COLS]) -> Self {
        Self {
            pattern: pattern.map(|b| if b.is_empty() { b } else { Block::Garbage }),
            row: GARBAGE_SPAWN_ROW,
            speed: GARBAGE_SPEED,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &[Block; COLS] {
        &self.pattern
    }

    /// Current vertical position, in rows (fractional while falling).
    #[must_use]
    pub fn row(&self) -> f64 {
        self.row
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Returns the columns holding a garbage block.
    pub fn occupied_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.pattern
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(|(col, _)| col)
    }

    /// Returns the row this unit would merge into on the given grid.
    ///
    /// This is the lowest row that is above every settled block in the unit's
    /// occupied columns, or the floor row for columns without settled blocks. It is
    /// negative when a column is already filled up to the top row.
    #[must_use]
    pub fn landing_row(&self, grid: &Grid) -> i32 {
        self.occupied_columns()
            .filter_map(|col| grid.column_top(col))
            .map(|top| signed(top) - 1)
            .fold(signed(ROWS) - 1, i32::min)
    }

    /// Moves the unit down by its speed and merges it into the grid once it reaches
    /// its landing row.
    ///
    /// Returns `true` when the unit has landed and should be discarded. When the landing
    /// row is above the grid the unit is discarded without writing anything.
    pub fn advance(&mut self, grid: &mut Grid) -> bool {
        self.row += self.speed;
        let landing_row = self.landing_row(grid);
        if self.row < f64::from(landing_row) {
            return false;
        }
        if let Ok(row) = usize::try_from(landing_row) {
            for col in self.occupied_columns() {
                grid.set_cell(col, row, Block::Garbage);
            }
        }
        true
    }
}

/// The in-flight garbage units of a session, in emission order.
#[derive(Debug, Clone, Default)]
pub struct GarbageInjector {
    units: Vec<GarbageUnit>,
}

impl GarbageInjector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn units(&self) -> &[GarbageUnit] {
        &self.units
    }

    /// Emits a new random unit and returns it.
    pub fn emit<R>(&mut self, rng: &mut R) -> &GarbageUnit
    where
        R: Rng + ?Sized,
    {
        self.push(GarbageUnit::emit(rng))
    }

    pub fn push(&mut self, unit: GarbageUnit) -> &GarbageUnit {
        self.units.push(unit);
        &self.units[self.units.len() - 1]
    }

    /// Advances every unit in emission order and returns how many landed.
    ///
    /// A unit that merges changes the grid before the next unit computes its landing row.
    pub fn advance_all(&mut self, grid: &mut Grid) -> usize {
        let before = self.units.len();
        self.units.retain_mut(|unit| !unit.advance(grid));
        before - self.units.len()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::PieceKind;

    use super::*;

    const E: Block = Block::Empty;
    const G: Block = Block::Garbage;

    fn alternating() -> [Block; COLS] {
        [G, E, G, E, G, E, G, E, G, E]
    }

    #[test]
    fn test_emit_starts_above_grid() {
        let mut rng = Pcg32::seed_from_u64(1);
        let unit = GarbageUnit::emit(&mut rng);
        assert!((unit.row() - GARBAGE_SPAWN_ROW).abs() < f64::EPSILON);
        assert!((unit.speed() - GARBAGE_SPEED).abs() < f64::EPSILON);
        assert!(
            unit.pattern()
                .iter()
                .all(|&b| b == Block::Empty || b == Block::Garbage)
        );
    }

    #[test]
    fn test_emit_hole_ratio() {
        let mut rng = Pcg32::seed_from_u64(42);
        let holes = (0..1000)
            .flat_map(|_| *GarbageUnit::emit(&mut rng).pattern())
            .filter(|b| b.is_empty())
            .count();
        // 10_000 columns at 30%: far outside these bounds only with a broken generator
        assert!((2700..3300).contains(&holes), "holes = {holes}");
    }

    #[test]
    fn test_emit_is_deterministic() {
        let mut rng1 = Pcg32::seed_from_u64(9);
        let mut rng2 = Pcg32::seed_from_u64(9);
        for _ in 0..10 {
            assert_eq!(GarbageUnit::emit(&mut rng1), GarbageUnit::emit(&mut rng2));
        }
    }

    #[test]
    fn test_with_pattern_normalizes_blocks() {
        let mut pattern = [E; COLS];
        pattern[3] = Block::Piece(PieceKind::T);
        let unit = GarbageUnit::with_pattern(pattern);
        assert_eq!(unit.pattern()[3], G);
        assert_eq!(unit.occupied_columns().collect::<Vec<_>>(), [3]);
    }

    #[test]
    fn test_lands_on_floor_of_empty_grid() {
        let mut grid = Grid::EMPTY;
        let mut unit = GarbageUnit::with_pattern(alternating());
        assert_eq!(unit.landing_row(&grid), 19);

        // -1.0 -> 19.0 takes 40 half-row steps
        for _ in 0..39 {
            assert!(!unit.advance(&mut grid));
        }
        assert_eq!(grid, Grid::EMPTY);
        assert!(unit.advance(&mut grid));

        for col in 0..COLS {
            let expected = if col % 2 == 0 { G } else { E };
            assert_eq!(grid.cell(signed(col), 19), Some(expected));
        }
    }

    #[test]
    fn test_landing_row_uses_highest_stack() {
        let mut grid = Grid::EMPTY;
        grid.set_cell(0, 15, Block::Piece(PieceKind::O));
        grid.set_cell(2, 17, Block::Garbage);
        // Column 1 is a hole in the pattern, so its stack does not matter.
        grid.set_cell(1, 3, Block::Piece(PieceKind::I));

        let mut unit = GarbageUnit::with_pattern(alternating());
        assert_eq!(unit.landing_row(&grid), 14);

        while !unit.advance(&mut grid) {}

        for col in (0..COLS).step_by(2) {
            assert_eq!(grid.cell(signed(col), 14), Some(G), "col {col}");
        }
        // Nothing else was written.
        let garbage = grid
            .rows()
            .flatten()
            .filter(|&&b| b == Block::Garbage)
            .count();
        assert_eq!(garbage, 5 + 1);
    }

    #[test]
    fn test_full_column_discards_without_merging() {
        let mut grid = Grid::EMPTY;
        grid.set_cell(0, 0, Block::Piece(PieceKind::L));
        let before = grid.clone();

        let mut unit = GarbageUnit::with_pattern(alternating());
        assert_eq!(unit.landing_row(&grid), -1);
        assert!(unit.advance(&mut grid));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_injector_processes_in_emission_order() {
        let mut grid = Grid::EMPTY;
        let mut injector = GarbageInjector::new();
        injector.push(GarbageUnit::with_pattern([G; COLS]));
        injector.push(GarbageUnit::with_pattern([G; COLS]));
        assert_eq!(injector.units().len(), 2);

        let mut landed = 0;
        let mut ticks = 0;
        while !injector.units().is_empty() {
            landed += injector.advance_all(&mut grid);
            ticks += 1;
        }
        assert_eq!(landed, 2);
        // The first unit lands on the floor at tick 40; the second one then sees
        // row 19 filled, lands at row 18 which it had already passed, so it merges
        // on the same tick.
        assert_eq!(ticks, 40);
        assert_eq!(grid.rows().nth(18), Some(&[G; COLS]));
        assert_eq!(grid.rows().nth(19), Some(&[G; COLS]));
    }

    #[test]
    fn test_injector_clear() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut injector = GarbageInjector::new();
        injector.emit(&mut rng);
        injector.emit(&mut rng);
        injector.clear();
        assert!(injector.units().is_empty());
    }
}
