use std::iter;

use ojama_engine::{Block, COLS, GarbageUnit, Grid, Piece, ROWS, signed};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::BlockDisplay;

#[allow(clippy::cast_possible_truncation)]
const GRID_WIDTH: u16 = COLS as u16 * BlockDisplay::WIDTH;
#[allow(clippy::cast_possible_truncation)]
const GRID_HEIGHT: u16 = ROWS as u16 * BlockDisplay::HEIGHT;

/// The playfield: settled blocks, falling garbage, the ghost and the active piece.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    grid: &'a Grid,
    garbage_units: &'a [GarbageUnit],
    ghost: Option<Piece>,
    active_piece: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            garbage_units: &[],
            ghost: None,
            active_piece: None,
            block: None,
        }
    }

    pub fn garbage_units(self, garbage_units: &'a [GarbageUnit]) -> Self {
        Self {
            garbage_units,
            ..self
        }
    }

    pub fn ghost(self, piece: Option<Piece>) -> Self {
        Self {
            ghost: piece,
            ..self
        }
    }

    pub fn active_piece(self, piece: Option<Piece>) -> Self {
        Self {
            active_piece: piece,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        GRID_WIDTH + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        GRID_HEIGHT + super::block_vertical_margin(self.block.as_ref())
    }

    /// Resolves what each cell shows; later layers cover earlier ones.
    fn cells(&self) -> [[BlockDisplay; COLS]; ROWS] {
        let mut cells = [[BlockDisplay::EMPTY; COLS]; ROWS];
        for (cells_row, grid_row) in iter::zip(&mut cells, self.grid.rows()) {
            *cells_row = grid_row.map(BlockDisplay::from_block);
        }

        let mut put = |col: i32, row: i32, display: BlockDisplay| {
            if let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row))
                && let Some(cell) = cells.get_mut(row).and_then(|r| r.get_mut(col))
            {
                *cell = display;
            }
        };
        for unit in self.garbage_units {
            let row = display_row(unit.row());
            for col in unit.occupied_columns() {
                put(signed(col), row, BlockDisplay::FALLING_GARBAGE);
            }
        }
        if let Some(ghost) = self.ghost {
            for (col, row) in ghost.occupied_positions() {
                put(col, row, BlockDisplay::GHOST);
            }
        }
        if let Some(piece) = self.active_piece {
            let display = BlockDisplay::from_block(Block::Piece(piece.kind()));
            for (col, row) in piece.occupied_positions() {
                put(col, row, display);
            }
        }
        cells
    }
}

/// Row a falling garbage unit is drawn on: the row it has fully entered.
#[expect(clippy::cast_possible_truncation)]
fn display_row(row: f64) -> i32 {
    row.floor() as i32
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..COLS).map(|_| Constraint::Length(BlockDisplay::WIDTH));
        let row_constraints = (0..ROWS).map(|_| Constraint::Length(BlockDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<ROWS>(&vertical)
            .into_iter()
            .map(|row| row.layout::<COLS>(&horizontal));

        for (area_row, cells_row) in iter::zip(grid_cells, self.cells()) {
            for (cell_area, display) in iter::zip(area_row, cells_row) {
                display.render(cell_area, buf);
            }
        }
    }
}
