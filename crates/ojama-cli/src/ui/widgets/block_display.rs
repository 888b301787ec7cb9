use ojama_engine::{Block, PieceKind};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use super::style;

/// One playfield cell, two terminal columns wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const EMPTY: Self = Self::new(style::EMPTY_DOT, ".");
    pub const GHOST: Self = Self::new(style::GHOST, "[]");
    pub const FALLING_GARBAGE: Self = Self::new(style::FALLING_GARBAGE, "▒▒");

    pub const WIDTH: u16 = 2;
    pub const HEIGHT: u16 = 1;

    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub const fn from_block(block: Block) -> Self {
        match block {
            Block::Empty => Self::EMPTY,
            Block::Garbage => Self::new(style::GARBAGE, "▓▓"),
            Block::Piece(kind) => Self::new(piece_style(kind), ""),
        }
    }
}

const fn piece_style(kind: PieceKind) -> Style {
    match kind {
        PieceKind::I => style::I_BLOCK,
        PieceKind::O => style::O_BLOCK,
        PieceKind::T => style::T_BLOCK,
        PieceKind::L => style::L_BLOCK,
        PieceKind::J => style::J_BLOCK,
        PieceKind::S => style::S_BLOCK,
        PieceKind::Z => style::Z_BLOCK,
    }
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Paragraph fills the whole area, not just the cells covered by the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
