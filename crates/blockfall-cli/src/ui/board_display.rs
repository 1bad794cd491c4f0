use blockfall_engine::{ActiveBlock, BOARD_HEIGHT, BOARD_WIDTH, Board};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Terminal columns per board cell.
const CELL_WIDTH: u16 = 2;

/// Renders the settled board, optionally with the active block overlaid.
#[derive(Debug)]
pub(crate) struct BoardDisplay<'a> {
    board: &'a Board,
    block: Option<&'a ActiveBlock>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board, block: None }
    }

    pub fn active_block(self, block: &'a ActiveBlock) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Terminal columns needed for the full grid.
    #[expect(clippy::cast_possible_truncation)]
    pub const fn width() -> u16 {
        BOARD_WIDTH as u16 * CELL_WIDTH
    }

    /// Terminal rows needed for the full grid.
    #[expect(clippy::cast_possible_truncation)]
    pub const fn height() -> u16 {
        BOARD_HEIGHT as u16
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (y, row) in self.board.rows().enumerate() {
            for (x, occupied) in row.iter_cells().enumerate() {
                if occupied {
                    draw_cell(area, buf, x, y, Color::Gray);
                }
            }
        }

        if let Some(block) = self.block {
            for (x, y) in block.occupied_positions() {
                let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                    continue;
                };
                if x < BOARD_WIDTH && y < BOARD_HEIGHT {
                    draw_cell(area, buf, x, y, Color::Red);
                }
            }
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
fn draw_cell(area: Rect, buf: &mut Buffer, x: usize, y: usize, color: Color) {
    let cx = area.x + x as u16 * CELL_WIDTH;
    let cy = area.y + y as u16;
    if cx + CELL_WIDTH <= area.right() && cy < area.bottom() {
        buf.set_string(cx, cy, "██", Style::default().fg(color));
    }
}
