use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Board};

use super::ActiveBlock;

/// Flat state vector consumed by the learning agent.
///
/// Layout, in order:
///
/// 1. shape index, block origin x, block origin y, cumulative rotation
///    angle in degrees (4 elements)
/// 2. every board cell in row-major order, 1.0 occupied / 0.0 empty
///    (200 elements)
/// 3. per column, the topmost occupied row index, or 20 for an empty
///    column (10 elements)
///
/// The element count ([`Observation::LEN`] = 214) and ordering are the
/// contract the agent's input dimension depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    values: [f32; Self::LEN],
}

impl Observation {
    /// Number of elements in the state vector.
    pub const LEN: usize = 4 + BOARD_WIDTH * BOARD_HEIGHT + BOARD_WIDTH;

    /// Captures the state vector for the given board and block.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn capture(board: &Board, block: &ActiveBlock) -> Self {
        let mut values = [0.0_f32; Self::LEN];
        values[0] = block.kind().index() as f32;
        values[1] = f32::from(block.x());
        values[2] = f32::from(block.y());
        values[3] = f32::from(block.rotation_angle());

        let mut i = 4;
        for row in board.rows() {
            for occupied in row.iter_cells() {
                values[i] = f32::from(u8::from(occupied));
                i += 1;
            }
        }
        for x in 0..BOARD_WIDTH {
            values[i] = board.column_top(x) as f32;
            i += 1;
        }
        debug_assert_eq!(i, Self::LEN);

        Self { values }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
