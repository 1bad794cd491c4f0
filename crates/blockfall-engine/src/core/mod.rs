pub use self::{board::*, shape::*};

pub(crate) mod board;
pub(crate) mod shape;

/// Number of playable columns.
pub const BOARD_WIDTH: usize = 10;
/// Number of playable rows. Row 0 is the top; indices grow downward.
pub const BOARD_HEIGHT: usize = 20;
