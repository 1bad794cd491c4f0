use std::time::Duration;

use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Board, ShapeCells, ShapeKind};

#[expect(clippy::cast_possible_truncation)]
const MAX_X: i16 = (BOARD_WIDTH - 1) as i16;
#[expect(clippy::cast_possible_truncation)]
const MAX_Y: i16 = (BOARD_HEIGHT - 1) as i16;

/// The currently controllable falling piece.
///
/// Holds the shape identity, the current cell offsets (mutated by rotation),
/// the board-relative origin, the cumulative rotation angle, and the gravity
/// timer. Exactly one `ActiveBlock` exists at a time; it is owned by the
/// [`Game`](super::Game) and replaced when it merges into the board.
#[derive(Debug, Clone)]
pub struct ActiveBlock {
    kind: ShapeKind,
    cells: ShapeCells,
    x: i16,
    y: i16,
    rotation_angle: u16,
    gravity_interval: Duration,
    last_drop: Duration,
}

impl ActiveBlock {
    /// Spawn column for every new block.
    pub const SPAWN_X: i16 = 5;
    /// Spawn row for every new block.
    pub const SPAWN_Y: i16 = 0;

    /// Seconds per automatic downward step at normal gravity.
    pub const FALL_INTERVAL: Duration = Duration::from_secs(1);
    /// Gravity interval while soft-dropping.
    pub const SOFT_DROP_INTERVAL: Duration = Duration::from_millis(100);
    /// Gravity interval approximating an instant drop.
    pub const INSTANT_DROP_INTERVAL: Duration = Duration::from_millis(10);

    /// Creates a block of the given shape at the spawn origin, falling at
    /// normal gravity. `now` is the current time of the game's time source.
    ///
    /// There is no spawn-collision pre-check: a block spawned into a stack
    /// that already reaches the spawn rows simply lands almost immediately.
    #[must_use]
    pub fn spawn(kind: ShapeKind, now: Duration) -> Self {
        Self {
            kind,
            cells: kind.offsets(),
            x: Self::SPAWN_X,
            y: Self::SPAWN_Y,
            rotation_angle: 0,
            gravity_interval: Self::FALL_INTERVAL,
            last_drop: now,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn x(&self) -> i16 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i16 {
        self.y
    }

    /// Cumulative rotation angle in degrees (0, 90, 180 or 270).
    #[must_use]
    pub fn rotation_angle(&self) -> u16 {
        self.rotation_angle
    }

    #[must_use]
    pub fn cells(&self) -> &ShapeCells {
        &self.cells
    }

    /// Board coordinates of the four occupied cells.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.cells
            .iter()
            .map(move |&(dx, dy)| (self.x + dx, self.y + dy))
    }

    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        self.gravity_interval
    }

    pub fn set_gravity_interval(&mut self, interval: Duration) {
        self.gravity_interval = interval;
    }

    /// Attempts a horizontal translation by `dx` columns.
    ///
    /// The move is applied only when the translated shape stays within the
    /// board columns, and an applied move is reverted when the block would
    /// then be in contact with the floor or the stack. The net effect is
    /// that a move succeeds only if it is both in-bounds and contact-free.
    pub fn try_move(&mut self, dx: i16, board: &Board) {
        let (min_x, max_x, _) = cell_bounds(&self.cells);
        if self.x + dx + min_x >= 0 && self.x + dx + max_x <= MAX_X {
            self.x += dx;
            if self.has_landed(board) {
                self.x -= dx;
            }
        }
    }

    /// Attempts a 90° rotation about the shape centroid.
    ///
    /// Offsets are translated by −pivot, mapped through (x, y) → (y, −x),
    /// and translated back. The rotated shape replaces the current one only
    /// if every cell stays within the board columns, no cell ends up below
    /// the bottom row, and the result is not in contact with the floor or
    /// the stack. Otherwise the rotation is a no-op; there is no wall kick
    /// or alternate-rotation search.
    pub fn try_rotate(&mut self, board: &Board) {
        let (px, py) = self.kind.pivot();
        let mut rotated = self.cells;
        for cell in &mut rotated {
            let (mx, my) = (cell.0 - px, cell.1 - py);
            *cell = (my + px, -mx + py);
        }

        let (min_x, max_x, max_y) = cell_bounds(&rotated);
        let in_bounds = self.x + min_x >= 0 && self.x + max_x <= MAX_X && self.y + max_y <= MAX_Y;
        if in_bounds && !cells_landed(board, &rotated, self.x, self.y) {
            self.cells = rotated;
            self.rotation_angle = (self.rotation_angle + 90) % 360;
        }
    }

    /// Advances gravity: drops the block one row when more than the current
    /// interval has elapsed since the last drop. Returns whether a drop
    /// happened.
    pub fn step_gravity(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_drop) > self.gravity_interval {
            self.y += 1;
            self.last_drop = now;
            true
        } else {
            false
        }
    }

    /// Contact test: true when any cell sits on the bottom row or directly
    /// above an occupied cell. A landed block is ready to merge.
    #[must_use]
    pub fn has_landed(&self, board: &Board) -> bool {
        cells_landed(board, &self.cells, self.x, self.y)
    }
}

/// Minimum x, maximum x and maximum y over the cell offsets.
fn cell_bounds(cells: &ShapeCells) -> (i16, i16, i16) {
    cells.iter().fold(
        (i16::MAX, i16::MIN, i16::MIN),
        |(min_x, max_x, max_y), &(x, y)| (min_x.min(x), max_x.max(x), max_y.max(y)),
    )
}

/// Contact test for an arbitrary cell set at origin (`x`, `y`).
///
/// Out-of-range columns and rows below the board count as contact, so a
/// malformed position can never pass as free; cells entirely above the
/// board have nothing to rest on.
fn cells_landed(board: &Board, cells: &ShapeCells, x: i16, y: i16) -> bool {
    cells.iter().any(|&(dx, dy)| {
        let cy = y + dy;
        let Ok(cx) = usize::try_from(x + dx) else {
            return true;
        };
        if cx >= BOARD_WIDTH {
            return true;
        }
        if cy >= MAX_Y {
            return true;
        }
        let Ok(below) = usize::try_from(cy + 1) else {
            return false;
        };
        board.is_cell_occupied(cx, below)
    })
}
