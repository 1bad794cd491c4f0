use rand::{Rng, distr::StandardUniform, prelude::Distribution};

/// Cell offsets of a shape, relative to the shape-local origin.
pub type ShapeCells = [(i16, i16); 4];

/// Identity of a falling-block shape.
///
/// The catalog is fixed: seven templates of four cells each. The enum
/// discriminant is the shape index exposed in the observation vector, so
/// the declaration order is part of the agent-facing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShapeKind {
    /// Four cells in a vertical line.
    Bar = 0,
    /// 2×2 block.
    Square = 1,
    /// Vertical line with a foot to the right.
    HookRight = 2,
    /// Vertical line with a foot to the left.
    HookLeft = 3,
    /// S-bend opening right.
    SkewRight = 4,
    /// S-bend opening left.
    SkewLeft = 5,
    /// Three-wide row with a single cell below its middle.
    Tee = 6,
}

const SHAPE_OFFSETS: [ShapeCells; ShapeKind::LEN] = [
    // Bar
    [(0, 0), (0, 1), (0, 2), (0, 3)],
    // Square
    [(0, 0), (0, 1), (1, 0), (1, 1)],
    // HookRight
    [(0, 0), (0, 1), (0, 2), (1, 2)],
    // HookLeft
    [(1, 0), (1, 1), (1, 2), (0, 2)],
    // SkewRight
    [(1, 0), (1, 1), (0, 1), (0, 2)],
    // SkewLeft
    [(0, 0), (0, 1), (1, 1), (1, 2)],
    // Tee
    [(0, 0), (1, 0), (1, 1), (2, 0)],
];

/// Truncated integer average of the cell offsets.
const fn centroid(cells: &ShapeCells) -> (i16, i16) {
    let mut sum_x = 0;
    let mut sum_y = 0;
    let mut i = 0;
    while i < cells.len() {
        sum_x += cells[i].0;
        sum_y += cells[i].1;
        i += 1;
    }
    (sum_x / 4, sum_y / 4)
}

const SHAPE_PIVOTS: [(i16, i16); ShapeKind::LEN] = {
    let mut pivots = [(0, 0); ShapeKind::LEN];
    let mut i = 0;
    while i < ShapeKind::LEN {
        pivots[i] = centroid(&SHAPE_OFFSETS[i]);
        i += 1;
    }
    pivots
};

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        match rng.random_range(0..=6) {
            0 => ShapeKind::Bar,
            1 => ShapeKind::Square,
            2 => ShapeKind::HookRight,
            3 => ShapeKind::HookLeft,
            4 => ShapeKind::SkewRight,
            5 => ShapeKind::SkewLeft,
            _ => ShapeKind::Tee,
        }
    }
}

impl ShapeKind {
    /// Number of shape templates (7).
    pub const LEN: usize = 7;

    /// All shapes in index order.
    pub const ALL: [Self; Self::LEN] = [
        Self::Bar,
        Self::Square,
        Self::HookRight,
        Self::HookLeft,
        Self::SkewRight,
        Self::SkewLeft,
        Self::Tee,
    ];

    /// Returns the index of this shape in the catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the cell offsets of this shape in spawn orientation.
    #[must_use]
    pub const fn offsets(self) -> ShapeCells {
        SHAPE_OFFSETS[self as usize]
    }

    /// Returns the rotation pivot: the truncated average of the spawn
    /// offsets. The pivot is fixed per shape and does not follow rotations.
    #[must_use]
    pub const fn pivot(self) -> (i16, i16) {
        SHAPE_PIVOTS[self as usize]
    }
}
