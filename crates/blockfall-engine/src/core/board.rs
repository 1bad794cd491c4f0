use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::{BOARD_HEIGHT, BOARD_WIDTH};

// All cells of one row occupied.
const FULL_ROW_MASK: u16 = (1 << BOARD_WIDTH) - 1;

/// Single row of the board, stored as a bitmask.
///
/// Bit `x` (LSB first) corresponds to the cell in column `x`; only the low
/// [`BOARD_WIDTH`] bits are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow {
    bits: u16,
}

impl BoardRow {
    pub const EMPTY: Self = Self { bits: 0 };

    /// Checks if every cell in the row is occupied.
    #[inline]
    #[must_use]
    pub fn is_full(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    /// Checks if no cell in the row is occupied.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Checks if the cell in column `x` is occupied.
    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, x: usize) -> bool {
        debug_assert!(x < BOARD_WIDTH);
        (self.bits & (1 << x)) != 0
    }

    #[inline]
    fn occupy_cell(&mut self, x: usize) {
        debug_assert!(x < BOARD_WIDTH);
        self.bits |= 1 << x;
    }

    /// Iterates over the cells of the row, returning their occupied status.
    pub fn iter_cells(self) -> impl Iterator<Item = bool> {
        (0..BOARD_WIDTH).map(move |x| self.is_cell_occupied(x))
    }
}

/// The persistent grid of settled cells.
///
/// A fixed [`BOARD_WIDTH`] × [`BOARD_HEIGHT`] grid of binary cells. Row 0 is
/// the top; row indices grow downward. The dimensions never change; only
/// cell contents mutate, through [`Board::occupy`] when a falling block is
/// merged and [`Board::clear_full_rows`] when full rows are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_HEIGHT],
    };

    /// Returns the row at index `y`.
    #[must_use]
    pub fn row(&self, y: usize) -> BoardRow {
        self.rows[y]
    }

    /// Returns an iterator over all rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = BoardRow> + '_ {
        self.rows.iter().copied()
    }

    /// Checks if the cell at column `x`, row `y` is occupied.
    #[must_use]
    pub fn is_cell_occupied(&self, x: usize, y: usize) -> bool {
        self.rows[y].is_cell_occupied(x)
    }

    /// Marks the cell at column `x`, row `y` as occupied.
    pub fn occupy(&mut self, x: usize, y: usize) {
        self.rows[y].occupy_cell(x);
    }

    /// Checks if every cell in row `y` is occupied.
    #[must_use]
    pub fn is_full_row(&self, y: usize) -> bool {
        self.rows[y].is_full()
    }

    /// Checks if any cell in row `y` is occupied.
    #[must_use]
    pub fn is_row_occupied(&self, y: usize) -> bool {
        !self.rows[y].is_empty()
    }

    /// Removes every full row and inserts an empty row at the top for each,
    /// preserving the relative order of the remaining rows. Returns the
    /// number of rows removed.
    ///
    /// Rows are scanned bottom-up and shifted by the number of full rows
    /// found below them, so consecutive full rows cannot be skipped by
    /// re-indexing.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;

        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_full() {
                cleared += 1;
                continue;
            }
            if cleared > 0 {
                self.rows[y + cleared] = self.rows[y];
            }
        }

        self.rows[..cleared].fill(BoardRow::EMPTY);
        cleared
    }

    /// Counts holes: occupied cells whose cell directly below is empty.
    ///
    /// Each column is scanned downward; every occupied/empty vertical pair
    /// counts one hole. A gapless stack therefore has zero holes, while an
    /// overhanging cell counts one per uncovered cell below it.
    #[must_use]
    pub fn count_holes(&self) -> u32 {
        let mut holes = 0;
        for y in 0..BOARD_HEIGHT - 1 {
            let overhangs = self.rows[y].bits & !self.rows[y + 1].bits & FULL_ROW_MASK;
            holes += overhangs.count_ones();
        }
        holes
    }

    /// Returns the topmost occupied row index of column `x`, or
    /// [`BOARD_HEIGHT`] if the column is empty.
    #[must_use]
    pub fn column_top(&self, x: usize) -> usize {
        (0..BOARD_HEIGHT)
            .find(|&y| self.rows[y].is_cell_occupied(x))
            .unwrap_or(BOARD_HEIGHT)
    }

    /// Creates a `Board` from ASCII art for testing.
    ///
    /// `#` is an occupied cell and `.` an empty one. Each line must have
    /// exactly [`BOARD_WIDTH`] cells. Lines are bottom-aligned: the last
    /// line is the bottom row, so a stack can be described without writing
    /// out the empty rows above it.
    ///
    /// # Panics
    ///
    /// Panics if a line does not have exactly [`BOARD_WIDTH`] cells or if
    /// there are more than [`BOARD_HEIGHT`] lines.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "Expected at most {BOARD_HEIGHT} rows, got {}",
            lines.len()
        );

        let mut board = Self::EMPTY;
        let y0 = BOARD_HEIGHT - lines.len();
        for (dy, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                BOARD_WIDTH,
                "Each row must have exactly {BOARD_WIDTH} cells, got {} at line {dy}",
                cells.len()
            );
            for (x, &cell) in cells.iter().enumerate() {
                if cell == '#' {
                    board.occupy(x, y0 + dy);
                }
            }
        }
        board
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "000,3ff,...", one 3-digit hex value per row, top first.
        let mut hex = String::with_capacity(BOARD_HEIGHT * 4);
        for (y, row) in self.rows.iter().enumerate() {
            if y > 0 {
                hex.push(',');
            }
            write!(&mut hex, "{:03x}", row.bits).unwrap();
        }
        serializer.serialize_str(&hex)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != BOARD_HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {BOARD_HEIGHT} comma-separated hex values, got {}",
                parts.len()
            )));
        }

        let mut rows = [BoardRow::EMPTY; BOARD_HEIGHT];
        for (y, hex) in parts.iter().enumerate() {
            let bits = u16::from_str_radix(hex, 16).map_err(|e| {
                serde::de::Error::custom(format!("invalid hex at row {y}: {hex} ({e})"))
            })?;
            if bits > FULL_ROW_MASK {
                return Err(serde::de::Error::custom(format!(
                    "row {y} has bits outside the board: {hex}"
                )));
            }
            rows[y] = BoardRow { bits };
        }

        Ok(Board { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            assert!(!board.is_row_occupied(y));
            for x in 0..BOARD_WIDTH {
                assert!(!board.is_cell_occupied(x, y));
            }
        }
        assert_eq!(board.count_holes(), 0);
        for x in 0..BOARD_WIDTH {
            assert_eq!(board.column_top(x), BOARD_HEIGHT);
        }
    }

    #[test]
    fn test_occupy_and_query() {
        let mut board = Board::EMPTY;
        assert!(!board.is_cell_occupied(3, 7));
        board.occupy(3, 7);
        assert!(board.is_cell_occupied(3, 7));
        assert!(board.is_row_occupied(7));
        assert!(!board.is_full_row(7));
        assert_eq!(board.column_top(3), 7);
    }

    #[test]
    fn test_from_ascii_is_bottom_aligned() {
        let board = Board::from_ascii(
            r"
            #.........
            ##########
            ",
        );
        assert!(board.is_cell_occupied(0, BOARD_HEIGHT - 2));
        assert!(board.is_full_row(BOARD_HEIGHT - 1));
        assert!(!board.is_row_occupied(0));
    }

    #[test]
    fn test_clear_single_full_row() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ##########
            ",
        );
        assert_eq!(board.clear_full_rows(), 1);
        // The partial row shifts down to the bottom; everything else empties.
        assert!(board.is_cell_occupied(0, BOARD_HEIGHT - 1));
        assert!(!board.is_full_row(BOARD_HEIGHT - 1));
        for y in 0..BOARD_HEIGHT - 1 {
            assert!(!board.is_row_occupied(y));
        }
    }

    #[test]
    fn test_clear_preserves_row_order() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ##########
            .#........
            ##########
            ..#.......
            ",
        );
        assert_eq!(board.clear_full_rows(), 2);
        // Surviving rows keep their relative order, packed at the bottom.
        assert!(board.is_cell_occupied(0, BOARD_HEIGHT - 3));
        assert!(board.is_cell_occupied(1, BOARD_HEIGHT - 2));
        assert!(board.is_cell_occupied(2, BOARD_HEIGHT - 1));
        for y in 0..BOARD_HEIGHT - 3 {
            assert!(!board.is_row_occupied(y));
        }
    }

    #[test]
    fn test_clear_nothing_on_partial_rows() {
        let mut board = Board::from_ascii(
            r"
            #########.
            .#########
            ",
        );
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_all_rows() {
        let mut board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                board.occupy(x, y);
            }
        }
        assert_eq!(board.clear_full_rows(), BOARD_HEIGHT);
        assert_eq!(board, Board::EMPTY);
    }

    #[test]
    fn test_holes_zero_for_gapless_stack() {
        let board = Board::from_ascii(
            r"
            ###.......
            ##########
            ##########
            ",
        );
        assert_eq!(board.count_holes(), 0);
    }

    #[test]
    fn test_holes_count_overhangs() {
        // The single cell in column 4 sits above an empty cell.
        let board = Board::from_ascii(
            r"
            ....#.....
            ..........
            ##########
            ",
        );
        assert_eq!(board.count_holes(), 1);
    }

    #[test]
    fn test_holes_full_floating_row() {
        let board = Board::from_ascii(
            r"
            ##########
            ..........
            ",
        );
        assert_eq!(board.count_holes(), BOARD_WIDTH as u32);
    }

    #[test]
    fn test_column_top() {
        let board = Board::from_ascii(
            r"
            #.........
            #.#.......
            ##########
            ",
        );
        assert_eq!(board.column_top(0), BOARD_HEIGHT - 3);
        assert_eq!(board.column_top(1), BOARD_HEIGHT - 1);
        assert_eq!(board.column_top(2), BOARD_HEIGHT - 2);
        assert_eq!(board.column_top(9), BOARD_HEIGHT - 1);
    }

    #[test]
    fn test_board_serialization_round_trip() {
        let board = Board::from_ascii(
            r"
            .#........
            ###.......
            ##########
            ",
        );
        let serialized = serde_json::to_string(&board).unwrap();
        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_serialization_format() {
        let serialized = serde_json::to_string(&Board::EMPTY).unwrap();
        // 20 rows of 3 hex chars joined by 19 commas, plus the quotes.
        assert_eq!(serialized.len(), BOARD_HEIGHT * 3 + (BOARD_HEIGHT - 1) + 2);
        assert!(serialized.trim_matches('"').starts_with("000,000"));

        let mut board = Board::EMPTY;
        for x in 0..BOARD_WIDTH {
            board.occupy(x, BOARD_HEIGHT - 1);
        }
        let serialized = serde_json::to_string(&board).unwrap();
        assert!(serialized.trim_matches('"').ends_with("3ff"));
    }

    #[test]
    fn test_board_deserialization_errors() {
        // Too few rows.
        assert!(serde_json::from_str::<Board>("\"000,000\"").is_err());
        // Not hex.
        let bad: String = std::iter::repeat_n("zzz", BOARD_HEIGHT)
            .collect::<Vec<_>>()
            .join(",");
        assert!(serde_json::from_str::<Board>(&format!("\"{bad}\"")).is_err());
        // Bits outside the playable width.
        let wide: String = std::iter::repeat_n("fff", BOARD_HEIGHT)
            .collect::<Vec<_>>()
            .join(",");
        assert!(serde_json::from_str::<Board>(&format!("\"{wide}\"")).is_err());
    }
}
