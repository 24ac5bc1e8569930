//! Board model: a fixed 4×4 grid of tile values where 0 is an empty cell.
//!
//! Boards are small `Copy` values. Every transform returns a new board, so a
//! committed move replaces the board wholesale instead of editing it in place.

use std::fmt;

/// Side length of the square board.
pub const BOARD_SIZE: usize = 4;

/// One row or column, oriented so that index 0 is the side tiles slide toward.
pub type Line = [u32; BOARD_SIZE];

/// Cell coordinate. `row` 0 is the top, `col` 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[inline]
pub fn reverse_line(mut line: Line) -> Line {
    line.reverse();
    line
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [Line; BOARD_SIZE],
}

impl Board {
    pub const EMPTY: Self = Self {
        cells: [[0; BOARD_SIZE]; BOARD_SIZE],
    };

    pub const fn from_rows(cells: [Line; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn rows(&self) -> &[Line; BOARD_SIZE] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> u32 {
        self.cells[pos.row][pos.col]
    }

    /// Copy of this board with one cell replaced.
    #[must_use]
    pub fn with(mut self, pos: Pos, value: u32) -> Self {
        self.cells[pos.row][pos.col] = value;
        self
    }

    /// Rows become columns. Applying it twice gives back the original board.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self {
            cells: std::array::from_fn(|r| std::array::from_fn(|c| self.cells[c][r])),
        }
    }

    /// Mirror every row left to right. Self-inverse like `transpose`.
    #[must_use]
    pub fn reverse_rows(&self) -> Self {
        Self {
            cells: self.cells.map(reverse_line),
        }
    }

    /// Every empty coordinate in row-major order.
    pub fn empty_cells(&self) -> Vec<Pos> {
        self.positions().filter(|&p| self.get(p) == 0).collect()
    }

    pub fn has_empty(&self) -> bool {
        self.cells.iter().flatten().any(|&v| v == 0)
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values; unchanged by sliding and merging.
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| u64::from(v)).sum()
    }

    /// Number of non-empty cells.
    pub fn tile_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// All coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Pos::new(row, col)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                if *v == 0 {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{:>5}", v)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Board {
        Board::from_rows([[2, 0, 4, 8], [0, 16, 0, 0], [32, 0, 0, 2], [0, 0, 0, 4]])
    }

    fn tile() -> impl Strategy<Value = u32> {
        prop_oneof![Just(0u32), (1u32..=11).prop_map(|e| 1 << e)]
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let t = sample().transpose();
        assert_eq!(t.rows()[0], [2, 0, 32, 0]);
        assert_eq!(t.get(Pos::new(1, 1)), 16);
        assert_eq!(t.get(Pos::new(3, 0)), 8);
    }

    #[test]
    fn reverse_rows_mirrors_each_row() {
        let r = sample().reverse_rows();
        assert_eq!(r.rows()[0], [8, 4, 0, 2]);
        assert_eq!(r.rows()[3], [4, 0, 0, 0]);
    }

    #[test]
    fn empty_cells_are_row_major() {
        let empty = sample().empty_cells();
        assert_eq!(empty.len(), 9);
        assert_eq!(empty[0], Pos::new(0, 1));
        assert_eq!(empty[8], Pos::new(3, 2));
        assert!(Board::EMPTY.has_empty());
        assert_eq!(Board::EMPTY.empty_cells().len(), BOARD_SIZE * BOARD_SIZE);
    }

    #[test]
    fn with_leaves_original_untouched() {
        let b = sample();
        let c = b.with(Pos::new(0, 1), 2);
        assert_eq!(b.get(Pos::new(0, 1)), 0);
        assert_eq!(c.get(Pos::new(0, 1)), 2);
    }

    #[test]
    fn aggregates() {
        let b = sample();
        assert_eq!(b.max_tile(), 32);
        assert_eq!(b.tile_sum(), 68);
        assert_eq!(b.tile_count(), 7);
        assert_eq!(Board::EMPTY.max_tile(), 0);
    }

    proptest! {
        #[test]
        fn transforms_are_self_inverse(rows in prop::array::uniform4(prop::array::uniform4(tile()))) {
            let b = Board::from_rows(rows);
            prop_assert_eq!(b.transpose().transpose(), b);
            prop_assert_eq!(b.reverse_rows().reverse_rows(), b);
        }
    }
}
