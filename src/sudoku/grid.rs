#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The grid: an N²×N² cell matrix plus three "free-value" presence tables.
//!
//! The tables record, per row, per column and per block, whether each value is still
//! unplaced. They are a denormalized cache of the cell values that turns the legality check
//! ([`Grid::possible`]) into three bit lookups instead of a scan over up to 3·N² cells. The
//! price is a synchronization obligation: every mutation that places or unplaces a value must
//! update the tables in the same operation. [`Grid::mark_value_free`] is the only primitive
//! that writes the tables, and it is not part of the public API — all external mutation goes
//! through [`Grid::provide_value`], [`Grid::remove_candidate`] and the group-wide elimination
//! methods, each of which keeps cells and tables in lockstep.

use crate::sudoku::cell::Cell;
use crate::sudoku::position::Position;
use bit_vec::BitVec;
use core::fmt::{self, Display};
use thiserror::Error;

/// Error produced when constructing a grid from malformed raw values.
///
/// This is the only recoverable error the core knows: the caller gets the error, no grid, and
/// nothing to tear down. Allocation failure is fatal and handled by the global allocator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDataError {
    /// The input slice does not hold exactly size² values.
    #[error("expected {expected} cell values, got {actual}")]
    WrongCellCount {
        /// Required number of values (size²).
        expected: usize,
        /// Number of values actually supplied.
        actual: usize,
    },
    /// A supplied value exceeds the grid side (values are 0 for blank, else `1..=size`).
    #[error("value {value} at row {row}, column {column} exceeds the maximum of {max}")]
    ValueOutOfRange {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
        /// The out-of-range value.
        value: usize,
        /// Largest legal value (the grid side).
        max: usize,
    },
}

/// An N²×N² Sudoku grid with O(1) legality checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    n: usize,
    size: usize,
    cells: Vec<Cell>,
    row_free: BitVec,
    col_free: BitVec,
    block_free: BitVec,
}

impl Grid {
    /// Builds a grid of block size `n` from size² raw values in row-major order, 0 meaning
    /// blank.
    ///
    /// Every given value is placed and marked in the presence tables, then each unset cell's
    /// initial candidate set is computed with one grid-wide legality check per candidate.
    ///
    /// # Errors
    ///
    /// [`InvalidDataError`] if the slice is not exactly size² long or a value exceeds the
    /// grid side. No partially built grid survives the error path.
    pub fn from_values(n: usize, values: &[u32]) -> Result<Self, InvalidDataError> {
        let size = n * n;
        let cell_count = size * size;
        if values.len() != cell_count {
            return Err(InvalidDataError::WrongCellCount {
                expected: cell_count,
                actual: values.len(),
            });
        }

        let mut grid = Self {
            n,
            size,
            cells: vec![Cell::empty(size); cell_count],
            row_free: BitVec::from_elem(size * (size + 1), true),
            col_free: BitVec::from_elem(size * (size + 1), true),
            block_free: BitVec::from_elem(n * n * (size + 1), true),
        };

        for row in 0..size {
            for column in 0..size {
                let value = values[row * size + column] as usize;
                if value == 0 {
                    continue;
                }
                if value > size {
                    return Err(InvalidDataError::ValueOutOfRange {
                        row,
                        column,
                        value,
                        max: size,
                    });
                }
                grid.cells[row * size + column].set_value(value);
                grid.mark_value_free(false, row, column, value);
            }
        }

        // Candidates can only be derived once every given is in the tables.
        for row in 0..size {
            for column in 0..size {
                if grid.cells[row * size + column].has_value() {
                    continue;
                }
                for candidate in 1..=size {
                    if grid.possible(row, column, candidate) {
                        grid.cells[row * size + column].add_candidate(candidate);
                    }
                }
            }
        }

        Ok(grid)
    }

    /// The block size N.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// The grid side N².
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The cell at `(row, column)`.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.cells[row * self.size + column]
    }

    /// The axis index (row or column number) at which the block containing `index` starts.
    #[must_use]
    pub const fn block_index(&self, index: usize) -> usize {
        index - index % self.n
    }

    /// Whether `value` can legally be placed at `(row, column)`: it must not already be
    /// present in the row, the column or the block.
    ///
    /// Checks the column table first; profiling the lookup orders showed column, row, block
    /// to be the fastest, though any order is correct.
    #[must_use]
    pub fn possible(&self, row: usize, column: usize, value: usize) -> bool {
        self.col_free[column * (self.size + 1) + value]
            && self.row_free[row * (self.size + 1) + value]
            && self.block_free[self.block_table_index(row, column, value)]
    }

    /// Counts the values `1..=size` for which [`Grid::possible`] holds at `(row, column)`.
    ///
    /// This is the branching-factor measure used by the backtracking ordering heuristic. It
    /// is distinct from the cell's candidate count, which is a narrower, incrementally
    /// maintained set.
    #[must_use]
    pub fn possible_values_count(&self, row: usize, column: usize) -> usize {
        (1..=self.size)
            .filter(|&value| self.possible(row, column, value))
            .count()
    }

    /// Marks `value` as free (or not) in the row, column and block tables simultaneously.
    ///
    /// The single mutation path for the presence tables. Marking `true` after marking
    /// `false` exactly restores the prior state provided no other placement of `value`
    /// touched the same groups in between, which is what the backtracking undo relies on.
    pub(crate) fn mark_value_free(&mut self, is_free: bool, row: usize, column: usize, value: usize) {
        debug_assert!(row < self.size);
        debug_assert!(column < self.size);
        debug_assert!(value >= 1 && value <= self.size);
        self.col_free.set(column * (self.size + 1) + value, is_free);
        self.row_free.set(row * (self.size + 1) + value, is_free);
        let block = self.block_table_index(row, column, value);
        self.block_free.set(block, is_free);
    }

    const fn block_table_index(&self, row: usize, column: usize, value: usize) -> usize {
        ((row / self.n) * self.n + column / self.n) * (self.size + 1) + value
    }

    /// Removes `candidate` from the cell at `(row, column)`, returning whether anything
    /// changed.
    ///
    /// If the cell currently has exactly one candidate and it is `candidate`, the removal
    /// instead commits it as the cell's value (and updates the presence tables). Removing the
    /// last candidate and placing a forced value are thereby the same operation: callers
    /// never need a separate commit step.
    pub fn remove_candidate(&mut self, row: usize, column: usize, candidate: usize) -> bool {
        debug_assert!(candidate >= 1 && candidate <= self.size);
        let index = row * self.size + column;

        if self.cells[index].candidate_count() == 1 && self.cells[index].has_candidate(candidate) {
            self.cells[index].set_value(candidate);
            self.mark_value_free(false, row, column, candidate);
            return true;
        }

        self.cells[index].clear_candidate(candidate)
    }

    /// Fixes `value` as the cell's value and removes all its candidates.
    ///
    /// Used when a technique deduces a value directly rather than narrowing the candidate set
    /// to one. The cell must be unset and the placement legal; both are programming
    /// invariants, checked only in debug builds.
    pub fn provide_value(&mut self, row: usize, column: usize, value: usize) {
        debug_assert!(value >= 1 && value <= self.size);
        debug_assert!(self.possible(row, column, value));
        debug_assert!(!self.cell(row, column).has_value());

        self.cells[row * self.size + column].set_value(value);
        self.mark_value_free(false, row, column, value);
    }

    /// Writes `value` into the cell without touching the presence tables.
    ///
    /// Backtracking commit path only: the trial placement already holds the tables in the
    /// placed state when the search below it succeeds.
    pub(crate) fn set_cell_value(&mut self, position: Position, value: usize) {
        self.cells[position.row * self.size + position.column].set_value(value);
    }

    /// Removes `candidate` from every cell of `row`. Returns whether progress was made.
    pub fn remove_candidate_from_row(&mut self, row: usize, candidate: usize) -> bool {
        let mut progress = false;
        for column in 0..self.size {
            progress |= self.remove_candidate(row, column, candidate);
        }
        progress
    }

    /// Removes `candidate` from every cell of `column`. Returns whether progress was made.
    pub fn remove_candidate_from_column(&mut self, column: usize, candidate: usize) -> bool {
        let mut progress = false;
        for row in 0..self.size {
            progress |= self.remove_candidate(row, column, candidate);
        }
        progress
    }

    /// Removes `candidate` from every cell of the block containing `(row, column)`. Returns
    /// whether progress was made.
    pub fn remove_candidate_from_block(&mut self, row: usize, column: usize, candidate: usize) -> bool {
        let mut progress = false;
        let block_row = self.block_index(row);
        let block_column = self.block_index(column);
        for r in block_row..block_row + self.n {
            for c in block_column..block_column + self.n {
                progress |= self.remove_candidate(r, c, candidate);
            }
        }
        progress
    }

    /// Iterates all cell values in row-major order, 0 meaning unset.
    ///
    /// This is the read-only contract the write and display collaborators consume.
    pub fn values(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().map(Cell::value)
    }

    /// The positions of all unset cells in row-major order.
    #[must_use]
    pub fn empty_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for row in 0..self.size {
            for column in 0..self.size {
                if !self.cell(row, column).has_value() {
                    positions.push(Position::new(row, column));
                }
            }
        }
        positions
    }

    /// Checks that the grid is completely and correctly solved: every cell set, and every
    /// row, column and block a permutation of `1..=size`.
    ///
    /// Deliberately scans the cells instead of trusting the presence tables, so it can serve
    /// as an independent verification of a solve.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        for row in 0..self.size {
            if !self.group_is_permutation((0..self.size).map(|column| self.cell(row, column))) {
                return false;
            }
        }
        for column in 0..self.size {
            if !self.group_is_permutation((0..self.size).map(|row| self.cell(row, column))) {
                return false;
            }
        }
        for block_row in (0..self.size).step_by(self.n) {
            for block_column in (0..self.size).step_by(self.n) {
                let block = (0..self.n).flat_map(|r| {
                    (0..self.n).map(move |c| self.cell(block_row + r, block_column + c))
                });
                if !self.group_is_permutation(block) {
                    return false;
                }
            }
        }
        true
    }

    fn group_is_permutation<'a>(&self, cells: impl Iterator<Item = &'a Cell>) -> bool {
        let mut seen = vec![false; self.size + 1];
        for cell in cells {
            let value = cell.value();
            if value == 0 || seen[value] {
                return false;
            }
            seen[value] = true;
        }
        true
    }
}

impl Display for Grid {
    /// Renders the grid with `+--+` block borders, `.` for unset cells and values
    /// right-aligned to the decimal width of the grid side.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padding = decimal_width(self.size);
        for block in 0..self.n {
            write_separation_line(f, self.n, padding)?;
            for block_row in 0..self.n {
                self.write_row(f, block * self.n + block_row, padding)?;
            }
        }
        write_separation_line(f, self.n, padding)
    }
}

impl Grid {
    fn write_row(&self, f: &mut fmt::Formatter<'_>, row: usize, padding: usize) -> fmt::Result {
        write!(f, "|")?;
        for block in 0..self.n {
            for block_column in 0..self.n {
                let value = self.cell(row, block * self.n + block_column).value();
                if value == 0 {
                    write!(f, " {:>padding$} ", '.')?;
                } else {
                    write!(f, " {value:>padding$} ")?;
                }
            }
            write!(f, "|")?;
        }
        writeln!(f)
    }
}

fn write_separation_line(f: &mut fmt::Formatter<'_>, n: usize, padding: usize) -> fmt::Result {
    write!(f, "+")?;
    for _ in 0..n {
        // Each value occupies its padding plus one space of margin on both sides.
        for _ in 0..n * (padding + 2) {
            write!(f, "-")?;
        }
        write!(f, "+")?;
    }
    writeln!(f)
}

const fn decimal_width(mut value: usize) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The 4×4 grid (N=2) `[1,0,0,0, 0,0,0,2, 0,0,0,0, 0,0,0,0]`.
    fn small_grid() -> Grid {
        let values = [1, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0];
        Grid::from_values(2, &values).expect("valid grid")
    }

    #[test]
    fn test_from_values_rejects_wrong_cell_count() {
        let err = Grid::from_values(2, &[1, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            InvalidDataError::WrongCellCount {
                expected: 16,
                actual: 3
            }
        );
    }

    #[test]
    fn test_from_values_rejects_out_of_range_value() {
        let mut values = [0u32; 16];
        values[6] = 5; // row 1, column 2 of a 4×4 grid admits at most 4
        let err = Grid::from_values(2, &values).unwrap_err();
        assert_eq!(
            err,
            InvalidDataError::ValueOutOfRange {
                row: 1,
                column: 2,
                value: 5,
                max: 4
            }
        );
    }

    #[test]
    fn test_initial_candidates_reflect_givens() {
        let grid = small_grid();
        // (0, 1) shares a row and block with the given 1, and nothing else.
        let candidates: Vec<usize> = grid.cell(0, 1).candidates().collect();
        assert_eq!(candidates, vec![2, 3, 4]);
        // (1, 0) shares a column and block with the 1, and a row with the 2.
        let candidates: Vec<usize> = grid.cell(1, 0).candidates().collect();
        assert_eq!(candidates, vec![3, 4]);
        // Given cells carry no candidates.
        assert_eq!(grid.cell(0, 0).candidate_count(), 0);
    }

    #[test]
    fn test_possible_consults_row_column_and_block() {
        let grid = small_grid();
        assert!(!grid.possible(0, 3, 1)); // row 0 holds a 1
        assert!(!grid.possible(3, 0, 1)); // column 0 holds a 1
        assert!(!grid.possible(1, 1, 1)); // block (0,0) holds a 1
        assert!(grid.possible(2, 2, 1));
        assert!(!grid.possible(2, 3, 2)); // column 3 holds a 2
    }

    #[test]
    fn test_possible_values_count_for_doubly_constrained_cell() {
        let grid = small_grid();
        // (1, 0): row excludes 2, column and block exclude 1.
        assert_eq!(grid.possible_values_count(1, 0), 2);
        // Unconstrained cell far from both givens.
        assert_eq!(grid.possible_values_count(3, 2), 4);
    }

    #[test]
    fn test_remove_candidate_reports_presence() {
        let mut grid = small_grid();
        // (3, 3) starts as {1, 3, 4}: its column holds the given 2.
        assert!(grid.remove_candidate(3, 3, 4));
        assert!(!grid.remove_candidate(3, 3, 4)); // second removal is a no-op
        assert!(!grid.cell(3, 3).has_candidate(4));
        assert_eq!(grid.cell(3, 3).candidate_count(), 2);
    }

    #[test]
    fn test_removing_the_last_candidate_commits_it_as_value() {
        let mut grid = small_grid();
        // (1, 0) admits {3, 4}; narrow it to {3}.
        assert!(grid.remove_candidate(1, 0, 4));
        assert!(!grid.cell(1, 0).has_value());
        // Removing the lone remaining candidate places it instead.
        assert!(grid.remove_candidate(1, 0, 3));
        assert!(grid.cell(1, 0).has_value());
        assert_eq!(grid.cell(1, 0).value(), 3);
        assert_eq!(grid.cell(1, 0).candidate_count(), 0);
        // The presence tables see the placement immediately.
        assert!(!grid.possible(1, 1, 3));
        assert!(!grid.possible(3, 0, 3));
    }

    #[test]
    fn test_provide_value_updates_tables_atomically() {
        let mut grid = small_grid();
        grid.provide_value(2, 2, 1);
        assert_eq!(grid.cell(2, 2).value(), 1);
        assert!(!grid.possible(2, 0, 1)); // row
        assert!(!grid.possible(0, 2, 1)); // column
        assert!(!grid.possible(3, 3, 1)); // block
    }

    #[test]
    fn test_group_elimination_reports_progress() {
        let mut grid = small_grid();
        assert!(grid.remove_candidate_from_row(3, 4));
        for column in 0..4 {
            assert!(!grid.cell(3, column).has_candidate(4));
        }
        assert!(!grid.remove_candidate_from_row(3, 4));
    }

    #[test]
    fn test_empty_positions_lists_unset_cells_row_major() {
        let grid = small_grid();
        let positions = grid.empty_positions();
        assert_eq!(positions.len(), 14);
        assert_eq!(positions[0], Position::new(0, 1));
        assert_eq!(positions[13], Position::new(3, 3));
    }

    #[test]
    fn test_is_solved_accepts_a_valid_grid() {
        let values = [
            1, 2, 3, 4, //
            3, 4, 1, 2, //
            2, 1, 4, 3, //
            4, 3, 2, 1,
        ];
        let grid = Grid::from_values(2, &values).expect("valid grid");
        assert!(grid.is_solved());
    }

    #[test]
    fn test_is_solved_rejects_incomplete_and_invalid_grids() {
        assert!(!small_grid().is_solved());

        // Every row and column is a permutation, but the top-left block holds two 1s.
        let values = [
            1, 2, 3, 4, //
            2, 1, 4, 3, //
            3, 4, 1, 2, //
            4, 3, 2, 1,
        ];
        let grid = Grid::from_values(2, &values).expect("valid grid");
        assert!(!grid.is_solved());
    }

    #[test]
    fn test_display_renders_blocks_and_blanks() {
        let rendered = small_grid().to_string();
        let expected = "\
+------+------+
| 1  . | .  . |
| .  . | .  2 |
+------+------+
| .  . | .  . |
| .  . | .  . |
+------+------+
";
        assert_eq!(rendered, expected);
    }
}
