//! The deduction battery: naked singleton, hidden singleton, naked pair, hidden pair and
//! X-Wing.
//!
//! Each technique is a pure transformation of the grid that removes candidates or fixes
//! values and reports whether it made progress. The per-cell techniques are driven by
//! [`sweep`], which visits every cell in row-major order and runs them in increasing cost
//! order, short-circuiting as soon as the cell acquires a value. [`x_wing`] works on the
//! whole grid at once and is cheapest to invoke only when the per-cell battery stalls.

use crate::sudoku::cell::Cell;
use crate::sudoku::grid::Grid;
use crate::sudoku::position::Position;
use core::ops::Range;
use itertools::Itertools;
use log::debug;
use smallvec::SmallVec;

/// A pair of candidate values under investigation, with the number of pair cells discovered
/// so far. Transient state of the naked-pair scan.
struct Pair {
    candidates: [usize; 2],
    count: usize,
}

/// Whether `cell` contains exactly the two candidates of `pair` and nothing else.
fn is_pair_cell(cell: &Cell, pair: &Pair) -> bool {
    cell.candidate_count() == 2
        && cell.has_candidate(pair.candidates[0])
        && cell.has_candidate(pair.candidates[1])
}

/// Runs the per-cell techniques over the whole grid, once. Returns whether any of them made
/// progress.
pub fn sweep(grid: &mut Grid) -> bool {
    let mut progress = false;
    let size = grid.size();

    for row in 0..size {
        for column in 0..size {
            // Increasing cost order; as soon as the cell's value is fixed the rest of the
            // battery has nothing left to contribute for this cell.
            if grid.cell(row, column).has_value() {
                continue;
            }

            progress |= naked_singleton(grid, row, column);
            if grid.cell(row, column).has_value() {
                continue;
            }

            progress |= hidden_singleton(grid, row, column);
            if grid.cell(row, column).has_value() {
                continue;
            }

            progress |= naked_pair(grid, row, column);
            if grid.cell(row, column).has_value() {
                continue;
            }

            progress |= hidden_pair(grid, row, column);
        }
    }

    progress
}

/// Naked singleton: a cell with exactly one candidate must hold it.
///
/// The candidate is eliminated from the cell's row, column and block; eliminating it from
/// the cell itself is what commits the value (see [`Grid::remove_candidate`]). Always makes
/// at least one elimination when it triggers.
pub fn naked_singleton(grid: &mut Grid, row: usize, column: usize) -> bool {
    let cell = grid.cell(row, column);
    if cell.candidate_count() != 1 {
        return false;
    }
    let Some(candidate) = cell.first_candidate() else {
        return false;
    };

    debug!("naked singleton: {candidate} at ({row}, {column})");
    let mut progress = grid.remove_candidate_from_row(row, candidate);
    progress |= grid.remove_candidate_from_column(column, candidate);
    progress |= grid.remove_candidate_from_block(row, column, candidate);
    progress
}

/// Hidden singleton: if some value is admitted by exactly one cell of a group, that cell
/// must hold it.
///
/// The cell's three groups are searched independently — block, then row, then column — so up
/// to three placements can happen in one call. Each placement eliminates the value from the
/// other two group kinds; the group just searched is about to be irrelevant for that cell.
pub fn hidden_singleton(grid: &mut Grid, row: usize, column: usize) -> bool {
    let mut progress = false;
    let size = grid.size();
    let n = grid.n();
    let block_row = grid.block_index(row);
    let block_column = grid.block_index(column);

    // Block
    if let Some((position, candidate)) =
        find_unique_candidate(grid, block_row..block_row + n, block_column..block_column + n)
    {
        debug!("hidden singleton (block): {candidate} at {position}");
        grid.provide_value(position.row, position.column, candidate);
        grid.remove_candidate_from_row(position.row, candidate);
        grid.remove_candidate_from_column(position.column, candidate);
        progress = true;
    }

    // Row
    if let Some((position, candidate)) = find_unique_candidate(grid, row..row + 1, 0..size) {
        debug!("hidden singleton (row): {candidate} at {position}");
        grid.provide_value(position.row, position.column, candidate);
        grid.remove_candidate_from_block(position.row, position.column, candidate);
        grid.remove_candidate_from_column(position.column, candidate);
        progress = true;
    }

    // Column
    if let Some((position, candidate)) = find_unique_candidate(grid, 0..size, column..column + 1) {
        debug!("hidden singleton (column): {candidate} at {position}");
        grid.provide_value(position.row, position.column, candidate);
        grid.remove_candidate_from_block(position.row, position.column, candidate);
        grid.remove_candidate_from_row(position.row, candidate);
        progress = true;
    }

    progress
}

/// Finds a value admitted by exactly one cell of the group spanned by `rows` × `columns`,
/// along with that cell's position.
///
/// # Panics
///
/// If the counted candidate cannot be located on the second scan, which would mean the
/// candidate sets changed mid-search — a bug, not a reachable state.
fn find_unique_candidate(
    grid: &Grid,
    rows: Range<usize>,
    columns: Range<usize>,
) -> Option<(Position, usize)> {
    let mut counts = vec![0usize; grid.size() + 1];
    for row in rows.clone() {
        for column in columns.clone() {
            for candidate in grid.cell(row, column).candidates() {
                counts[candidate] += 1;
            }
        }
    }

    let candidate = (1..=grid.size()).find(|&value| counts[value] == 1)?;

    for row in rows {
        for column in columns.clone() {
            if grid.cell(row, column).has_candidate(candidate) {
                return Some((Position::new(row, column), candidate));
            }
        }
    }

    unreachable!("candidate counted exactly once in the group must be locatable");
}

/// Naked pair: two cells of a block restricted to the same two candidates exclude those
/// candidates from the rest of the block.
///
/// Triggers when the target cell has exactly two candidates and exactly one other cell of
/// its block has the same two. The elimination pass re-checks pair membership per cell, so
/// the pair cells themselves are never touched.
pub fn naked_pair(grid: &mut Grid, row: usize, column: usize) -> bool {
    if grid.cell(row, column).candidate_count() != 2 {
        return false;
    }

    let n = grid.n();
    let block_row = grid.block_index(row);
    let block_column = grid.block_index(column);

    let candidates: SmallVec<[usize; 2]> = grid.cell(row, column).candidates().collect();
    let mut pair = Pair {
        candidates: [candidates[0], candidates[1]],
        count: 1,
    };

    'scan: for r in block_row..block_row + n {
        for c in block_column..block_column + n {
            if (r, c) != (row, column) && is_pair_cell(grid.cell(r, c), &pair) {
                pair.count += 1;
                if pair.count == 2 {
                    break 'scan;
                }
            }
        }
    }

    if pair.count != 2 {
        return false;
    }

    debug!(
        "naked pair: {{{}, {}}} in block ({block_row}, {block_column})",
        pair.candidates[0], pair.candidates[1]
    );
    let mut progress = false;
    for r in block_row..block_row + n {
        for c in block_column..block_column + n {
            if is_pair_cell(grid.cell(r, c), &pair) {
                continue;
            }
            progress |= grid.remove_candidate(r, c, pair.candidates[0]);
            progress |= grid.remove_candidate(r, c, pair.candidates[1]);
        }
    }
    progress
}

/// Hidden pair: two values confined to the same two cells of a group exclude every other
/// candidate from those two cells.
///
/// Each of the target cell's three groups is searched independently. Candidate pairs are
/// enumerated from the target cell's own candidate set, so the target cell is always one
/// member of any pair found; a pair only counts when no other cell of the group holds
/// exactly one of its values, exactly two cells hold both, and stripping would actually
/// remove something.
pub fn hidden_pair(grid: &mut Grid, row: usize, column: usize) -> bool {
    let mut progress = false;
    let size = grid.size();
    let n = grid.n();
    let block_row = grid.block_index(row);
    let block_column = grid.block_index(column);
    let target = Position::new(row, column);

    let groups: [(Range<usize>, Range<usize>); 3] = [
        (block_row..block_row + n, block_column..block_column + n),
        (row..row + 1, 0..size),
        (0..size, column..column + 1),
    ];

    for (rows, columns) in groups {
        // A committed or nearly-empty target cell cannot anchor a pair any more.
        if grid.cell(row, column).candidate_count() < 2 {
            break;
        }
        if let Some((other, candidates)) = find_hidden_pair(grid, target, rows, columns) {
            debug!(
                "hidden pair: {{{}, {}}} at {target} and {other}",
                candidates[0], candidates[1]
            );
            progress |= strip_to_pair(grid, [target, other], candidates);
        }
    }

    progress
}

/// Searches the group for a hidden pair anchored at `target`. Returns the second pair cell
/// and the pair's candidates.
fn find_hidden_pair(
    grid: &Grid,
    target: Position,
    rows: Range<usize>,
    columns: Range<usize>,
) -> Option<(Position, [usize; 2])> {
    let anchor: SmallVec<[usize; 8]> = grid.cell(target.row, target.column).candidates().collect();

    for (&a, &b) in anchor.iter().tuple_combinations() {
        if let Some(other) = find_pair_cells(grid, target, [a, b], rows.clone(), columns.clone()) {
            return Some((other, [a, b]));
        }
    }

    None
}

/// Checks whether `{a, b}` forms a hidden pair in the group: exactly two cells (the target
/// plus one other) contain both values, no cell contains just one of them, and at least one
/// pair cell has extra candidates worth stripping.
fn find_pair_cells(
    grid: &Grid,
    target: Position,
    [a, b]: [usize; 2],
    rows: Range<usize>,
    columns: Range<usize>,
) -> Option<Position> {
    let mut other = None;
    let mut both_count = 1; // the target holds both by construction
    let mut with_extra_candidates =
        usize::from(grid.cell(target.row, target.column).candidate_count() > 2);

    for row in rows {
        for column in columns.clone() {
            if Position::new(row, column) == target {
                continue;
            }
            let cell = grid.cell(row, column);
            let has_a = cell.has_candidate(a);
            let has_b = cell.has_candidate(b);

            if has_a && has_b {
                both_count += 1;
                if both_count > 2 {
                    return None;
                }
                with_extra_candidates += usize::from(cell.candidate_count() > 2);
                other = Some(Position::new(row, column));
            } else if has_a || has_b {
                // A lone appearance elsewhere invalidates the pair.
                return None;
            }
        }
    }

    // Without extra candidates on at least one pair cell there is nothing to strip.
    if both_count == 2 && with_extra_candidates > 0 {
        other
    } else {
        None
    }
}

/// Removes every candidate except the pair's two values from both pair cells.
fn strip_to_pair(grid: &mut Grid, positions: [Position; 2], [a, b]: [usize; 2]) -> bool {
    let mut progress = false;
    for position in positions {
        for candidate in 1..=grid.size() {
            if candidate == a || candidate == b {
                continue;
            }
            progress |= grid.remove_candidate(position.row, position.column, candidate);
        }
    }
    progress
}

/// X-Wing: grid-wide rectangle elimination, run once per pass rather than per cell.
///
/// Vertical case: two columns each admit some candidate in exactly two cells, and those
/// cells lie on the same two rows. The four cells form the corners of a rectangle; the
/// candidate must land on two opposite corners, so it is eliminated from the rest of the two
/// rows. The horizontal case is the transpose, eliminating along columns. The four corner
/// cells themselves are never touched.
pub fn x_wing(grid: &mut Grid) -> bool {
    let mut progress = false;
    let size = grid.size();

    // Vertical: column pairs, eliminate along the shared rows.
    for col_a in 0..size {
        for col_b in col_a + 1..size {
            for candidate in 1..=size {
                let mut shared_rows = [0usize; 2];
                let mut shared = 0usize;
                let mut column_counts = [0usize; 2];

                for row in 0..size {
                    let in_a = grid.cell(row, col_a).has_candidate(candidate);
                    let in_b = grid.cell(row, col_b).has_candidate(candidate);
                    column_counts[0] += usize::from(in_a);
                    column_counts[1] += usize::from(in_b);
                    if in_a && in_b {
                        if shared < 2 {
                            shared_rows[shared] = row;
                        }
                        shared += 1;
                    }
                }

                if shared == 2 && column_counts == [2, 2] {
                    debug!(
                        "x-wing (vertical): {candidate} on columns {col_a}/{col_b}, \
                         rows {}/{}",
                        shared_rows[0], shared_rows[1]
                    );
                    for column in 0..size {
                        if column == col_a || column == col_b {
                            continue;
                        }
                        progress |= grid.remove_candidate(shared_rows[0], column, candidate);
                        progress |= grid.remove_candidate(shared_rows[1], column, candidate);
                    }
                }
            }
        }
    }

    // Horizontal: row pairs, eliminate along the shared columns.
    for row_a in 0..size {
        for row_b in row_a + 1..size {
            for candidate in 1..=size {
                let mut shared_columns = [0usize; 2];
                let mut shared = 0usize;
                let mut row_counts = [0usize; 2];

                for column in 0..size {
                    let in_a = grid.cell(row_a, column).has_candidate(candidate);
                    let in_b = grid.cell(row_b, column).has_candidate(candidate);
                    row_counts[0] += usize::from(in_a);
                    row_counts[1] += usize::from(in_b);
                    if in_a && in_b {
                        if shared < 2 {
                            shared_columns[shared] = column;
                        }
                        shared += 1;
                    }
                }

                if shared == 2 && row_counts == [2, 2] {
                    debug!(
                        "x-wing (horizontal): {candidate} on rows {row_a}/{row_b}, \
                         columns {}/{}",
                        shared_columns[0], shared_columns[1]
                    );
                    for row in 0..size {
                        if row == row_a || row == row_b {
                            continue;
                        }
                        progress |= grid.remove_candidate(row, shared_columns[0], candidate);
                        progress |= grid.remove_candidate(row, shared_columns[1], candidate);
                    }
                }
            }
        }
    }

    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_4x4(values: [u32; 16]) -> Grid {
        Grid::from_values(2, &values).expect("valid grid")
    }

    #[test]
    fn test_naked_singleton_eliminates_across_all_groups() {
        // (0, 0) admits only 1: narrow an empty grid down by hand.
        let mut grid = grid_4x4([0; 16]);
        for candidate in 2..=4 {
            grid.remove_candidate(0, 0, candidate);
        }
        assert!(naked_singleton(&mut grid, 0, 0));
        assert_eq!(grid.cell(0, 0).value(), 1);
        // 1 disappears from the row, the column and the block.
        assert!(!grid.cell(0, 3).has_candidate(1));
        assert!(!grid.cell(3, 0).has_candidate(1));
        assert!(!grid.cell(1, 1).has_candidate(1));
        // Cells sharing no group keep it.
        assert!(grid.cell(2, 2).has_candidate(1));
    }

    #[test]
    fn test_naked_singleton_ignores_multi_candidate_cells() {
        let mut grid = grid_4x4([0; 16]);
        assert!(!naked_singleton(&mut grid, 0, 0));
    }

    #[test]
    fn test_hidden_singleton_fires_on_group_count_even_with_wide_target() {
        // Row 2 admits 1 only at (2, 3): the row's other cells each see a 1 in their column.
        let values = [
            0, 0, 0, 0, //
            1, 0, 0, 0, //
            0, 0, 0, 0, //
            0, 1, 0, 0,
        ];
        let mut grid = grid_4x4(values);
        grid.remove_candidate(2, 2, 1); // leave column 3 as the only home for 1 in row 2
        assert!(grid.cell(2, 3).candidate_count() > 1);

        assert!(hidden_singleton(&mut grid, 2, 0));
        assert_eq!(grid.cell(2, 3).value(), 1);
    }

    #[test]
    fn test_hidden_singleton_no_progress_when_no_unique_candidate() {
        let mut grid = grid_4x4([0; 16]);
        assert!(!hidden_singleton(&mut grid, 0, 0));
    }

    #[test]
    fn test_naked_pair_strips_the_rest_of_the_block() {
        let mut grid = grid_4x4([0; 16]);
        // Make (0, 0) and (1, 1) both exactly {1, 2}.
        for candidate in 3..=4 {
            grid.remove_candidate(0, 0, candidate);
            grid.remove_candidate(1, 1, candidate);
        }
        assert!(naked_pair(&mut grid, 0, 0));
        // The other two block cells lose 1 and 2 ...
        assert_eq!(
            grid.cell(0, 1).candidates().collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert_eq!(
            grid.cell(1, 0).candidates().collect::<Vec<_>>(),
            vec![3, 4]
        );
        // ... while the pair cells themselves are untouched.
        assert_eq!(
            grid.cell(0, 0).candidates().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            grid.cell(1, 1).candidates().collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_naked_pair_requires_a_second_pair_cell() {
        let mut grid = grid_4x4([0; 16]);
        for candidate in 3..=4 {
            grid.remove_candidate(0, 0, candidate);
        }
        assert!(!naked_pair(&mut grid, 0, 0));
    }

    #[test]
    fn test_hidden_pair_strips_pair_cells_to_the_pair() {
        let mut grid = grid_4x4([0; 16]);
        // Confine 1 and 2 to (0, 0) and (0, 1), both within their row and within their
        // block; whichever group is searched first finds the pair.
        for column in 2..4 {
            grid.remove_candidate(0, column, 1);
            grid.remove_candidate(0, column, 2);
        }
        for position in [(1, 0), (1, 1)] {
            grid.remove_candidate(position.0, position.1, 1);
            grid.remove_candidate(position.0, position.1, 2);
        }

        assert!(hidden_pair(&mut grid, 0, 0));
        assert_eq!(
            grid.cell(0, 0).candidates().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            grid.cell(0, 1).candidates().collect::<Vec<_>>(),
            vec![1, 2]
        );
        // Cells outside the pair keep their candidates.
        assert_eq!(
            grid.cell(0, 2).candidates().collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn test_hidden_pair_rejected_by_lone_appearance() {
        let mut grid = grid_4x4([0; 16]);
        // Anchor (0, 0) at exactly {1, 2}. In row 0, candidate 2 is confined to the anchor
        // and (0, 1), but (0, 2) still holds 1 alone — that lone appearance must veto the
        // pair. The block and column groups see both values everywhere, so they cannot fire
        // either.
        grid.remove_candidate(0, 0, 3);
        grid.remove_candidate(0, 0, 4);
        grid.remove_candidate(0, 2, 2);
        grid.remove_candidate(0, 3, 2);
        grid.remove_candidate(0, 3, 1);

        assert!(!hidden_pair(&mut grid, 0, 0));
        assert_eq!(
            grid.cell(0, 1).candidates().collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_x_wing_eliminates_outside_the_rectangle_only() {
        let mut grid = grid_4x4([0; 16]);
        // Candidate 1 appears in columns 0 and 2 exactly on rows 0 and 2.
        for row in [1, 3] {
            grid.remove_candidate(row, 0, 1);
            grid.remove_candidate(row, 2, 1);
        }

        assert!(x_wing(&mut grid));
        // Eliminated from the rest of rows 0 and 2 ...
        assert!(!grid.cell(0, 1).has_candidate(1));
        assert!(!grid.cell(0, 3).has_candidate(1));
        assert!(!grid.cell(2, 1).has_candidate(1));
        assert!(!grid.cell(2, 3).has_candidate(1));
        // ... but never from the four defining corners.
        assert!(grid.cell(0, 0).has_candidate(1));
        assert!(grid.cell(0, 2).has_candidate(1));
        assert!(grid.cell(2, 0).has_candidate(1));
        assert!(grid.cell(2, 2).has_candidate(1));
    }

    #[test]
    fn test_techniques_are_idempotent_at_fixed_point() {
        let values = [
            1, 0, 0, 0, //
            0, 0, 0, 2, //
            0, 0, 0, 0, //
            0, 0, 0, 0,
        ];
        let mut grid = grid_4x4(values);
        while sweep(&mut grid) {}
        assert!(!sweep(&mut grid));
        assert!(!x_wing(&mut grid));
    }

    #[test]
    fn test_first_sweep_places_the_forced_two() {
        // In the top-left block, only (0, 1) can hold a 2: the block's bottom row is barred
        // by the given 2 in row 1. The first sweep finds it as a hidden singleton.
        let values = [
            1, 0, 0, 0, //
            0, 0, 0, 2, //
            0, 0, 0, 0, //
            0, 0, 0, 0,
        ];
        let mut grid = grid_4x4(values);
        assert!(sweep(&mut grid));
        assert_eq!(grid.cell(0, 1).value(), 2);
    }
}
