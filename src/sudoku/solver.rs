//! The top-level solve loop.
//!
//! Deduction first: the per-cell battery sweeps the grid until it stops making progress,
//! at which point one X-Wing pass gets a chance to unblock it. Only when both stall does the
//! backtracking search take over — and because the search leaves candidate sets stale, it is
//! strictly the last step. X-Wing never fixes a value by itself, so running it on stall
//! instead of every sweep changes only the order of eliminations, never the outcome.

use crate::sudoku::backtracking;
use crate::sudoku::grid::Grid;
use crate::sudoku::techniques;
use log::debug;

/// The result of a solve run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The grid is completely filled and satisfies every row, column and block constraint.
    Solved,
    /// No assignment of the empty cells satisfies the constraints (or the givens themselves
    /// conflict).
    Unsolvable,
}

/// Counters describing how a solve went; surfaced by the CLI statistics table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Full-grid sweeps of the per-cell techniques.
    pub sweeps: usize,
    /// X-Wing passes attempted after a stalled sweep.
    pub x_wing_passes: usize,
    /// Cells fixed by deduction.
    pub deduced_cells: usize,
    /// Cells filled by the backtracking search.
    pub searched_cells: usize,
    /// Trial placements made by the backtracking search.
    pub decisions: usize,
    /// Whether deduction stalled and the search had to run.
    pub used_backtracking: bool,
}

/// Solves the grid in place.
///
/// Returns the outcome together with the solve statistics. On [`SolveOutcome::Unsolvable`]
/// the cell values are exactly as they were before the call; candidate sets may be stale
/// once backtracking has run, so no deduction technique may be applied to the grid
/// afterwards.
pub fn solve(grid: &mut Grid) -> (SolveOutcome, SolveStats) {
    let mut stats = SolveStats::default();
    let given = filled_count(grid);

    loop {
        stats.sweeps += 1;
        if techniques::sweep(grid) {
            continue;
        }
        stats.x_wing_passes += 1;
        if !techniques::x_wing(grid) {
            break;
        }
    }

    stats.deduced_cells = filled_count(grid) - given;
    let remaining = grid.size() * grid.size() - given - stats.deduced_cells;
    debug!(
        "deduction fixed {} cells in {} sweeps, {} remaining",
        stats.deduced_cells, stats.sweeps, remaining
    );

    if remaining == 0 {
        return (outcome_of(grid), stats);
    }

    stats.used_backtracking = true;
    let (found, decisions) = backtracking::run(grid);
    stats.decisions = decisions;
    if !found {
        return (SolveOutcome::Unsolvable, stats);
    }
    stats.searched_cells = remaining;
    (outcome_of(grid), stats)
}

/// A filled grid still gets the independent validity scan: contradictory givens can survive
/// both deduction and search, and the outcome should say so rather than trust them.
fn outcome_of(grid: &Grid) -> SolveOutcome {
    if grid.is_solved() {
        SolveOutcome::Solved
    } else {
        SolveOutcome::Unsolvable
    }
}

fn filled_count(grid: &Grid) -> usize {
    grid.values().filter(|&value| value != 0).count()
}

/// Builds a grid of block size `n` from a square array of rows.
///
/// Convenience for the example boards, tests and benchmarks.
///
/// # Panics
///
/// If the rows do not form a valid grid for block size `n`.
#[must_use]
pub fn grid_from_rows<const SIDE: usize>(n: usize, rows: &[[u32; SIDE]; SIDE]) -> Grid {
    let values: Vec<u32> = rows.iter().flat_map(|row| row.iter().copied()).collect();
    Grid::from_values(n, &values).expect("rows form a valid grid")
}

/// A 4×4 board (block size 2) with two givens; the smallest interesting input.
pub const EXAMPLE_FOUR: [[u32; 4]; 4] = [
    [1, 0, 0, 0],
    [0, 0, 0, 2],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
];

/// The classic 9×9 puzzle (block size 3) with a unique solution.
pub const EXAMPLE_NINE: [[u32; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_reference_four_by_four() {
        let mut grid = grid_from_rows(2, &EXAMPLE_FOUR);
        let (outcome, stats) = solve(&mut grid);
        assert_eq!(outcome, SolveOutcome::Solved);
        assert!(grid.is_solved());
        // The givens survive in place.
        assert_eq!(grid.cell(0, 0).value(), 1);
        assert_eq!(grid.cell(1, 3).value(), 2);
        assert!(stats.sweeps >= 1);
        assert_eq!(stats.deduced_cells + stats.searched_cells, 14);
    }

    #[test]
    fn test_solve_classic_nine_by_nine() {
        let mut grid = grid_from_rows(3, &EXAMPLE_NINE);
        let (outcome, _) = solve(&mut grid);
        assert_eq!(outcome, SolveOutcome::Solved);
        assert!(grid.is_solved());
        assert_eq!(grid.cell(0, 0).value(), 5);
        assert_eq!(grid.cell(8, 8).value(), 9);
        // The unique solution of this board starts 5 3 4 6 7 8 9 1 2.
        let first_row: Vec<usize> = (0..9).map(|column| grid.cell(0, column).value()).collect();
        assert_eq!(first_row, vec![5, 3, 4, 6, 7, 8, 9, 1, 2]);
    }

    #[test]
    fn test_solve_by_deduction_alone() {
        // One blank in an otherwise complete grid: the first sweep closes it.
        let values = [
            1, 2, 3, 4, //
            3, 4, 1, 2, //
            2, 1, 4, 3, //
            4, 3, 2, 0,
        ];
        let mut grid = Grid::from_values(2, &values).expect("valid grid");
        let (outcome, stats) = solve(&mut grid);
        assert_eq!(outcome, SolveOutcome::Solved);
        assert_eq!(grid.cell(3, 3).value(), 1);
        assert!(!stats.used_backtracking);
        assert_eq!(stats.deduced_cells, 1);
        assert_eq!(stats.decisions, 0);
    }

    #[test]
    fn test_solve_reports_unsolvable_dead_end() {
        // (0, 3) admits nothing: its row holds 1, 2, 3 and its column holds 4.
        let values = [
            1, 2, 3, 0, //
            0, 0, 0, 4, //
            0, 0, 0, 0, //
            0, 0, 0, 0,
        ];
        let mut grid = Grid::from_values(2, &values).expect("valid grid");
        let (outcome, stats) = solve(&mut grid);
        assert_eq!(outcome, SolveOutcome::Unsolvable);
        assert!(stats.used_backtracking);
        // The givens are untouched by the failed search.
        assert_eq!(grid.cell(0, 0).value(), 1);
        assert_eq!(grid.cell(1, 3).value(), 4);
    }

    #[test]
    fn test_solve_is_stable_on_an_already_solved_grid() {
        let values = [
            1, 2, 3, 4, //
            3, 4, 1, 2, //
            2, 1, 4, 3, //
            4, 3, 2, 1,
        ];
        let mut grid = Grid::from_values(2, &values).expect("valid grid");
        let (outcome, stats) = solve(&mut grid);
        assert_eq!(outcome, SolveOutcome::Solved);
        assert_eq!(stats.deduced_cells, 0);
        assert!(!stats.used_backtracking);
    }
}
