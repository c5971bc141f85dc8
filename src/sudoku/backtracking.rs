//! Exhaustive depth-first search over the remaining empty cells.
//!
//! The search deliberately does not maintain per-cell candidate sets: keeping them in sync
//! across recursive calls costs a group-wide loop per placement, while the free-value
//! presence tables answer the same legality question with three bit flips. The price is that
//! candidate sets are stale once the search has run — backtracking is always the terminal
//! technique, and no deduction technique may be invoked on the grid afterwards.
//!
//! Cell order is chosen dynamically: at each depth the remaining empty cell with the fewest
//! possible values is swapped to the front of the buffer (minimum remaining values, ties
//! broken by first occurrence), which keeps the branching factor small.

use crate::sudoku::grid::Grid;
use crate::sudoku::position::Position;
use log::debug;
use std::mem;

/// A value tentatively placed at a position, registered in the presence tables.
///
/// Construction marks the value unavailable; dropping the guard releases it again. Only
/// [`TrialPlacement::commit`] makes the placement permanent, writing the value into the cell
/// and leaving the tables in the placed state. The release-on-drop guarantee is what keeps
/// every early exit from the search honest about table state.
struct TrialPlacement<'g> {
    grid: &'g mut Grid,
    position: Position,
    value: usize,
}

impl<'g> TrialPlacement<'g> {
    fn new(grid: &'g mut Grid, position: Position, value: usize) -> Self {
        grid.mark_value_free(false, position.row, position.column, value);
        Self {
            grid,
            position,
            value,
        }
    }

    fn grid(&mut self) -> &mut Grid {
        self.grid
    }

    fn commit(mut self) {
        self.grid.set_cell_value(self.position, self.value);
        mem::forget(self);
    }
}

impl Drop for TrialPlacement<'_> {
    fn drop(&mut self) {
        self.grid
            .mark_value_free(true, self.position.row, self.position.column, self.value);
    }
}

/// Searches for any assignment completing the grid. Returns whether one was found, along
/// with the number of trial placements made.
///
/// On success every formerly empty cell holds a value and the presence tables reflect the
/// completed grid; on failure the grid is exactly as it was before the call (tables
/// included). Candidate sets are stale either way.
pub fn run(grid: &mut Grid) -> (bool, usize) {
    let mut positions = grid.empty_positions();
    let mut decisions = 0;
    debug!("backtracking over {} empty cells", positions.len());
    let solved = search(grid, &mut positions, 0, &mut decisions);
    debug!("backtracking finished: solved={solved}, decisions={decisions}");
    (solved, decisions)
}

fn search(
    grid: &mut Grid,
    positions: &mut [Position],
    cursor: usize,
    decisions: &mut usize,
) -> bool {
    // Every position before the cursor holds a trial value; all of them placed means the
    // grid is complete.
    if cursor == positions.len() {
        return true;
    }

    select_most_constrained(grid, positions, cursor);
    let position = positions[cursor];

    for value in 1..=grid.size() {
        if !grid.possible(position.row, position.column, value) {
            continue;
        }
        *decisions += 1;

        let mut trial = TrialPlacement::new(grid, position, value);
        if search(trial.grid(), positions, cursor + 1, decisions) {
            trial.commit();
            return true;
        }
        // The guard drops here, releasing the value for the next attempt.
    }

    false
}

/// Swaps the cell with the fewest possible values among `positions[cursor..]` into the
/// cursor slot. Ties keep the earliest cell, so the ordering is stable under equal counts.
fn select_most_constrained(grid: &Grid, positions: &mut [Position], cursor: usize) {
    debug_assert!(cursor < positions.len());

    let mut best = cursor;
    let mut best_count =
        grid.possible_values_count(positions[cursor].row, positions[cursor].column);

    for index in cursor + 1..positions.len() {
        let count = grid.possible_values_count(positions[index].row, positions[index].column);
        if count < best_count {
            best = index;
            best_count = count;
        }
    }

    positions.swap(cursor, best);
}
