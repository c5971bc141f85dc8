#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver core: grid data model, deduction techniques, backtracking search and the
//! `.sud` binary grid format.

/// The `backtracking` module implements the terminal exhaustive search over empty cells.
pub mod backtracking;

/// The `cell` module implements per-cell value-or-candidate-set state.
pub mod cell;

/// The `grid` module implements the cell matrix and the free-value presence tables.
pub mod grid;

/// The `position` module implements the (row, column) coordinate handle.
pub mod position;

/// The `solver` module implements the top-level solve loop and example boards.
pub mod solver;

/// The `sud` module implements the `.sud` binary grid file format.
pub mod sud;

/// The `techniques` module implements the logical deduction battery.
pub mod techniques;
