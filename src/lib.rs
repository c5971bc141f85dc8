#![deny(missing_docs)]
//! This crate provides a generalized Sudoku solver: an N²×N² grid (block size N) with some
//! cells pre-filled is completed by a battery of logical deduction techniques, backed by a
//! backtracking search with a minimum-remaining-values heuristic when deduction stalls.

/// The `sudoku` module implements the solver core: the grid and cell data model, the
/// deduction techniques, the backtracking search and the `.sud` binary grid format.
pub mod sudoku;
