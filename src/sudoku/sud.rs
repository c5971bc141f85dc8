#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The `.sud` binary grid format.
//!
//! A `.sud` record is exactly size² little-endian `u32` values in row-major order, 0 meaning
//! blank. The block size N is not part of the record; the reader is told which grid shape to
//! expect and rejects anything that does not fill it. Loading builds a ready-to-solve
//! [`Grid`], candidate sets included; writing emits the cell values and nothing else, so a
//! solved grid round-trips into a record of its solution.

use crate::sudoku::grid::{Grid, InvalidDataError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors arising while reading a `.sud` record.
#[derive(Debug, Error)]
pub enum SudError {
    /// The underlying reader failed.
    #[error("failed to read grid record")]
    Io(#[from] io::Error),
    /// The record ended before size² values were read.
    #[error("truncated grid record: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes a full record occupies.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },
    /// The record was complete but its values do not form a grid.
    #[error(transparent)]
    InvalidData(#[from] InvalidDataError),
}

/// Reads a grid of block size `n` from a `.sud` record.
///
/// # Errors
///
/// [`SudError`] on I/O failure, a short record, or out-of-range values. No grid exists on
/// the error path.
pub fn load<R: Read>(mut reader: R, n: usize) -> Result<Grid, SudError> {
    let size = n * n;
    let expected = size * size * size_of::<u32>();
    let mut buffer = vec![0u8; expected];

    let mut filled = 0;
    while filled < expected {
        let read = reader.read(&mut buffer[filled..])?;
        if read == 0 {
            return Err(SudError::Truncated {
                expected,
                actual: filled,
            });
        }
        filled += read;
    }

    let values: Vec<u32> = buffer
        .chunks_exact(size_of::<u32>())
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(Grid::from_values(n, &values)?)
}

/// Writes the grid's values as a `.sud` record.
///
/// # Errors
///
/// Any error of the underlying writer.
#[allow(clippy::cast_possible_truncation)]
pub fn write<W: Write>(grid: &Grid, mut writer: W) -> io::Result<()> {
    for value in grid.values() {
        writer.write_all(&(value as u32).to_le_bytes())?;
    }
    writer.flush()
}

/// Opens `path` and reads a grid of block size `n` from it.
///
/// # Errors
///
/// See [`load`]; additionally any error opening the file.
pub fn load_file<P: AsRef<Path>>(path: P, n: usize) -> Result<Grid, SudError> {
    let file = File::open(path)?;
    load(BufReader::new(file), n)
}

/// Creates `path` and writes the grid's record into it.
///
/// # Errors
///
/// See [`write`]; additionally any error creating the file.
pub fn write_file<P: AsRef<Path>>(grid: &Grid, path: P) -> io::Result<()> {
    let file = File::create(path)?;
    write(grid, BufWriter::new(file))
}
