//! # sudoku-solver
//!
//! `sudoku-solver` is a command-line solver for generalized Sudoku grids: an N²×N² grid
//! (block size N) with some cells pre-filled is completed by logical deduction techniques
//! (naked and hidden singletons and pairs, X-Wing) backed by a backtracking search with a
//! minimum-remaining-values heuristic.
//!
//! ## Features
//!
//! - **`.sud` input**: fixed-size binary grid records (size² little-endian `u32` values,
//!   row-major, 0 = blank), any block size via `--block-size`.
//! - **Batch mode**: solve every `.sud` file under a directory.
//! - **Verification**: independently re-check the solved grid against the Sudoku rules.
//! - **Statistics**: parse and solve times, sweep/decision counters, and memory usage
//!   via `tikv-jemallocator`.
//! - **Rendering**: bordered text output of any grid.
//! - **Shell completions**: generated on demand.
//!
//! ## Usage
//!
//! ```sh
//! # Solve a .sud file with the default 9×9 shape (block size 3)
//! sudoku-solver grid.sud
//!
//! # Solve a 16×16 grid and write the solution next to it
//! sudoku-solver solve --path grid.sud --block-size 4 --output grid.solved.sud
//!
//! # Solve every .sud file under a directory
//! sudoku-solver batch --dir puzzles/
//!
//! # Render a grid without solving it
//! sudoku-solver print --path grid.sud
//! ```

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sudoku_solver::sudoku::grid::Grid;
use sudoku_solver::sudoku::solver::{self, SolveOutcome, SolveStats};
use sudoku_solver::sudoku::sud;
use tikv_jemalloc_ctl::{epoch, stats};
use walkdir::WalkDir;

/// Global allocator using `tikv-jemallocator`. Every allocation the solver makes goes
/// through it; on exhaustion it aborts the process, so the solver itself carries no
/// out-of-memory recovery path.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Exit code for invalid command-line arguments.
const EXIT_INVALID_ARG: i32 = 1;
/// Exit code for invalid data in a grid file.
const EXIT_INVALID_DATA: i32 = 2;

/// Defines the command-line interface for the solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "sudoku-solver", version, about = "A generalized Sudoku solver")]
struct Cli {
    /// An optional path argument. If provided without a subcommand, it's treated as the
    /// path to a .sud file to solve.
    path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `solve`, `batch`, `print`).
    #[clap(subcommand)]
    command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve a grid from a .sud file.
    Solve {
        /// Path to the .sud file.
        #[arg(long)]
        path: PathBuf,

        /// If set, the solved grid is written to this path as a .sud record.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .sud file under a directory.
    Batch {
        /// Directory to scan recursively for .sud files.
        #[arg(long)]
        dir: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Render a grid from a .sud file without solving it.
    Print {
        /// Path to the .sud file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
struct CommonOptions {
    /// Block size N of the grids being read; the grid side is N².
    #[arg(short = 'n', long, default_value_t = 3)]
    block_size: usize,

    /// Enable debug output, providing more verbose logging during the solving process.
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Enable independent verification of the solved grid against the Sudoku rules.
    #[arg(short, long, default_value_t = true)]
    verify: bool,

    /// Enable printing of performance and problem statistics after solving.
    #[arg(short, long, default_value_t = true)]
    stats: bool,

    /// Enable printing of the solved grid.
    #[arg(short, long, default_value_t = true)]
    print_solution: bool,
}

/// Main entry point: parses the command line, configures logging and dispatches.
fn main() {
    let cli = Cli::parse();

    init_logging(common_of(&cli).is_some_and(|common| common.debug));

    if let Some(common) = common_of(&cli) {
        if common.block_size == 0 {
            eprintln!("Block size must be at least 1");
            std::process::exit(EXIT_INVALID_ARG);
        }
    }

    // A bare path with no subcommand defaults to solving that file.
    if let Some(path) = cli.path.clone() {
        if cli.command.is_none() {
            solve_path(&path, None, &cli.common);
            return;
        }
    }

    match cli.command {
        Some(Commands::Solve {
            path,
            output,
            common,
        }) => solve_path(&path, output.as_deref(), &common),

        Some(Commands::Batch { dir, common }) => solve_directory(&dir, &common),

        Some(Commands::Print { path, common }) => {
            let grid = load_or_exit(&path, common.block_size);
            print!("{grid}");
        }

        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "sudoku-solver",
                &mut std::io::stdout(),
            );
        }

        None => {
            eprintln!("No command provided. Use --help for more information.");
            std::process::exit(EXIT_INVALID_ARG);
        }
    }
}

/// The options in effect for the parsed command line.
fn common_of(cli: &Cli) -> Option<&CommonOptions> {
    match &cli.command {
        Some(
            Commands::Solve { common, .. }
            | Commands::Batch { common, .. }
            | Commands::Print { common, .. },
        ) => Some(common),
        Some(Commands::Completions { .. }) => None,
        None => Some(&cli.common),
    }
}

/// Routes `log` records to stderr through `fern`, at debug verbosity when requested.
fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .expect("logger initialization failed");
}

/// Loads a grid or terminates the process with the invalid-data exit code.
fn load_or_exit(path: &Path, block_size: usize) -> Grid {
    sud::load_file(path, block_size).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {e}", path.display());
        std::process::exit(EXIT_INVALID_DATA);
    })
}

/// Loads a .sud file, solves it and reports results including stats and verification.
fn solve_path(path: &Path, output: Option<&Path>, common: &CommonOptions) {
    let time = Instant::now();
    let mut grid = load_or_exit(path, common.block_size);
    let parse_time = time.elapsed();
    let givens = grid.values().filter(|&value| value != 0).count();

    println!("Solving: {:?}", path);
    if common.debug {
        print!("{grid}");
    }

    // Advance epoch so the memory stats isolate the solving phase.
    epoch::advance().unwrap();

    let time = Instant::now();
    let (outcome, solve_stats) = solver::solve(&mut grid);
    let elapsed = time.elapsed();

    epoch::advance().unwrap();
    let allocated_bytes = stats::allocated::mib().unwrap().read().unwrap();
    let resident_bytes = stats::resident::mib().unwrap().read().unwrap();
    let allocated_mib = allocated_bytes as f64 / (1024.0 * 1024.0);
    let resident_mib = resident_bytes as f64 / (1024.0 * 1024.0);

    if common.verify {
        println!("Verified: {:?}", grid.is_solved());
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            &grid,
            givens,
            &solve_stats,
            allocated_mib,
            resident_mib,
        );
    }

    match outcome {
        SolveOutcome::Solved => {
            if common.print_solution {
                print!("{grid}");
            }
            if let Some(output) = output {
                sud::write_file(&grid, output)
                    .unwrap_or_else(|e| panic!("Unable to write file {}: {}", output.display(), e));
                println!("Solution written to: {}", output.display());
            }
            println!("\nSOLVED");
        }
        SolveOutcome::Unsolvable => println!("\nUNSOLVABLE"),
    }
}

/// Solves every .sud file found under `dir`, recursively.
fn solve_directory(dir: &Path, common: &CommonOptions) {
    let mut count = 0usize;
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sud") {
            solve_path(path, None, common);
            count += 1;
        }
    }
    println!("\nProcessed {count} file(s) from {}", dir.display());
}

/// Helper function to print a single statistic line in a formatted table row.
fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {:<28} {:>18}  |", label, value);
}

/// Helper function to print a statistic line that includes a rate (value/second).
fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {:<20} {:>12} ({:>9.0}/sec)  |", label, value, rate);
}

/// Prints a summary of problem and search statistics.
#[allow(clippy::too_many_arguments)]
fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    grid: &Grid,
    givens: usize,
    s: &SolveStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Block size", grid.n());
    stat_line("Grid side", grid.size());
    stat_line("Givens", givens);
    stat_line("Empty cells", grid.size() * grid.size() - givens);

    println!("========================[ Search Statistics ]========================");
    stat_line("Sweeps", s.sweeps);
    stat_line("X-Wing passes", s.x_wing_passes);
    stat_line("Deduced cells", s.deduced_cells);
    stat_line("Searched cells", s.searched_cells);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line("Backtracking used", s.used_backtracking);
    stat_line("Memory usage (MiB)", format!("{:.2}", allocated));
    stat_line("Resident memory (MiB)", format!("{:.2}", resident));
    stat_line("CPU time (s)", format!("{:.3}", elapsed_secs));
    println!("=====================================================================");
}
