use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};

use std::fs;
use std::path::{Path, PathBuf};

use connect3_ai::*;

/// Solve a Connect 3 position: prints "<utility> <player><column>"
#[derive(Parser)]
#[command(
    name = "connect3",
    about = "Find the minimax value and best move of a Connect 3 position"
)]
struct Cli {
    /// Text file holding the 4x5 grid, one row per line using '.', 'X' and 'O'
    #[arg(required_unless_present = "moves", conflicts_with = "moves")]
    file: Option<PathBuf>,

    /// Build the position from 1-indexed column digits instead of a file, e.g. "3324"
    #[arg(long)]
    moves: Option<String>,

    /// Running best value the top-level search starts from
    #[arg(long, value_enum, default_value_t = BaselineArg::Draw)]
    baseline: BaselineArg,

    /// Search the top-level moves in parallel
    #[arg(long)]
    parallel: bool,

    /// Draw the position before solving it
    #[arg(long)]
    show: bool,

    /// Report search progress and statistics on stderr
    #[arg(long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum BaselineArg {
    Draw,
    Unbounded,
}

impl From<BaselineArg> for Baseline {
    fn from(arg: BaselineArg) -> Self {
        match arg {
            BaselineArg::Draw => Baseline::Draw,
            BaselineArg::Unbounded => Baseline::Unbounded,
        }
    }
}

fn load_board(path: &Path) -> Result<Board> {
    if !path.exists() {
        return Err(anyhow!(
            "File {} does not exist. Please input a proper text file",
            path.display()
        ));
    }
    if !path.is_file() {
        return Err(anyhow!(
            "{} is not a regular file. Please input a proper text file",
            path.display()
        ));
    }
    let grid = fs::read_to_string(path).with_context(|| {
        format!(
            "File {} cannot be read. Please input a proper text file",
            path.display()
        )
    })?;
    Board::from_grid(grid).with_context(|| format!("Invalid board in {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let board = match (&cli.file, &cli.moves) {
        (_, Some(moves)) => Board::from_moves(moves)?,
        (Some(path), None) => load_board(path)?,
        (None, None) => return Err(anyhow!("no position given")),
    };

    let mut solver = Solver::new(board)
        .with_baseline(cli.baseline.into())
        .with_parallel(cli.parallel);

    if cli.show {
        solver.display().context("Failed to draw board!")?;
    }

    let result = if cli.verbose {
        solver.solve_verbose()
    } else {
        solver.solve()
    };

    println!("{}", result);
    Ok(())
}
