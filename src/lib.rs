//! A perfect agent for analysing 'Connect 3', a Connect 4 variant played
//! on a 4x5 grid where three in a row wins
//!
//! The agent runs an exhaustive minimax search over the remaining game tree
//! to find the game-theoretic value of a position and the best column for
//! the player to move.
//!
//! # Basic Usage
//!
//! ```
//! use connect3_ai::{board::Board, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board = Board::from_grid(".....\n.....\n.....\nXX.OO")?;
//! let result = Solver::new(board).solve();
//!
//! assert_eq!((result.utility, result.best_move), (1, Some(2)));
//! assert_eq!(result.to_string(), "1 X2");
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod evaluation;

pub mod solver;

mod test;

pub use board::{Board, BoardError, Cell, Player};
pub use evaluation::Evaluation;
pub use solver::{Baseline, SearchResult, Solver};

/// The width of the game board in tiles
pub const WIDTH: usize = 5;

/// The height of the game board in tiles
pub const HEIGHT: usize = 4;

/// The number of aligned tiles needed to win
pub const RUN_LENGTH: usize = 3;

// a winning run must fit on the board in every direction
const_assert!(RUN_LENGTH <= WIDTH && RUN_LENGTH <= HEIGHT);
// the search depth is bounded by the number of cells
const_assert!(WIDTH * HEIGHT <= 32);
