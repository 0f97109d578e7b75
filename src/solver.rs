//! An agent to solve positions of Connect 3

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use std::fmt;
use std::time::Instant;

use crate::{board::*, evaluation::*, HEIGHT, WIDTH};

/// The running best value the top-level search starts from
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Baseline {
    /// Start from a draw: a move is only chosen if it does strictly better than
    /// a draw for the player to move
    Draw,
    /// Start from an unbounded value: the first legal move is always a candidate
    Unbounded,
}

impl Default for Baseline {
    fn default() -> Self {
        Baseline::Draw
    }
}

/// The value of a position and the move chosen for the player to move
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchResult {
    /// +1 if player one wins with best play, -1 if player two wins, 0 for a draw
    pub utility: i32,
    /// The chosen column (0-indexed), or `None` if no move beat the baseline
    pub best_move: Option<usize>,
    /// The player to move in the searched position
    pub player: Player,
}

// "<utility> <mark><column>", with -1 standing in for a missing move
impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.utility, self.player.mark())?;
        match self.best_move {
            Some(column) => write!(f, "{}", column),
            None => write!(f, "-1"),
        }
    }
}

/// An agent to solve Connect 3 positions
///
/// # Notes
/// This agent runs a plain minimax search over the whole remaining game tree.
/// The 4x5 board holds at most 20 tiles so every search runs to completion
/// without pruning or depth limits.
///
/// # Move Choice
/// Candidate moves are tried in ascending column order and replace the current
/// best only when strictly better for the player to move. With
/// [`Baseline::Draw`] the running best starts at 0, so a move whose best
/// outcome is a draw (or a loss) is never reported.
#[derive(Clone)]
pub struct Solver {
    board: Board,

    /// The number of positions visited by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
    baseline: Baseline,
    parallel: bool,
}

impl Solver {
    /// Creates a new `Solver` for a position
    pub fn new(board: Board) -> Self {
        Self {
            board,
            node_count: 0,
            baseline: Baseline::default(),
            parallel: false,
        }
    }

    /// Sets the value the top-level search starts from
    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Searches the top-level moves on the rayon thread pool
    ///
    /// Results are gathered in column order before a move is chosen, so the
    /// outcome is identical to the sequential search.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Computes the minimax value of a position
    fn minimax(&mut self, board: &Board) -> i32 {
        self.node_count += 1;

        let evaluation = evaluate(board);
        if evaluation.is_terminal {
            return evaluation.utility;
        }

        // a full column yields no successor and is skipped
        let scores = board
            .legal_moves()
            .filter_map(|column| board.play(column))
            .map(|next| self.minimax(&next));
        let best = match board.current_player() {
            Player::One => scores.max(),
            Player::Two => scores.min(),
        };
        // a non-terminal position always has a legal move
        best.unwrap_or(0)
    }

    /// Scores one top-level move on a fresh copy of the solver
    ///
    /// Returns the score and the number of positions searched
    fn score_move(&self, next: &Board, progress: Option<&ProgressBar>) -> (i32, usize) {
        let mut solver = self.clone();
        solver.node_count = 0;
        let score = solver.minimax(next);
        if let Some(progress) = progress {
            progress.inc(1);
        }
        (score, solver.node_count)
    }

    /// Performs the top-level search, keeping track of the best move
    fn top_level_search(&mut self, progress: Option<&ProgressBar>) -> SearchResult {
        self.node_count += 1;

        let player = self.board.current_player();
        let evaluation = evaluate(&self.board);

        let board = self.board;
        let children: Vec<(usize, Board)> = board
            .legal_moves()
            .filter_map(|column| board.play(column).map(|next| (column, next)))
            .collect();

        // both branches keep column order
        let scored: Vec<(i32, usize)> = if self.parallel {
            children
                .par_iter()
                .map_with(progress.cloned(), |progress, (_, next)| {
                    self.score_move(next, progress.as_ref())
                })
                .collect()
        } else {
            children
                .iter()
                .map(|(_, next)| self.score_move(next, progress))
                .collect()
        };
        self.node_count += scored.iter().map(|&(_, nodes)| nodes).sum::<usize>();

        let mut best_score = match self.baseline {
            Baseline::Draw => Some(0),
            Baseline::Unbounded => None,
        };
        let mut best_move = None;
        for (&(column, _), &(score, _)) in children.iter().zip(scored.iter()) {
            let improves = match (best_score, player) {
                (None, _) => true,
                (Some(best), Player::One) => score > best,
                (Some(best), Player::Two) => score < best,
            };
            if improves {
                best_score = Some(score);
                best_move = Some(column);
            }
        }

        let scores = scored.iter().map(|&(score, _)| score);
        let utility = if evaluation.is_terminal {
            evaluation.utility
        } else {
            match player {
                Player::One => scores.max(),
                Player::Two => scores.min(),
            }
            .unwrap_or(0)
        };

        SearchResult {
            utility,
            best_move,
            player,
        }
    }

    /// Calculate the value and best move of the current position
    pub fn solve(&mut self) -> SearchResult {
        self._solve(true)
    }

    /// Calculate the value and best move of the current position, logging progress to stderr
    pub fn solve_verbose(&mut self) -> SearchResult {
        self._solve(false)
    }

    fn _solve(&mut self, silent: bool) -> SearchResult {
        if silent {
            return self.top_level_search(None);
        }

        let start = Instant::now();
        let progress = ProgressBar::new(self.board.legal_moves().count() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("Searching moves: {bar:40.cyan/blue} {pos}/{len} {msg}")
                .progress_chars("█▓▒░  "),
        );
        progress.set_message(&format!(
            "({} empty cells)",
            WIDTH * HEIGHT - self.board.num_moves()
        ));

        let result = self.top_level_search(Some(&progress));
        progress.finish();

        let elapsed = start.elapsed().as_secs_f64();
        eprintln!(
            "Search complete in {:.3}ms, positions: {}, kpos/s: {:.1}",
            elapsed * 1000.0,
            self.node_count,
            self.node_count as f64 / (1000.0 * elapsed.max(f64::EPSILON))
        );
        result
    }
}

impl std::ops::Deref for Solver {
    type Target = Board;

    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn result_line_format() {
        let result = SearchResult {
            utility: 1,
            best_move: Some(2),
            player: Player::One,
        };
        assert_eq!(result.to_string(), "1 X2");

        let result = SearchResult {
            utility: 0,
            best_move: None,
            player: Player::Two,
        };
        assert_eq!(result.to_string(), "0 O-1");
    }

    #[test]
    fn immediate_win_is_taken() -> Result<()> {
        let board = Board::from_grid(".....\n.....\n.....\nXX.OO")?;
        let result = Solver::new(board).solve();
        assert_eq!(result.utility, 1);
        assert_eq!(result.best_move, Some(2));
        assert_eq!(result.player, Player::One);
        Ok(())
    }

    #[test]
    fn player_two_minimises() -> Result<()> {
        let board = Board::from_grid(".....\n.....\n.X...\nXOO.X")?;
        let result = Solver::new(board).solve();
        assert_eq!(result.to_string(), "-1 O3");
        Ok(())
    }

    #[test]
    fn draw_baseline_reports_no_move_for_a_loss() -> Result<()> {
        let board = Board::from_grid(".....\n.....\n.XX..\n.OO..")?;

        let result = Solver::new(board).solve();
        assert_eq!(result.utility, -1);
        assert_eq!(result.best_move, None);
        assert_eq!(result.to_string(), "-1 X-1");

        let result = Solver::new(board)
            .with_baseline(Baseline::Unbounded)
            .solve();
        assert_eq!(result.to_string(), "-1 X0");
        Ok(())
    }

    #[test]
    fn full_board_has_no_moves() -> Result<()> {
        let board = Board::from_grid("XOXOX\nXOXOX\nOXOXO\nOXOXO")?;
        let mut solver = Solver::new(board);
        let result = solver.solve();
        assert_eq!(result.to_string(), "0 X-1");
        assert_eq!(solver.node_count, 1);
        Ok(())
    }

    #[test]
    fn node_count_matches_tree_size() -> Result<()> {
        // one empty cell left: the root and its single child
        let board = Board::from_grid("X.XOX\nXOXOX\nOXOXO\nOXOXO")?;
        let mut solver = Solver::new(board);
        assert_eq!(solver.solve().to_string(), "0 O-1");
        assert_eq!(solver.node_count, 2);
        Ok(())
    }

    #[test]
    fn parallel_search_matches_sequential() -> Result<()> {
        for moves in &["3322", "2332245", "43143342", "554121"] {
            let board = Board::from_moves(moves)?;
            for &baseline in &[Baseline::Draw, Baseline::Unbounded] {
                let mut sequential = Solver::new(board).with_baseline(baseline);
                let mut parallel = Solver::new(board)
                    .with_baseline(baseline)
                    .with_parallel(true);
                assert_eq!(sequential.solve(), parallel.solve());
                assert_eq!(sequential.node_count, parallel.node_count);
            }
        }
        Ok(())
    }
}
