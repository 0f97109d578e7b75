//! Terminal position detection

use crate::{board::*, HEIGHT, RUN_LENGTH, WIDTH};

/// The outcome of inspecting a single position
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Evaluation {
    pub is_terminal: bool,
    /// +1 if player one has won, -1 if player two has won, 0 otherwise
    pub utility: i32,
}

impl Evaluation {
    pub const ONGOING: Evaluation = Evaluation {
        is_terminal: false,
        utility: 0,
    };
    pub const DRAW: Evaluation = Evaluation {
        is_terminal: true,
        utility: 0,
    };

    pub fn win(player: Player) -> Self {
        Self {
            is_terminal: true,
            utility: player.utility(),
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self.utility {
            1 => Some(Player::One),
            -1 => Some(Player::Two),
            _ => None,
        }
    }
}

/// Row and column steps along each diagonal, upwards-right then downwards-right
const DIAGONALS: [(isize, isize); 2] = [(-1, 1), (1, 1)];

/// Returns the owner of the first run of `RUN_LENGTH` identical tiles.
///
/// A longer run is reported as soon as its first `RUN_LENGTH` tiles are seen.
fn first_run<I: IntoIterator<Item = Cell>>(line: I) -> Option<Player> {
    let mut count = 0;
    let mut last = Cell::Empty;
    for cell in line {
        if cell.is_empty() {
            count = 0;
        } else if cell == last {
            count += 1;
        } else {
            count = 1;
        }
        last = cell;
        if count == RUN_LENGTH {
            return cell.owner();
        }
    }
    None
}

/// Start cells of every `RUN_LENGTH` window along direction `(dr, dc)` that fits
/// on the board, column by column from the left
fn window_starts(dr: isize, dc: isize) -> impl Iterator<Item = (usize, usize)> {
    let span = RUN_LENGTH as isize - 1;
    let fits = move |start: usize, step: isize, size: usize| {
        let end = start as isize + step * span;
        end >= 0 && end < size as isize
    };
    (0..WIDTH)
        .flat_map(|column| (0..HEIGHT).map(move |row| (row, column)))
        .filter(move |&(row, column)| fits(row, dr, HEIGHT) && fits(column, dc, WIDTH))
}

fn window_owner(
    board: &Board,
    (row, column): (usize, usize),
    (dr, dc): (isize, isize),
) -> Option<Player> {
    let first = board.get(row, column);
    // windows starting on an empty cell are never checked
    first.owner()?;
    let aligned = (1..RUN_LENGTH as isize).all(|i| {
        let r = (row as isize + dr * i) as usize;
        let c = (column as isize + dc * i) as usize;
        board.get(r, c) == first
    });
    if aligned {
        first.owner()
    } else {
        None
    }
}

/// Finds the winner of a position, if any
///
/// Rows are scanned top to bottom, then columns left to right, then every
/// diagonal window. The first alignment found decides the winner.
pub fn find_winner(board: &Board) -> Option<Player> {
    let rows =
        (0..HEIGHT).find_map(|row| first_run((0..WIDTH).map(|column| board.get(row, column))));
    if rows.is_some() {
        return rows;
    }

    let columns =
        (0..WIDTH).find_map(|column| first_run((0..HEIGHT).map(|row| board.get(row, column))));
    if columns.is_some() {
        return columns;
    }

    DIAGONALS.iter().find_map(|&direction| {
        window_starts(direction.0, direction.1)
            .find_map(|start| window_owner(board, start, direction))
    })
}

/// Decides whether a position is terminal, and its utility if so
///
/// A position is terminal once either player has an alignment of `RUN_LENGTH`
/// tiles, or when no legal moves remain (a draw).
pub fn evaluate(board: &Board) -> Evaluation {
    match find_winner(board) {
        Some(player) => Evaluation::win(player),
        None if board.legal_moves().next().is_none() => Evaluation::DRAW,
        None => Evaluation::ONGOING,
    }
}
