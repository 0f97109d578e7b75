use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};
use thiserror::Error;

use std::fmt;
use std::io::{stdout, Write};

use crate::{evaluation::evaluate, HEIGHT, WIDTH};

/// Problems found while building a board from text or a move list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("expected {expected} board cells but found {found}")]
    WrongCellCount { expected: usize, found: usize },
    #[error("unknown mark '{mark}' at cell {index}, marks must be one of '.', 'X' or 'O'")]
    UnknownMark { mark: char, index: usize },
    #[error("floating piece at row {row}, column {column}: an empty cell lies below it")]
    FloatingPiece { row: usize, column: usize },
    #[error("impossible piece count: {player_one} 'X' and {player_two} 'O' pieces")]
    PieceCount { player_one: usize, player_two: usize },
    #[error("could not parse '{0}' as a valid move")]
    InvalidMove(char),
    #[error("Invalid move, column {column} out of range. Columns must be between 1 and {width}")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("Invalid move, column {0} full")]
    ColumnFull(usize),
    #[error("Invalid position, game is over")]
    GameOver,
}

/// One of the two competing sides, `One` always moves first
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The character used for this player's tiles in the text format
    pub fn mark(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn cell(self) -> Cell {
        match self {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }

    /// The utility of a win for this player: +1 for player one, -1 for player two
    pub fn utility(self) -> i32 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cell {
    Empty,
    PlayerOne,
    PlayerTwo,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn owner(&self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
        }
    }

    pub fn mark(&self) -> char {
        self.owner().map_or('.', Player::mark)
    }

    pub fn from_mark(mark: char) -> Option<Self> {
        match mark {
            '.' => Some(Cell::Empty),
            'X' => Some(Cell::PlayerOne),
            'O' => Some(Cell::PlayerTwo),
            _ => None,
        }
    }
}

/// A Connect 3 position
///
/// Cells are stored row by row with row 0 at the top of the board, so pieces
/// fall towards row `HEIGHT - 1`. A `Board` is never changed in place: playing
/// a move produces a new board.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Board {
    cells: [[Cell; WIDTH]; HEIGHT],
    num_moves: usize,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; WIDTH]; HEIGHT],
            num_moves: 0,
        }
    }

    /// Parses a board from its text grid
    ///
    /// Whitespace is ignored, the remaining characters are read row by row from
    /// the top of the board and must be exactly `WIDTH * HEIGHT` marks.
    pub fn from_grid<S: AsRef<str>>(grid: S) -> Result<Self> {
        let marks: Vec<char> = grid
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if marks.len() != WIDTH * HEIGHT {
            return Err(BoardError::WrongCellCount {
                expected: WIDTH * HEIGHT,
                found: marks.len(),
            }
            .into());
        }

        let mut board = Self::new();
        for (index, &mark) in marks.iter().enumerate() {
            let cell = Cell::from_mark(mark).ok_or(BoardError::UnknownMark { mark, index })?;
            board.cells[index / WIDTH][index % WIDTH] = cell;
        }
        board.validate()?;
        board.num_moves = board.count(Cell::PlayerOne) + board.count(Cell::PlayerTwo);
        Ok(board)
    }

    /// Builds a board by playing a string of 1-indexed column digits from the
    /// empty position, e.g. "1332"
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    // abort if the position is won at any point
                    if evaluate(&board).winner().is_some() {
                        return Err(BoardError::GameOver.into());
                    }
                    board = board
                        .play(column - 1)
                        .ok_or(BoardError::ColumnFull(column))?;
                }
                Some(column) => {
                    return Err(BoardError::ColumnOutOfRange {
                        column,
                        width: WIDTH,
                    }
                    .into())
                }
                None => return Err(BoardError::InvalidMove(column_char).into()),
            }
        }
        Ok(board)
    }

    // gravity consistency and alternating piece counts
    fn validate(&self) -> Result<(), BoardError> {
        for column in 0..WIDTH {
            for row in 1..HEIGHT {
                if !self.cells[row - 1][column].is_empty() && self.cells[row][column].is_empty() {
                    return Err(BoardError::FloatingPiece {
                        row: row - 1,
                        column,
                    });
                }
            }
        }

        let player_one = self.count(Cell::PlayerOne);
        let player_two = self.count(Cell::PlayerTwo);
        if player_one < player_two || player_one - player_two > 1 {
            return Err(BoardError::PieceCount {
                player_one,
                player_two,
            });
        }
        Ok(())
    }

    fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }

    pub fn get(&self, row: usize, column: usize) -> Cell {
        self.cells[row][column]
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    /// The player to move, derived from the parity of the filled cells
    pub fn current_player(&self) -> Player {
        if self.num_moves % 2 == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    pub fn playable(&self, column: usize) -> bool {
        column < WIDTH && self.cells[0][column].is_empty()
    }

    /// Columns that can take another tile, in ascending order
    pub fn legal_moves(&self) -> impl Iterator<Item = usize> + '_ {
        (0..WIDTH).filter(move |&column| self.playable(column))
    }

    pub fn is_full(&self) -> bool {
        self.num_moves == WIDTH * HEIGHT
    }

    /// Drops a tile for the current player into `column`
    ///
    /// Returns the resulting board, or `None` if the column is full or out of range.
    pub fn play(&self, column: usize) -> Option<Board> {
        if column >= WIDTH {
            return None;
        }
        let row = (0..HEIGHT)
            .rev()
            .find(|&row| self.cells[row][column].is_empty())?;

        let mut next = *self;
        next.cells[row][column] = self.current_player().cell();
        next.num_moves += 1;
        Some(next)
    }

    /// Draws the board to the terminal with coloured tiles
    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        let cols: String = (0..WIDTH).map(|x| x.to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;

        for row in self.cells.iter() {
            for cell in row.iter() {
                stdout.queue(PrintStyledContent(
                    style(cell.mark())
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match cell {
                            Cell::PlayerOne => Color::Red,
                            Cell::PlayerTwo => Color::Yellow,
                            Cell::Empty => Color::Grey,
                        }),
                ))?;
            }
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// renders the same grid format that `from_grid` reads
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row.iter() {
                write!(f, "{}", cell.mark())?;
            }
        }
        Ok(())
    }
}
