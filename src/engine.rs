//! Directional moves: all four directions reduce to sliding rows left.
//!
//! Right mirrors each row first, up transposes, down does both. The transforms
//! are their own inverses, so applying them again after the slide puts the
//! board back into its real orientation.

use crate::board::{BOARD_SIZE, Board};
use crate::merge::merge_line;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Left => "←",
            Self::Right => "→",
            Self::Up => "↑",
            Self::Down => "↓",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// Outcome of sliding a board once. `moved == false` means the board is
/// unchanged and the move must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub moved: bool,
    pub gained: u32,
}

pub fn apply_direction(board: &Board, direction: Direction) -> MoveResult {
    match direction {
        Direction::Left => slide_left(board),
        Direction::Right => slide_right(board),
        Direction::Up => {
            let r = slide_left(&board.transpose());
            MoveResult {
                board: r.board.transpose(),
                ..r
            }
        }
        Direction::Down => {
            let r = slide_right(&board.transpose());
            MoveResult {
                board: r.board.transpose(),
                ..r
            }
        }
    }
}

fn slide_left(board: &Board) -> MoveResult {
    let mut rows = [[0; BOARD_SIZE]; BOARD_SIZE];
    let mut gained = 0;
    for (out, row) in rows.iter_mut().zip(board.rows()) {
        let (line, g) = merge_line(*row);
        *out = line;
        gained += g;
    }
    let next = Board::from_rows(rows);
    MoveResult {
        board: next,
        moved: next != *board,
        gained,
    }
}

fn slide_right(board: &Board) -> MoveResult {
    let r = slide_left(&board.reverse_rows());
    MoveResult {
        board: r.board.reverse_rows(),
        ..r
    }
}
