//! Win and loss detection plus the game phase machine.

use crate::board::{BOARD_SIZE, Board, Pos};

/// Tile value that wins the game.
pub const WIN_TILE: u32 = 2048;

/// Playing → Won keeps the board interactive; Playing → Over is terminal
/// until restart. There is no Won ↔ Over transition within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Playing,
    Won,
    Over,
}

impl Phase {
    /// Phase after a committed move left `board` on the table.
    pub fn advance(self, board: &Board, target: u32) -> Self {
        match self {
            Self::Playing if has_won(board, target) => Self::Won,
            Self::Playing if is_over(board) => Self::Over,
            other => other,
        }
    }

    pub fn accepts_moves(self) -> bool {
        self != Self::Over
    }
}

pub fn has_won(board: &Board, target: u32) -> bool {
    board.max_tile() >= target
}

/// True when the board is full and no two orthogonal neighbours match.
pub fn is_over(board: &Board) -> bool {
    if board.has_empty() {
        return false;
    }
    !has_adjacent_pair(board)
}

fn has_adjacent_pair(board: &Board) -> bool {
    board.positions().any(|p| {
        let v = board.get(p);
        let right = p.col + 1 < BOARD_SIZE && board.get(Pos::new(p.row, p.col + 1)) == v;
        let below = p.row + 1 < BOARD_SIZE && board.get(Pos::new(p.row + 1, p.col)) == v;
        right || below
    })
}
