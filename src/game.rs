//! Game state: board, score, phase, spawning, and the busy gate around moves.

use crate::board::{Board, Pos};
use crate::engine::{Direction, apply_direction};
use crate::motion::{MotionRecord, compute_moves};
use crate::rules::{self, Phase, WIN_TILE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Probability that a spawned tile is a 2 rather than a 4.
const SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// A move that has been computed but not yet committed. While one exists the
/// game is busy and every further move request is dropped.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub direction: Direction,
    pub from: Board,
    pub to: Board,
    pub gained: u32,
    pub motions: Vec<MotionRecord>,
}

#[derive(Debug)]
pub struct GameState {
    board: Board,
    pub score: u32,
    pub best: u32,
    phase: Phase,
    /// Win overlay dismissed (keep going).
    won_acknowledged: bool,
    pending: Option<PendingMove>,
    /// Tiles placed by the last reset or commit (fade-in on screen).
    spawned: Vec<Pos>,
    target: u32,
    rng: StdRng,
}

impl GameState {
    pub fn new(config: &crate::GameConfig, best: u32) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut state = Self::with_rng(rng, best);
        state.reset();
        state
    }

    fn with_rng(rng: StdRng, best: u32) -> Self {
        Self {
            board: Board::EMPTY,
            score: 0,
            best,
            phase: Phase::Playing,
            won_acknowledged: false,
            pending: None,
            spawned: Vec::new(),
            target: WIN_TILE,
            rng,
        }
    }

    /// Fresh board with two random tiles. Best score survives.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.phase = Phase::Playing;
        self.won_acknowledged = false;
        self.pending = None;
        self.spawned.clear();
        self.spawn_random_tile();
        self.spawn_random_tile();
        info!(best = self.best, "new game");
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn spawned(&self) -> &[Pos] {
        &self.spawned
    }

    /// No move can change the board any more (full, no matching neighbours).
    pub fn is_stuck(&self) -> bool {
        rules::is_over(&self.board)
    }

    /// Place a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
    /// Does nothing on a full board.
    pub fn spawn_random_tile(&mut self) -> Option<Pos> {
        let empty = self.board.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let pos = empty[self.rng.random_range(0..empty.len())];
        let value = if self.rng.random_bool(SPAWN_TWO_PROBABILITY) {
            2
        } else {
            4
        };
        self.board = self.board.with(pos, value);
        self.spawned.push(pos);
        Some(pos)
    }

    /// Start a move. Returns `None` (and changes nothing) while busy, after the
    /// game is over, or when the board would not change.
    pub fn begin_move(&mut self, direction: Direction) -> Option<&PendingMove> {
        if self.is_busy() || !self.phase.accepts_moves() {
            debug!(%direction, busy = self.is_busy(), "move dropped");
            return None;
        }
        let result = apply_direction(&self.board, direction);
        if !result.moved {
            return None;
        }
        if self.phase == Phase::Won {
            self.won_acknowledged = true;
        }
        let motions = compute_moves(&self.board, &result.board, direction);
        self.pending = Some(PendingMove {
            direction,
            from: self.board,
            to: result.board,
            gained: result.gained,
            motions,
        });
        self.pending.as_ref()
    }

    /// Commit the pending move: new board, score, one spawned tile, then win
    /// and loss checks. Clears the busy gate. Returns the spawned cell.
    pub fn finish_move(&mut self) -> Option<Pos> {
        let pending = self.pending.take()?;
        debug_assert_eq!(pending.to.tile_sum(), pending.from.tile_sum());
        debug_assert!(pending.to.tile_count() <= pending.from.tile_count());
        debug!(
            direction = %pending.direction,
            gained = pending.gained,
            motions = pending.motions.len(),
            "move committed"
        );
        self.board = pending.to;
        self.score += pending.gained;
        if self.score > self.best {
            self.best = self.score;
        }
        self.spawned.clear();
        let spawned = self.spawn_random_tile();

        let before = self.phase;
        self.phase = self.phase.advance(&self.board, self.target);
        match (before, self.phase) {
            (Phase::Playing, Phase::Won) => {
                info!(score = self.score, "reached {}", self.target);
            }
            (Phase::Playing, Phase::Over) => {
                info!(score = self.score, max_tile = self.board.max_tile(), "game over");
                debug!("final board:\n{}", self.board);
            }
            _ => {}
        }
        spawned
    }

    /// Dismiss the win overlay and keep playing.
    pub fn keep_going(&mut self) {
        if self.phase == Phase::Won {
            self.won_acknowledged = true;
        }
    }

    /// Large centred message, if any.
    pub fn overlay_text(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Over => Some("Game over!"),
            Phase::Won if self.is_stuck() => Some("Game over!"),
            Phase::Won if !self.won_acknowledged => Some("You win!"),
            _ => None,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self.phase {
            Phase::Playing => "Use gestures or arrow keys to play.",
            Phase::Won if self.is_stuck() => "No more moves.",
            Phase::Won => "You made 2048! Keep going or restart.",
            Phase::Over => "No more moves.",
        }
    }
}

#[cfg(test)]
impl GameState {
    pub(crate) fn from_board(board: Board, seed: u64) -> Self {
        let mut state = Self::with_rng(StdRng::seed_from_u64(seed), 0);
        state.board = board;
        state
    }
}
