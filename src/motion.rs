//! Motion diff: reconstructs where each tile travelled during a move.
//!
//! Boards carry plain values, not tile identities, so provenance is rebuilt
//! from the value sequences of each line before and after the move. The result
//! only drives animation; a wrong pairing is cosmetic.

use crate::board::{BOARD_SIZE, Board, Line, Pos};
use crate::engine::Direction;

/// One source tile's displacement. Two records with the same `to` are a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionRecord {
    pub from: Pos,
    pub to: Pos,
}

impl MotionRecord {
    /// Cells travelled along the move axis.
    pub fn distance(&self) -> usize {
        self.from.row.abs_diff(self.to.row) + self.from.col.abs_diff(self.to.col)
    }
}

/// Board coordinate of index `i` in line `k` when that line is oriented so the
/// tiles slide toward index 0.
fn line_pos(direction: Direction, k: usize, i: usize) -> Pos {
    let last = BOARD_SIZE - 1;
    match direction {
        Direction::Left => Pos::new(k, i),
        Direction::Right => Pos::new(k, last - i),
        Direction::Up => Pos::new(i, k),
        Direction::Down => Pos::new(last - i, k),
    }
}

fn oriented_line(board: &Board, direction: Direction, k: usize) -> Line {
    std::array::from_fn(|i| board.get(line_pos(direction, k, i)))
}

/// Pair source indices with destination indices for one oriented line.
///
/// Destinations are walked in order with a cursor into the sources: an equal
/// value moved there alone, two equal sources summing to the destination were
/// merged into it, anything else is attributed to the next source. Stops when
/// the sources run out.
fn line_moves(old: &Line, new: &Line) -> Vec<(usize, usize)> {
    let from_idx: Vec<usize> = (0..BOARD_SIZE).filter(|&i| old[i] != 0).collect();
    let to_idx = (0..BOARD_SIZE).filter(|&i| new[i] != 0);

    let mut moves = Vec::with_capacity(from_idx.len());
    let mut p = 0;
    for dest in to_idx {
        let Some(&first) = from_idx.get(p) else {
            break;
        };
        let value = new[dest];
        let first_val = old[first];
        if first_val == value {
            moves.push((first, dest));
            p += 1;
            continue;
        }
        if let Some(&second) = from_idx.get(p + 1) {
            let second_val = old[second];
            if first_val == second_val && first_val + second_val == value {
                moves.push((first, dest));
                moves.push((second, dest));
                p += 2;
                continue;
            }
        }
        moves.push((first, dest));
        p += 1;
    }
    moves
}

/// Motion records for every tile of `old` given the post-move board `new`.
pub fn compute_moves(old: &Board, new: &Board, direction: Direction) -> Vec<MotionRecord> {
    (0..BOARD_SIZE)
        .flat_map(|k| {
            let old_line = oriented_line(old, direction, k);
            let new_line = oriented_line(new, direction, k);
            line_moves(&old_line, &new_line)
                .into_iter()
                .map(move |(from, to)| MotionRecord {
                    from: line_pos(direction, k, from),
                    to: line_pos(direction, k, to),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::apply_direction;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn rec(from: (usize, usize), to: (usize, usize)) -> MotionRecord {
        MotionRecord {
            from: Pos::new(from.0, from.1),
            to: Pos::new(to.0, to.1),
        }
    }

    #[test]
    fn merge_to_the_right_reports_both_sources() {
        let old = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let r = apply_direction(&old, Direction::Right);
        let moves = compute_moves(&old, &r.board, Direction::Right);
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&rec((0, 0), (0, 3))));
        assert!(moves.contains(&rec((0, 1), (0, 3))));
    }

    #[test]
    fn line_moves_slide_and_merge() {
        assert_eq!(line_moves(&[2, 0, 2, 4], &[4, 4, 0, 0]), vec![(0, 0), (2, 0), (3, 1)]);
        assert_eq!(
            line_moves(&[2, 2, 2, 2], &[4, 4, 0, 0]),
            vec![(0, 0), (1, 0), (2, 1), (3, 1)]
        );
        assert_eq!(line_moves(&[0, 0, 0, 8], &[8, 0, 0, 0]), vec![(3, 0)]);
    }

    #[test]
    fn mismatched_values_fall_back_to_next_source() {
        assert_eq!(line_moves(&[2, 4, 0, 0], &[8, 0, 0, 0]), vec![(0, 0)]);
        assert_eq!(line_moves(&[2, 0, 0, 0], &[4, 8, 0, 0]), vec![(0, 0)]);
    }

    #[test]
    fn stationary_tiles_stay_put() {
        let old = Board::from_rows([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]);
        let r = apply_direction(&old, Direction::Up);
        let moves = compute_moves(&old, &r.board, Direction::Up);
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|m| m.from == m.to && m.distance() == 0));
    }

    #[test]
    fn down_moves_map_back_to_columns() {
        let old = Board::from_rows([[4, 0, 0, 0], [0; 4], [4, 0, 0, 0], [0, 0, 0, 2]]);
        let r = apply_direction(&old, Direction::Down);
        let moves = compute_moves(&old, &r.board, Direction::Down);
        assert!(moves.contains(&rec((2, 0), (3, 0))));
        assert!(moves.contains(&rec((0, 0), (3, 0))));
        assert!(moves.contains(&rec((3, 3), (3, 3))));
        assert_eq!(rec((0, 0), (3, 0)).distance(), 3);
    }

    fn board() -> impl Strategy<Value = Board> {
        prop::array::uniform4(prop::array::uniform4(prop_oneof![
            Just(0u32),
            (1u32..=11).prop_map(|e| 1 << e)
        ]))
        .prop_map(Board::from_rows)
    }

    proptest! {
        #[test]
        fn motions_account_for_every_tile(b in board(), d in prop::sample::select(Direction::ALL.to_vec())) {
            let r = apply_direction(&b, d);
            let moves = compute_moves(&b, &r.board, d);
            prop_assert_eq!(moves.len(), b.tile_count());

            let mut arriving: HashMap<Pos, u32> = HashMap::new();
            for m in &moves {
                prop_assert_ne!(b.get(m.from), 0);
                *arriving.entry(m.to).or_default() += b.get(m.from);
            }
            for (pos, total) in arriving {
                prop_assert_eq!(r.board.get(pos), total);
            }
        }
    }
}
