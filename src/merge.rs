//! Line compaction: the single slide-and-merge primitive every direction reduces to.

use crate::board::{BOARD_SIZE, Line};

/// Slide a line toward index 0, merging equal neighbours once.
///
/// Empty cells are dropped, then the surviving tiles are scanned left to right:
/// two equal tiles in a row become one tile holding their sum and the scan
/// resumes after the pair, so a freshly merged tile never merges again in the
/// same move. Returns the new line (zero padded on the right) and the sum of
/// all merged values.
pub fn merge_line(line: Line) -> (Line, u32) {
    let mut out = [0; BOARD_SIZE];
    let mut gained = 0;
    let mut tiles = line.into_iter().filter(|&v| v != 0).peekable();
    let mut slot = 0;
    while let Some(value) = tiles.next() {
        let placed = if tiles.next_if_eq(&value).is_some() {
            let merged = value * 2;
            gained += merged;
            merged
        } else {
            value
        };
        out[slot] = placed;
        slot += 1;
    }
    (out, gained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::reverse_line;
    use proptest::prelude::*;

    fn line() -> impl Strategy<Value = Line> {
        prop::array::uniform4(prop_oneof![Just(0u32), (1u32..=11).prop_map(|e| 1 << e)])
    }

    #[test]
    fn four_equal_tiles_make_two_pairs() {
        assert_eq!(merge_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
    }

    #[test]
    fn gap_between_equal_tiles_is_closed() {
        assert_eq!(merge_line([2, 0, 2, 4]), ([4, 4, 0, 0], 4));
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        assert_eq!(merge_line([4, 4, 8, 0]), ([8, 8, 0, 0], 8));
        assert_eq!(merge_line([2, 2, 4, 8]), ([4, 4, 8, 0], 4));
    }

    #[test]
    fn leftmost_pair_wins_for_three_equal_tiles() {
        assert_eq!(merge_line([0, 4, 4, 4]), ([8, 4, 0, 0], 8));
    }

    #[test]
    fn untouched_lines() {
        assert_eq!(merge_line([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
        assert_eq!(merge_line([2, 4, 8, 16]), ([2, 4, 8, 16], 0));
        assert_eq!(merge_line([0, 0, 0, 2]), ([2, 0, 0, 0], 0));
    }

    #[test]
    fn reverse_line_mirrors() {
        assert_eq!(reverse_line([1, 2, 3, 4]), [4, 3, 2, 1]);
    }

    proptest! {
        #[test]
        fn reverse_twice_is_identity(l in line()) {
            prop_assert_eq!(reverse_line(reverse_line(l)), l);
        }

        #[test]
        fn each_output_tile_comes_from_at_most_two_inputs(l in line()) {
            let (out, gained) = merge_line(l);
            let inputs: Vec<u32> = l.iter().copied().filter(|&v| v != 0).collect();
            let mut i = 0;
            let mut merged_sum = 0;
            for &v in out.iter().take_while(|&&v| v != 0) {
                if inputs[i] == v {
                    i += 1;
                } else {
                    prop_assert_eq!(inputs[i], inputs[i + 1]);
                    prop_assert_eq!(inputs[i] * 2, v);
                    merged_sum += v;
                    i += 2;
                }
            }
            prop_assert_eq!(i, inputs.len());
            prop_assert_eq!(merged_sum, gained);
            prop_assert!(out.iter().skip_while(|&&v| v != 0).all(|&v| v == 0));
        }
    }
}
