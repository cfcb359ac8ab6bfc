//! Property tests for the ordered co-iteration.
//!
//! For any two strictly sorted sequences drawn from the same total order,
//! the co-iteration must cover every element of either side exactly once,
//! preserve order, and pair elements only when they compare equal.

use std::collections::BTreeSet;

use apidrift::engine::CoIterator;
use proptest::prelude::*;

fn sorted_unique() -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::btree_set(0u32..200, 0..40).prop_map(|s| s.into_iter().collect())
}

fn coiterate(left: &[u32], right: &[u32]) -> Vec<(Option<u32>, Option<u32>)> {
    CoIterator::new(
        left.iter().copied(),
        right.iter().copied(),
        |a, b| a.cmp(b),
    )
    .collect()
}

proptest! {
    #[test]
    fn totality_every_element_appears_exactly_once(
        left in sorted_unique(),
        right in sorted_unique(),
    ) {
        let pairs = coiterate(&left, &right);

        let lefts: Vec<u32> = pairs.iter().filter_map(|(l, _)| *l).collect();
        let rights: Vec<u32> = pairs.iter().filter_map(|(_, r)| *r).collect();

        prop_assert_eq!(lefts, left.clone());
        prop_assert_eq!(rights, right.clone());
    }

    #[test]
    fn matched_pairs_are_equal_and_unmatched_are_exclusive(
        left in sorted_unique(),
        right in sorted_unique(),
    ) {
        for (l, r) in coiterate(&left, &right) {
            match (l, r) {
                (Some(a), Some(b)) => prop_assert_eq!(a, b),
                (None, None) => prop_assert!(false, "empty pair yielded"),
                _ => {}
            }
        }
    }

    #[test]
    fn matches_are_exactly_the_intersection(
        left in sorted_unique(),
        right in sorted_unique(),
    ) {
        let intersection: BTreeSet<u32> = left
            .iter()
            .filter(|v| right.contains(v))
            .copied()
            .collect();

        let matched: BTreeSet<u32> = coiterate(&left, &right)
            .into_iter()
            .filter_map(|(l, r)| l.zip(r).map(|(a, _)| a))
            .collect();

        prop_assert_eq!(matched, intersection);
    }

    #[test]
    fn pair_count_is_union_size(
        left in sorted_unique(),
        right in sorted_unique(),
    ) {
        let union: BTreeSet<u32> = left.iter().chain(right.iter()).copied().collect();
        prop_assert_eq!(coiterate(&left, &right).len(), union.len());
    }

    #[test]
    fn yielded_keys_are_in_ascending_order(
        left in sorted_unique(),
        right in sorted_unique(),
    ) {
        let keys: Vec<u32> = coiterate(&left, &right)
            .into_iter()
            .map(|(l, r)| l.or(r).expect("no empty pairs"))
            .collect();

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(keys, sorted);
    }
}
