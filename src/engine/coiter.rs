//! Ordered co-iteration of two sorted sequences.
//!
//! Given two sequences sorted by the same total order, [`CoIterator`]
//! yields matched and unmatched pairs: equal heads are yielded together and
//! both cursors advance; otherwise the lesser head is yielded alone. Every
//! element of either sequence appears in exactly one yielded pair, and
//! elements are never paired unless the comparator says they are equal.
//!
//! Equality is the comparator returning [`Ordering::Equal`], not object
//! identity. The sequences must be strictly sorted; duplicate keys within
//! one side are the caller's bug (tree builders reject them).

use std::cmp::Ordering;
use std::iter::Peekable;

/// Co-iterates two sorted iterators over a shared total order.
pub struct CoIterator<T, L, R, F>
where
    L: Iterator<Item = T>,
    R: Iterator<Item = T>,
    F: FnMut(&T, &T) -> Ordering,
{
    left: Peekable<L>,
    right: Peekable<R>,
    cmp: F,
}

impl<T, L, R, F> CoIterator<T, L, R, F>
where
    L: Iterator<Item = T>,
    R: Iterator<Item = T>,
    F: FnMut(&T, &T) -> Ordering,
{
    pub fn new(left: L, right: R, cmp: F) -> Self {
        Self {
            left: left.peekable(),
            right: right.peekable(),
            cmp,
        }
    }
}

impl<T, L, R, F> Iterator for CoIterator<T, L, R, F>
where
    L: Iterator<Item = T>,
    R: Iterator<Item = T>,
    F: FnMut(&T, &T) -> Ordering,
{
    type Item = (Option<T>, Option<T>);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.left.peek(), self.right.peek()) {
            (None, None) => None,
            (Some(_), None) => Some((self.left.next(), None)),
            (None, Some(_)) => Some((None, self.right.next())),
            (Some(l), Some(r)) => match (self.cmp)(l, r) {
                Ordering::Equal => Some((self.left.next(), self.right.next())),
                Ordering::Less => Some((self.left.next(), None)),
                Ordering::Greater => Some((None, self.right.next())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(left: &[&str], right: &[&str]) -> Vec<(Option<String>, Option<String>)> {
        CoIterator::new(
            left.iter().map(|s| s.to_string()),
            right.iter().map(|s| s.to_string()),
            |a, b| a.cmp(b),
        )
        .collect()
    }

    #[test]
    fn matches_equal_elements() {
        let result = pairs(&["a", "c"], &["a", "b", "c"]);
        assert_eq!(
            result,
            vec![
                (Some("a".into()), Some("a".into())),
                (None, Some("b".into())),
                (Some("c".into()), Some("c".into())),
            ]
        );
    }

    #[test]
    fn empty_left_yields_all_right() {
        let result = pairs(&[], &["a", "b"]);
        assert_eq!(
            result,
            vec![(None, Some("a".into())), (None, Some("b".into()))]
        );
    }

    #[test]
    fn empty_right_yields_all_left() {
        let result = pairs(&["a", "b"], &[]);
        assert_eq!(
            result,
            vec![(Some("a".into()), None), (Some("b".into()), None)]
        );
    }

    #[test]
    fn both_empty_yields_nothing() {
        assert!(pairs(&[], &[]).is_empty());
    }

    #[test]
    fn disjoint_sequences_interleave_in_order() {
        let result = pairs(&["a", "c"], &["b", "d"]);
        assert_eq!(
            result,
            vec![
                (Some("a".into()), None),
                (None, Some("b".into())),
                (Some("c".into()), None),
                (None, Some("d".into())),
            ]
        );
    }

    #[test]
    fn identical_sequences_match_fully() {
        let result = pairs(&["a", "b"], &["a", "b"]);
        assert!(result.iter().all(|(l, r)| l.is_some() && r.is_some()));
        assert_eq!(result.len(), 2);
    }
}
