use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Position of an item under two ordering sources.
/// Anything ranked by the primary source sorts before anything ranked only by
/// the secondary one; unranked items come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Primary(usize),
    Secondary(usize),
    Unranked,
}

impl Rank {
    pub fn of(primary: Option<usize>, secondary: Option<usize>) -> Rank {
        match (primary, secondary) {
            (Some(p), _) => Rank::Primary(p),
            (None, Some(s)) => Rank::Secondary(s),
            (None, None) => Rank::Unranked,
        }
    }
}

/// Sort items by primary rank, then secondary rank, then `fallback`.
/// The sort is stable.
pub fn merge_order<T, P, S, F>(items: &mut [T], primary: P, secondary: S, fallback: F)
where
    P: Fn(&T) -> Option<usize>,
    S: Fn(&T) -> Option<usize>,
    F: Fn(&T, &T) -> Ordering,
{
    items.sort_by(|a, b| {
        Rank::of(primary(a), secondary(a))
            .cmp(&Rank::of(primary(b), secondary(b)))
            .then_with(|| fallback(a, b))
    });
}

/// Index of each distinct value by order of first appearance.
pub fn first_appearance<K, I>(values: I) -> HashMap<K, usize>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    let mut ranks = HashMap::new();
    for value in values {
        let next = ranks.len();
        ranks.entry(value).or_insert(next);
    }
    ranks
}

/// Case-insensitive alphabetical order.
pub fn alphabetical(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
