//! Deterministic, seedable pseudo-random primitives (C9, spec.md §4.9).
//!
//! A single generator state is threaded by `&mut` through the search
//! frames rather than kept as global mutable state (spec.md §9).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Thin wrapper around `StdRng` exposing exactly the primitives the search
/// needs, so call sites read as the spec's vocabulary (`coin`,
/// `uniform_pick`, ...) rather than raw `rand` calls.
pub struct Prng(StdRng);

impl Prng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// `coin(p)`: true with probability `p`. Short-circuited for `p` in
    /// `{0, 1}` so no generator state is consumed at the boundaries
    /// (spec.md §8 "Boundary behavior").
    pub fn coin(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.0.gen_bool(p)
    }

    /// `uniformPick(xs)`: `None` for an empty list.
    pub fn uniform_pick<'a, T>(&mut self, xs: &'a [T]) -> Option<&'a T> {
        xs.choose(&mut self.0)
    }

    /// `uniformPick` that also returns the chosen index, useful for
    /// removing the picked element afterwards (e.g. mutation's
    /// drop-a-random-key path).
    pub fn uniform_pick_index<T>(&mut self, xs: &[T]) -> Option<usize> {
        if xs.is_empty() {
            None
        } else {
            Some(self.0.gen_range(0..xs.len()))
        }
    }

    /// `uniformRange(lo, hi)`: inclusive on both ends.
    pub fn uniform_range(&mut self, lo: usize, hi: usize) -> usize {
        self.0.gen_range(lo..=hi)
    }

    /// `shuffle(xs)`: Fisher-Yates equivalent via repeated pick-and-delete.
    pub fn shuffle<T: Clone>(&mut self, xs: &[T]) -> Vec<T> {
        let mut pool: Vec<T> = xs.to_vec();
        let mut out = Vec::with_capacity(xs.len());
        while !pool.is_empty() {
            let idx = self.0.gen_range(0..pool.len());
            out.push(pool.remove(idx));
        }
        out
    }

    /// `partitionInPairs(xs)`: draw pairs without replacement until fewer
    /// than two elements remain; a trailing singleton is dropped.
    pub fn partition_in_pairs<T: Clone>(&mut self, xs: &[T]) -> Vec<(T, T)> {
        let mut pool = self.shuffle(xs);
        let mut pairs = Vec::with_capacity(pool.len() / 2);
        while pool.len() >= 2 {
            let a = pool.remove(0);
            let b = pool.remove(0);
            pairs.push((a, b));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_boundaries_are_exact() {
        let mut rng = Prng::from_seed(1);
        assert!(!rng.coin(0.0));
        assert!(rng.coin(1.0));
    }

    #[test]
    fn uniform_pick_on_empty_is_none() {
        let mut rng = Prng::from_seed(1);
        let xs: Vec<i32> = Vec::new();
        assert_eq!(rng.uniform_pick(&xs), None);
    }

    #[test]
    fn partition_in_pairs_drops_trailing_singleton() {
        let mut rng = Prng::from_seed(42);
        let pairs = rng.partition_in_pairs(&[1]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn partition_in_pairs_covers_every_element_exactly_once() {
        let mut rng = Prng::from_seed(7);
        let xs: Vec<i32> = (0..10).collect();
        let pairs = rng.partition_in_pairs(&xs);
        assert_eq!(pairs.len(), 5);
        let mut seen: Vec<i32> = pairs.iter().flat_map(|(a, b)| vec![*a, *b]).collect();
        seen.sort_unstable();
        assert_eq!(seen, xs);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let xs: Vec<i32> = (0..20).collect();
        let mut r1 = Prng::from_seed(123);
        let mut r2 = Prng::from_seed(123);
        assert_eq!(r1.shuffle(&xs), r2.shuffle(&xs));
    }
}
