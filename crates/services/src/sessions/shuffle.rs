use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Injectable randomness for question ordering.
pub trait RandomSource: Send {
    /// Uniformly random index in `0..=upper`.
    fn index_inclusive(&mut self, upper: usize) -> usize;
}

/// Adapts any `rand` generator into a `RandomSource`.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngSource<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Deterministic generator for tests and reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn index_inclusive(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..=upper)
    }
}

/// Unbiased in-place Fisher–Yates shuffle.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen slot at or below it, so every permutation is equally likely.
pub fn shuffle<T>(items: &mut [T], source: &mut (impl RandomSource + ?Sized)) {
    for i in (1..items.len()).rev() {
        let j = source.index_inclusive(i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Replays a fixed list of indices.
    struct ScriptedSource {
        picks: Vec<usize>,
        asked: Vec<usize>,
    }

    impl RandomSource for ScriptedSource {
        fn index_inclusive(&mut self, upper: usize) -> usize {
            self.asked.push(upper);
            self.picks.remove(0)
        }
    }

    #[test]
    fn follows_fisher_yates_swap_sequence() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        let mut source = ScriptedSource {
            picks: vec![0, 2, 0],
            asked: Vec::new(),
        };

        shuffle(&mut items, &mut source);

        // i=3 swaps with 0, i=2 with itself, i=1 with 0.
        assert_eq!(items, vec!['b', 'd', 'c', 'a']);
        assert_eq!(source.asked, vec![3, 2, 1]);
    }

    #[test]
    fn empty_and_single_inputs_draw_nothing() {
        let mut source = ScriptedSource {
            picks: Vec::new(),
            asked: Vec::new(),
        };
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut source);
        let mut single = vec![1];
        shuffle(&mut single, &mut source);

        assert!(source.asked.is_empty());
        assert_eq!(single, vec![1]);
    }

    #[test]
    fn every_permutation_is_equally_likely() {
        const TRIALS: usize = 60_000;
        let mut source = RngSource::seeded(0x5eed);
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();

        for _ in 0..TRIALS {
            let mut items = vec![1_u8, 2, 3];
            shuffle(&mut items, &mut source);
            *counts.entry(items).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        let expected = TRIALS / 6;
        for (perm, count) in &counts {
            assert!(
                count.abs_diff(expected) < expected / 15,
                "permutation {perm:?} seen {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn first_element_has_no_positional_bias() {
        const TRIALS: usize = 50_000;
        let mut source = RngSource::seeded(42);
        let mut stayed_first = 0_usize;

        for _ in 0..TRIALS {
            let mut items = [0_u8, 1, 2, 3, 4];
            shuffle(&mut items, &mut source);
            if items[0] == 0 {
                stayed_first += 1;
            }
        }

        let expected = TRIALS / 5;
        assert!(
            stayed_first.abs_diff(expected) < expected / 20,
            "first element kept its slot {stayed_first} times, expected about {expected}"
        );
    }
}
