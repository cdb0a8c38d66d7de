//! Randomness for the agent's guesses and for laying out mines.
//!
//! A fixed seed replays a game exactly; without one the generator draws
//! from `getrandom` (browser crypto on wasm32).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of guesses. `SmallRng` is enough: nothing here is adversarial.
#[derive(Debug, Clone)]
pub struct AgentRng {
    inner: SmallRng,
}

impl AgentRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, system entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self {
                inner: SmallRng::from_os_rng(),
            },
        }
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    #[inline(always)]
    pub fn below(&mut self, len: usize) -> usize {
        self.inner.random_range(0..len)
    }

    /// One candidate chosen uniformly, `None` when there are no candidates.
    pub fn pick<T: Copy>(&mut self, candidates: &[T]) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.below(candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_guesses() {
        let cells: Vec<usize> = (0..64).collect();
        let mut first = AgentRng::from_optional_seed(Some(42));
        let mut second = AgentRng::from_seed(42);
        let a: Vec<_> = (0..32).map(|_| first.pick(&cells)).collect();
        let b: Vec<_> = (0..32).map(|_| second.pick(&cells)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pick_without_candidates() {
        let mut rng = AgentRng::from_optional_seed(None);
        assert_eq!(rng.pick::<u8>(&[]), None);
        assert_eq!(rng.pick(&['x']), Some('x'));
    }

    #[test]
    fn test_pick_reaches_every_candidate() {
        let mut rng = AgentRng::from_seed(7);
        let mut seen = [false; 4];
        for _ in 0..400 {
            seen[rng.pick(&[0usize, 1, 2, 3]).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_below_stays_in_range() {
        let mut rng = AgentRng::from_seed(123);
        assert!((0..1000).all(|_| rng.below(9) < 9));
    }
}
