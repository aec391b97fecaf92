//! Roll sources: the single place randomness enters the engine.
//!
//! A [`RollSource`] produces uniform draws in `[0, 1)`. All higher-level
//! helpers (`uniform`, `chance`, `pick`, `range_inclusive`) are built on
//! `next_unit` and consume exactly one draw each, so the number and order
//! of draws is a stable contract that replays can rely on.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random draws.
///
/// Implementors only supply [`RollSource::next_unit`]. The provided helpers
/// derive every other kind of roll from a single draw.
///
/// # Example
///
/// ```
/// use luck::{RollSource, SeededRolls};
///
/// let mut rolls = SeededRolls::new(7);
/// let variance = rolls.uniform(0.8, 1.2);
/// assert!((0.8..1.2).contains(&variance));
/// ```
pub trait RollSource {
    /// Returns the next uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Returns a uniform value in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }

    /// Bernoulli trial: `true` iff the draw is strictly below `probability`.
    ///
    /// A probability of `0.0` never succeeds and `1.0` always does.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }

    /// Picks an index in `0..len`.
    ///
    /// Returns 0 when `len` is 0. The draw is consumed either way.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn pick(&mut self, len: usize) -> usize {
        let draw = self.next_unit();
        if len == 0 {
            return 0;
        }
        ((draw * len as f64) as usize).min(len - 1)
    }

    /// Returns an integer in `low..=high`.
    ///
    /// If `high < low` the bounds are swapped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        let (low, high) = if high < low { (high, low) } else { (low, high) };
        let span = usize::try_from(i64::from(high) - i64::from(low) + 1).unwrap_or(usize::MAX);
        low + self.pick(span) as i32
    }
}

impl<R: RollSource + ?Sized> RollSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<R: RollSource + ?Sized> RollSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

// =============================================================================
// Seeded
// =============================================================================

/// Deterministic roll source backed by ChaCha8.
///
/// Two sources created with the same seed produce bit-identical draw
/// sequences on every platform.
#[derive(Debug, Clone)]
pub struct SeededRolls {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRolls {
    /// Creates a roll source from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a roll source from a process-random seed.
    ///
    /// Only the outermost entry point should call this. The chosen seed is
    /// kept so the run can be replayed with [`SeededRolls::new`].
    #[must_use]
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::thread_rng().gen();
        tracing::debug!(seed, "seeded roll source from entropy");
        Self::new(seed)
    }

    /// Returns the seed this source was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewinds the stream to its first draw.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

impl RollSource for SeededRolls {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

// =============================================================================
// Scripted
// =============================================================================

/// Roll source that replays a fixed list of draws, cycling when exhausted.
///
/// Intended for tests that need an exact outcome: a script of `[0.3]`
/// makes every Bernoulli trial with chance above 0.3 succeed.
///
/// # Example
///
/// ```
/// use luck::{RollSource, ScriptedRolls};
///
/// let mut rolls = ScriptedRolls::new(vec![0.1, 0.9]);
/// assert!(rolls.chance(0.5));
/// assert!(!rolls.chance(0.5));
/// assert!(rolls.chance(0.5)); // cycles back to 0.1
/// assert_eq!(rolls.draws_taken(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedRolls {
    script: Vec<f64>,
    cursor: usize,
    taken: u64,
}

impl ScriptedRolls {
    /// Creates a scripted source.
    ///
    /// # Panics
    ///
    /// Panics if `draws` is empty.
    #[must_use]
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        let script = draws.into();
        assert!(!script.is_empty(), "scripted roll source needs at least one draw");
        Self {
            script,
            cursor: 0,
            taken: 0,
        }
    }

    /// Creates a source that always returns `draw`.
    #[must_use]
    pub fn constant(draw: f64) -> Self {
        Self::new(vec![draw])
    }

    /// Number of draws handed out so far.
    #[must_use]
    pub fn draws_taken(&self) -> u64 {
        self.taken
    }
}

impl RollSource for ScriptedRolls {
    fn next_unit(&mut self) -> f64 {
        let draw = self.script[self.cursor];
        self.cursor = (self.cursor + 1) % self.script.len();
        self.taken += 1;
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod seeded_tests {
        use super::*;

        #[test]
        fn same_seed_same_sequence() {
            let mut a = SeededRolls::new(42);
            let mut b = SeededRolls::new(42);
            for _ in 0..100 {
                assert_eq!(a.next_unit().to_bits(), b.next_unit().to_bits());
            }
        }

        #[test]
        fn different_seeds_diverge() {
            let mut a = SeededRolls::new(1);
            let mut b = SeededRolls::new(2);
            let seq_a: Vec<f64> = (0..8).map(|_| a.next_unit()).collect();
            let seq_b: Vec<f64> = (0..8).map(|_| b.next_unit()).collect();
            assert_ne!(seq_a, seq_b);
        }

        #[test]
        fn draws_are_in_unit_interval() {
            let mut rolls = SeededRolls::new(9);
            for _ in 0..1_000 {
                let draw = rolls.next_unit();
                assert!((0.0..1.0).contains(&draw), "draw out of range: {draw}");
            }
        }

        #[test]
        fn reset_replays_stream() {
            let mut rolls = SeededRolls::new(99);
            let first = rolls.next_unit();
            let _ = rolls.next_unit();
            rolls.reset();
            assert_eq!(rolls.next_unit(), first);
            assert_eq!(rolls.seed(), 99);
        }
    }

    mod scripted_tests {
        use super::*;

        #[test]
        fn replays_and_cycles() {
            let mut rolls = ScriptedRolls::new(vec![0.25, 0.75]);
            assert_eq!(rolls.next_unit(), 0.25);
            assert_eq!(rolls.next_unit(), 0.75);
            assert_eq!(rolls.next_unit(), 0.25);
            assert_eq!(rolls.draws_taken(), 3);
        }

        #[test]
        #[should_panic(expected = "at least one draw")]
        fn empty_script_panics() {
            let _ = ScriptedRolls::new(Vec::<f64>::new());
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn chance_is_strict() {
            let mut rolls = ScriptedRolls::constant(0.5);
            assert!(!rolls.chance(0.5));
            assert!(rolls.chance(0.51));
        }

        #[test]
        fn chance_zero_never_and_one_always() {
            let mut low = ScriptedRolls::constant(0.0);
            assert!(!low.chance(0.0));
            let mut high = ScriptedRolls::constant(0.999_999);
            assert!(high.chance(1.0));
        }

        #[test]
        fn uniform_maps_draw_linearly() {
            let mut rolls = ScriptedRolls::constant(0.5);
            assert!((rolls.uniform(0.8, 1.2) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn pick_covers_every_index() {
            let mut rolls = ScriptedRolls::new(vec![0.0, 0.49, 0.5, 0.999]);
            assert_eq!(rolls.pick(2), 0);
            assert_eq!(rolls.pick(2), 0);
            assert_eq!(rolls.pick(2), 1);
            assert_eq!(rolls.pick(2), 1);
        }

        #[test]
        fn pick_on_empty_consumes_a_draw() {
            let mut rolls = ScriptedRolls::constant(0.7);
            assert_eq!(rolls.pick(0), 0);
            assert_eq!(rolls.draws_taken(), 1);
        }

        #[test]
        fn range_inclusive_hits_both_ends() {
            let mut rolls = ScriptedRolls::new(vec![0.0, 0.999]);
            assert_eq!(rolls.range_inclusive(1, 2), 1);
            assert_eq!(rolls.range_inclusive(1, 2), 2);
        }

        #[test]
        fn mutable_reference_is_a_source() {
            fn draw_twice(mut source: impl RollSource) -> (f64, f64) {
                (source.next_unit(), source.next_unit())
            }
            let mut rolls = ScriptedRolls::new(vec![0.1, 0.2, 0.3]);
            assert_eq!(draw_twice(&mut rolls), (0.1, 0.2));
            assert_eq!(rolls.next_unit(), 0.3);
        }
    }
}
