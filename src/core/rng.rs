//! Deterministic random number generation for trigger gates and scripts.
//!
//! Every probability gate (`narg` percent chance on random, greet, act and
//! similar triggers) and every `%random.N%` lookup draws from one seeded
//! stream, so a replay with the same seed and the same inputs fires the same
//! triggers.
//!
//! ```
//! use rust_mudscript::core::ScriptRng;
//!
//! let mut a = ScriptRng::new(42);
//! let mut b = ScriptRng::new(42);
//! assert_eq!(a.number(1, 100), b.number(1, 100));
//!
//! // A 100% gate always passes
//! assert!(a.percent_chance(100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded RNG used by the scripting engine.
#[derive(Clone, Debug)]
pub struct ScriptRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl ScriptRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform integer in `low..=high`. Returns `low` when the range is empty.
    pub fn number(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Roll 1..=100 and compare against `chance`.
    pub fn percent_chance(&mut self, chance: i32) -> bool {
        self.number(1, 100) <= i64::from(chance)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> ScriptRngState {
        ScriptRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &ScriptRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for checkpointing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position
    pub word_pos: u128,
}
