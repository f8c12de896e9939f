//! Injectable randomness.
//!
//! Course-of-action selection draws uniformly in `[0, 1)` and activation
//! rationalization shuffles candidates. Both go through [`DrawUniform`]
//! so tests can pin the outcome with a seeded or scripted source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A uniform `[0, 1)` source.
pub trait DrawUniform: Send {
    /// Draws the next value.
    fn draw(&mut self) -> f64;
}

/// The standard RNG, either entropy-seeded or reproducibly seeded.
pub struct StdDraw(StdRng);

impl StdDraw {
    /// An entropy-seeded source for production use.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// A reproducibly seeded source for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DrawUniform for StdDraw {
    fn draw(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed draw sequence, then repeats the final value.
///
/// Lets a test force an exact selection path through the probabilistic
/// CoA picker.
pub struct ScriptedDraw {
    script: Vec<f64>,
    next: usize,
}

impl ScriptedDraw {
    /// Creates a scripted source from the given sequence.
    #[must_use]
    pub fn new(script: Vec<f64>) -> Self {
        Self { script, next: 0 }
    }

    /// How many draws have been consumed.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl DrawUniform for ScriptedDraw {
    fn draw(&mut self) -> f64 {
        let value = self
            .script
            .get(self.next)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or(0.0);
        self.next += 1;
        value
    }
}

/// Fisher-Yates shuffle driven by a [`DrawUniform`].
pub fn shuffle<T>(rng: &mut dyn DrawUniform, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let j = ((rng.draw() * (i + 1) as f64) as usize).min(i);
        items.swap(i, j);
    }
}
