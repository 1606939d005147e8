//! RNG module - gem kind selection
//!
//! Newly placed pieces draw their kind uniformly from the palette. This is the
//! only nondeterminism in the engine, so it sits behind the [`KindSource`]
//! trait: games use [`SeededKinds`], tests can replay a fixed sequence with
//! [`ScriptedKinds`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::GemKind;

/// Supplier of kinds for freshly placed pieces
pub trait KindSource {
    /// Draw a kind in `0..palette_size`
    fn draw(&mut self, palette_size: u8) -> GemKind;
}

/// Uniform draw from a seeded `StdRng`
#[derive(Debug, Clone)]
pub struct SeededKinds {
    rng: StdRng,
    seed: u64,
}

impl SeededKinds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this source was created with (for restarting with the same sequence)
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededKinds {
    fn default() -> Self {
        Self::new(1)
    }
}

impl KindSource for SeededKinds {
    fn draw(&mut self, palette_size: u8) -> GemKind {
        debug_assert!(palette_size > 0);
        GemKind::new(self.rng.random_range(0..palette_size))
    }
}

/// Replays a fixed sequence of kind indices, wrapping around at the end.
///
/// Indices are reduced modulo the palette size so a script never produces an
/// out-of-palette kind.
#[derive(Debug, Clone)]
pub struct ScriptedKinds {
    script: Vec<u8>,
    cursor: usize,
}

impl ScriptedKinds {
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        let script = script.into();
        assert!(!script.is_empty(), "kind script must not be empty");
        Self { script, cursor: 0 }
    }

    /// How many kinds have been drawn so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl KindSource for ScriptedKinds {
    fn draw(&mut self, palette_size: u8) -> GemKind {
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        GemKind::new(value % palette_size)
    }
}
