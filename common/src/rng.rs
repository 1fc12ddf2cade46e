//! Xorshift32 pseudo-random source for sequence colors and player ids.

use crate::colors::{Color, NUM_COLORS};

/// Seed used when the caller hands in zero (xorshift would stay at zero forever).
const FALLBACK_SEED: u32 = 0x2545_F491;

#[derive(Clone, Debug)]
pub struct Rng(u32);

impl Rng {
    pub const fn new(seed: u32) -> Self {
        if seed == 0 { Self(FALLBACK_SEED) } else { Self(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    /// Value in `0..max`; zero behaves like one.
    pub fn range(
        &mut self,
        max: u32,
    ) -> u32 {
        self.next_u32() % max.max(1)
    }

    /// Uniformly chosen pad color.
    pub fn color(&mut self) -> Color {
        let index = self.range(NUM_COLORS as u32) as usize;
        Color::from_index(index).unwrap_or(Color::Red)
    }
}
