//! Deterministic RNG for shop draws and combat rolls
//!
//! The random source is always passed in explicitly, so a seeded match replays
//! identically: same seed, same offers, same crits.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Trait for random number generation in the simulation
pub trait GameRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a random number in range [0, max)
    fn gen_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }

    /// Roll a percentage chance. 0 never succeeds and 100 always does,
    /// neither consumes a draw.
    fn roll_percent(&mut self, percent: u32) -> bool {
        if percent == 0 {
            return false;
        }
        if percent >= 100 {
            return true;
        }
        (self.gen_range(100) as u32) < percent
    }
}

/// XorShift32 RNG - simple, fast, deterministic
///
/// This is suitable for game logic where cryptographic security is not needed.
/// The same seed will always produce the same sequence.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is folded into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }
}

impl GameRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xorshift_deterministic() {
        let mut rng1 = XorShiftRng::seed_from_u64(12345);
        let mut rng2 = XorShiftRng::seed_from_u64(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = XorShiftRng::seed_from_u64(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_gen_range() {
        let mut rng = XorShiftRng::seed_from_u64(42);

        for _ in 0..100 {
            let val = rng.gen_range(10);
            assert!(val < 10);
        }
        assert_eq!(rng.gen_range(0), 0);
    }

    #[test]
    fn test_roll_percent_edges() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let before = rng.clone();

        assert!(!rng.roll_percent(0));
        assert!(rng.roll_percent(100));
        // Certain outcomes leave the stream untouched
        assert_eq!(rng, before);

        let hits = (0..1000).filter(|_| rng.roll_percent(50)).count();
        assert!((400..600).contains(&hits), "50% roll hit {hits} of 1000");
    }
}
