//! Simulation ceilings and the two seats of a match

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Combat ends as a cutoff once this many steps have run
pub const MAX_COMBAT_STEPS: u32 = 200;
/// Passes of on-death resolution allowed after a single step
pub const MAX_DEATH_PASSES: u32 = 10;
/// Combat steps run per fight tick
pub const STEPS_PER_TICK: u32 = 1;
/// Combat steps run per fight tick once the player asked to fast-forward
pub const FAST_FORWARD_STEPS_PER_TICK: u32 = 8;

/// One of the two seats in a match. `A` is the local player in single player
/// mode and the room creator in the networked mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

/// Why a combat was cut off instead of ending with an empty side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitReason {
    /// The step counter reached [`MAX_COMBAT_STEPS`]
    StepCeiling,
    /// On-death chains were still producing deaths after [`MAX_DEATH_PASSES`]
    DeathCascade,
    /// The fight phase timer expired first
    PhaseTimeout,
}
