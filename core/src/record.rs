//! Persistent win/loss tally across matches.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Storage key under which hosts persist the [`Record`]
pub const RECORD_KEY: &str = "emojiBattlerRecord";

/// A finished match from one player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    /// Reached the round limit with both sides standing
    Points,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: u32,
}

impl Record {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Points => self.points += 1,
        }
    }

    pub fn played(&self) -> u32 {
        self.wins + self.losses + self.draws + self.points
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: &Record) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.draws += other.draws;
        self.points += other.points;
    }
}
