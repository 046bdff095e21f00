//! Emoji Battler simulation core.
//!
//! Shop generation, the gold economy, tag synergies, the autonomous opponent,
//! the combat engine and the round state machine. Presentation, audio and
//! network framing live outside this crate; they read a [`MatchView`] and
//! issue commands on [`Match`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod battle;
pub mod economy;
pub mod engine;
pub mod error;
pub mod limits;
pub mod opponents;
pub mod record;
pub mod rng;
pub mod rooms;
pub mod scheduler;
pub mod shop;
pub mod state;
pub mod synergy;
pub mod types;
pub mod units;
pub mod view;

#[cfg(test)]
mod tests;

pub use battle::*;
pub use engine::*;
pub use error::*;
pub use limits::*;
pub use opponents::{Difficulty, DifficultyProfile};
pub use record::*;
pub use rng::{GameRng, XorShiftRng};
pub use rooms::*;
pub use state::*;
pub use synergy::*;
pub use types::*;
pub use view::*;
