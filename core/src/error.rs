//! Error types for match commands
//!
//! Every command either applies fully or returns one of these without touching
//! state, so callers are free to treat an `Err` as a silent no-op.

use core::fmt;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Errors that can occur while handling a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameError {
    /// Command is not accepted in the current phase
    WrongPhase,
    /// Not enough gold to pay for the action
    NotEnoughGold { have: i32, need: i32 },
    /// Board already holds the maximum number of units and the purchase would not fuse
    BoardFull,
    /// The requested unit is not among the current shop offers
    OfferNotFound,
    /// Shop is already at the top level
    ShopMaxLevel,
    /// No room is registered under the given code
    RoomNotFound,
    /// The room already seats two peers
    RoomFull,
    /// The peer token does not belong to the room
    UnknownPeer,
    /// The room was torn down because a peer left or went idle
    OpponentLeft,
    /// The room was closed some time after its match ended
    RoomClosed,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::WrongPhase => write!(f, "not allowed in the current phase"),
            GameError::NotEnoughGold { have, need } => {
                write!(f, "not enough gold: have {have}, need {need}")
            }
            GameError::BoardFull => write!(f, "board is full (max 5)"),
            GameError::OfferNotFound => write!(f, "unit is not in the shop"),
            GameError::ShopMaxLevel => write!(f, "shop is already at max level"),
            GameError::RoomNotFound => write!(f, "room not found"),
            GameError::RoomFull => write!(f, "room is full"),
            GameError::UnknownPeer => write!(f, "peer is not seated in this room"),
            GameError::OpponentLeft => write!(f, "opponent left"),
            GameError::RoomClosed => write!(f, "room closed after the match ended"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}

impl GameError {
    /// Whether the error means a room or peer could not be found
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            GameError::RoomNotFound
                | GameError::UnknownPeer
                | GameError::OpponentLeft
                | GameError::RoomClosed
        )
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
