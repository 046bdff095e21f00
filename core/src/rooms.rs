//! Two-player rooms for the networked mode.
//!
//! A [`RoomRegistry`] maps short room codes to rooms. The creator takes side
//! A, the first peer to join takes side B and starts a versus [`Match`].
//! Commands are routed by peer token to that peer's side; every change to a
//! room bumps its version so hosts know when to push a fresh view.
//!
//! Peers are polled rather than connected, so a peer counts as gone once it
//! has not been seen for the registry's idle timeout. Leaving, going idle or
//! sitting in a finished match for that long tears the room down and cancels
//! the match's timers. A closed code is remembered for a while so the peer
//! still polling it learns why it disappeared.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::engine::{Match, MatchMode, PhaseTimings};
use crate::error::{GameError, GameResult};
use crate::limits::Side;
use crate::rng::{GameRng, XorShiftRng};
use crate::state::Purchase;
use crate::types::UnitKind;
use crate::view::SeatView;

/// Length of a room code
pub const ROOM_CODE_LEN: usize = 4;
/// Default time without a request after which a peer counts as disconnected
pub const DEFAULT_IDLE_MS: u64 = 30_000;
/// How long a closed room's code keeps answering with the reason it closed
pub const TOMBSTONE_MS: u64 = 10 * 60_000;

const ROOM_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Short upper-case base-36 code identifying a room
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Normalise user input; codes are case-insensitive
    pub fn parse(code: &str) -> Self {
        RoomCode(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token identifying a connected peer. Always below 2^53.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PeerToken(pub u64);

/// Where a peer was seated
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub room: RoomCode,
    pub peer: PeerToken,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeatedPeer {
    token: PeerToken,
    last_seen: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub code: RoomCode,
    /// Seated peers, side A first
    peers: Vec<SeatedPeer>,
    game: Option<Match>,
    version: u64,
    /// When the match was first seen over
    ended_at: Option<u64>,
}

impl Room {
    fn new(code: RoomCode, creator: PeerToken, now: u64) -> Self {
        Self {
            code,
            peers: alloc::vec![SeatedPeer {
                token: creator,
                last_seen: now,
            }],
            game: None,
            version: 0,
            ended_at: None,
        }
    }

    pub fn side_of(&self, peer: PeerToken) -> Option<Side> {
        match self.peers.iter().position(|p| p.token == peer)? {
            0 => Some(Side::A),
            _ => Some(Side::B),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.game.is_none()
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Why the room should close at `now`, if it should
    fn expiry(&self, now: u64, idle_ms: u64) -> Option<CloseReason> {
        if self
            .peers
            .iter()
            .any(|p| now.saturating_sub(p.last_seen) >= idle_ms)
        {
            return Some(CloseReason::PeerGone);
        }
        match self.ended_at {
            Some(at) if now.saturating_sub(at) >= idle_ms => Some(CloseReason::MatchOver),
            _ => None,
        }
    }
}

/// Why a room was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    /// A peer left or stopped polling
    PeerGone,
    /// The match ended and the room outlived it
    MatchOver,
}

impl From<CloseReason> for GameError {
    fn from(reason: CloseReason) -> Self {
        match reason {
            CloseReason::PeerGone => GameError::OpponentLeft,
            CloseReason::MatchOver => GameError::RoomClosed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
struct Tombstone {
    reason: CloseReason,
    at: u64,
}

/// One peer's view of its room
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room: RoomCode,
    pub side: Side,
    pub version: u64,
    /// Still waiting for the second peer
    pub waiting: bool,
    pub game: Option<SeatView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomCode, Room>,
    closed: BTreeMap<RoomCode, Tombstone>,
    rng: XorShiftRng,
    timings: PhaseTimings,
    idle_ms: u64,
}

impl RoomRegistry {
    pub fn new(seed: u64) -> Self {
        Self::with_timings(seed, PhaseTimings::default())
    }

    pub fn with_timings(seed: u64, timings: PhaseTimings) -> Self {
        Self {
            rooms: BTreeMap::new(),
            closed: BTreeMap::new(),
            rng: XorShiftRng::seed_from_u64(seed),
            timings,
            idle_ms: DEFAULT_IDLE_MS,
        }
    }

    /// Set how long a peer may go without a request before its room closes
    pub fn with_idle_timeout(mut self, idle_ms: u64) -> Self {
        self.idle_ms = idle_ms;
        self
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Open a room and seat the creator on side A
    pub fn create_room(&mut self, now: u64) -> Seat {
        let code = self.fresh_code();
        let peer = self.fresh_peer();
        self.closed.remove(&code);
        self.rooms
            .insert(code.clone(), Room::new(code.clone(), peer, now));
        log::info!("room {} created", code);
        Seat {
            room: code,
            peer,
            side: Side::A,
        }
    }

    /// Seat a second peer on side B and start the match
    pub fn join_room(&mut self, code: &RoomCode, now: u64) -> GameResult<Seat> {
        if self.lookup(code)?.peers.len() >= 2 {
            return Err(GameError::RoomFull);
        }
        let peer = self.fresh_peer();
        let seed = self.next_seed();
        let timings = self.timings;
        let room = self.rooms.get_mut(code).ok_or(GameError::RoomNotFound)?;
        room.peers.push(SeatedPeer {
            token: peer,
            last_seen: now,
        });
        room.game = Some(Match::start_with_timings(MatchMode::Versus, seed, now, timings));
        room.touch();
        log::info!("room {} full, match started", code);
        Ok(Seat {
            room: code.clone(),
            peer,
            side: Side::B,
        })
    }

    /// Record that `peer` is still around. Hosts call this for every request
    /// a peer makes; returns the peer's side.
    pub fn heartbeat(&mut self, code: &RoomCode, peer: PeerToken, now: u64) -> GameResult<Side> {
        let side = self
            .lookup(code)?
            .side_of(peer)
            .ok_or(GameError::UnknownPeer)?;
        if let Some(seated) = self
            .rooms
            .get_mut(code)
            .and_then(|room| room.peers.get_mut(side.index()))
        {
            seated.last_seen = seated.last_seen.max(now);
        }
        Ok(side)
    }

    pub fn buy(
        &mut self,
        code: &RoomCode,
        peer: PeerToken,
        kind: UnitKind,
    ) -> GameResult<Purchase> {
        self.with_game(code, peer, |game, side| game.buy(side, kind))
    }

    pub fn reroll(&mut self, code: &RoomCode, peer: PeerToken) -> GameResult<()> {
        self.with_game(code, peer, |game, side| game.reroll(side))
    }

    pub fn level_up_shop(&mut self, code: &RoomCode, peer: PeerToken) -> GameResult<()> {
        self.with_game(code, peer, |game, side| game.level_up_shop(side))
    }

    /// The room as `peer` may see it
    pub fn room_view(&self, code: &RoomCode, peer: PeerToken) -> GameResult<RoomView> {
        let room = self.lookup(code)?;
        let side = room.side_of(peer).ok_or(GameError::UnknownPeer)?;
        Ok(RoomView {
            room: room.code.clone(),
            side,
            version: room.version,
            waiting: room.is_waiting(),
            game: room.game.as_ref().map(|game| game.seat_view(side)),
        })
    }

    /// Remove `peer` and tear down its room. Returns the closed room's code.
    pub fn leave(&mut self, peer: PeerToken, now: u64) -> Option<RoomCode> {
        let code = self
            .rooms
            .values()
            .find(|room| room.side_of(peer).is_some())
            .map(|room| room.code.clone())?;
        self.close_room(&code, CloseReason::PeerGone, now);
        Some(code)
    }

    /// Drop a room, cancelling its match timers
    pub fn close_room(&mut self, code: &RoomCode, reason: CloseReason, now: u64) -> bool {
        let Some(mut room) = self.rooms.remove(code) else {
            return false;
        };
        if let Some(game) = room.game.as_mut() {
            game.abort();
        }
        self.closed
            .insert(code.clone(), Tombstone { reason, at: now });
        log::info!("room {} closed: {:?}", code, reason);
        true
    }

    /// Fire due timers in every running match, then close rooms whose peers
    /// went idle or whose match has been over for the idle timeout. Returns
    /// the codes of rooms that changed and are still open.
    pub fn tick(&mut self, now: u64) -> Vec<RoomCode> {
        let mut changed = Vec::new();
        for room in self.rooms.values_mut() {
            let Some(game) = room.game.as_mut() else {
                continue;
            };
            let fired = game.tick(now) > 0;
            let over = game.is_over();
            if fired {
                room.touch();
                changed.push(room.code.clone());
            }
            if over && room.ended_at.is_none() {
                room.ended_at = Some(now);
            }
        }

        let expired: Vec<(RoomCode, CloseReason)> = self
            .rooms
            .values()
            .filter_map(|room| Some((room.code.clone(), room.expiry(now, self.idle_ms)?)))
            .collect();
        for (code, reason) in expired {
            self.close_room(&code, reason, now);
            changed.retain(|c| *c != code);
        }

        self.closed
            .retain(|_, tomb| now.saturating_sub(tomb.at) < TOMBSTONE_MS);
        changed
    }

    /// Earliest timer across all rooms
    pub fn next_due(&self) -> Option<u64> {
        self.rooms
            .values()
            .filter_map(|room| room.game.as_ref()?.next_due())
            .min()
    }

    /// An open room, or the reason a recently closed one went away
    fn lookup(&self, code: &RoomCode) -> GameResult<&Room> {
        if let Some(room) = self.rooms.get(code) {
            return Ok(room);
        }
        match self.closed.get(code) {
            Some(tomb) => Err(tomb.reason.into()),
            None => Err(GameError::RoomNotFound),
        }
    }

    fn with_game<T>(
        &mut self,
        code: &RoomCode,
        peer: PeerToken,
        f: impl FnOnce(&mut Match, Side) -> GameResult<T>,
    ) -> GameResult<T> {
        self.lookup(code)?;
        let room = self.rooms.get_mut(code).ok_or(GameError::RoomNotFound)?;
        let side = room.side_of(peer).ok_or(GameError::UnknownPeer)?;
        let game = room.game.as_mut().ok_or(GameError::WrongPhase)?;
        let result = f(game, side)?;
        room.touch();
        Ok(result)
    }

    fn fresh_code(&mut self) -> RoomCode {
        loop {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| ROOM_CODE_ALPHABET[self.rng.gen_range(ROOM_CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    fn fresh_peer(&mut self) -> PeerToken {
        loop {
            // fits in an IEEE double so JSON clients read it back exactly
            let token = PeerToken(self.next_seed() >> 11);
            let taken = self
                .rooms
                .values()
                .any(|room| room.side_of(token).is_some());
            if !taken {
                return token;
            }
        }
    }

    fn next_seed(&mut self) -> u64 {
        ((self.rng.next_u32() as u64) << 32) | self.rng.next_u32() as u64
    }
}
