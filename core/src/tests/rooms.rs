use alloc::collections::BTreeSet;

use crate::engine::{MatchOutcome, MatchPhase, PhaseTimings};
use crate::error::GameError;
use crate::limits::Side;
use crate::rooms::*;
use crate::types::UnitKind;

fn open_room(registry: &mut RoomRegistry) -> (Seat, Seat) {
    let host = registry.create_room(0);
    let guest = registry.join_room(&host.room, 0).unwrap();
    (host, guest)
}

#[test]
fn test_create_room_seats_host_on_side_a() {
    let mut registry = RoomRegistry::new(1);
    let host = registry.create_room(0);

    assert_eq!(host.side, Side::A);
    assert_eq!(host.room.as_str().len(), ROOM_CODE_LEN);
    assert!(host
        .room
        .as_str()
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

    let view = registry.room_view(&host.room, host.peer).unwrap();
    assert!(view.waiting);
    assert!(view.game.is_none());
}

#[test]
fn test_room_codes_are_unique() {
    let mut registry = RoomRegistry::new(2);
    let codes: BTreeSet<_> = (0..200).map(|_| registry.create_room(0).room).collect();

    assert_eq!(codes.len(), 200);
    assert_eq!(registry.len(), 200);
}

#[test]
fn test_join_starts_match() {
    let mut registry = RoomRegistry::new(3);
    let (host, guest) = open_room(&mut registry);

    assert_eq!(guest.side, Side::B);
    assert_eq!(guest.room, host.room);
    assert_ne!(guest.peer, host.peer);

    let view = registry.room_view(&host.room, guest.peer).unwrap();
    assert!(!view.waiting);
    assert_eq!(view.side, Side::B);
    assert_eq!(view.game.unwrap().phase, MatchPhase::Shop);
}

#[test]
fn test_join_errors() {
    let mut registry = RoomRegistry::new(4);
    let (host, _) = open_room(&mut registry);

    assert_eq!(
        registry.join_room(&host.room, 0),
        Err(GameError::RoomFull)
    );
    assert_eq!(
        registry.join_room(&RoomCode::parse("zzzz-nope"), 0),
        Err(GameError::RoomNotFound)
    );
}

#[test]
fn test_codes_are_case_insensitive() {
    let mut registry = RoomRegistry::new(5);
    let host = registry.create_room(0);
    let lower = RoomCode::parse(&host.room.as_str().to_ascii_lowercase());

    assert!(registry.join_room(&lower, 0).is_ok());
}

#[test]
fn test_commands_route_to_peer_side() {
    let mut registry = RoomRegistry::new(6);
    let (host, guest) = open_room(&mut registry);
    let version = registry.room_view(&host.room, host.peer).unwrap().version;

    registry.reroll(&host.room, guest.peer).unwrap();

    let guest_view = registry.room_view(&host.room, guest.peer).unwrap();
    let host_view = registry.room_view(&host.room, host.peer).unwrap();
    assert_eq!(guest_view.game.unwrap().me.gold, 2);
    assert_eq!(host_view.game.unwrap().me.gold, 3);
    assert_eq!(host_view.version, version + 1);
}

#[test]
fn test_failed_command_keeps_version() {
    let mut registry = RoomRegistry::new(7);
    let host = registry.create_room(0);

    assert_eq!(
        registry.buy(&host.room, host.peer, UnitKind::Warrior),
        Err(GameError::WrongPhase)
    );
    assert_eq!(
        registry.room_view(&host.room, crate::rooms::PeerToken(0)),
        Err(GameError::UnknownPeer)
    );
    let view = registry.room_view(&host.room, host.peer).unwrap();
    assert_eq!(view.version, 0);
}

#[test]
fn test_buy_through_room() {
    let mut registry = RoomRegistry::new(8);
    let (host, _) = open_room(&mut registry);
    let offer = registry.room_view(&host.room, host.peer).unwrap().game.unwrap().me.shop[0].kind;

    registry.buy(&host.room, host.peer, offer).unwrap();

    let me = registry.room_view(&host.room, host.peer).unwrap().game.unwrap().me;
    assert_eq!(me.gold, 0);
    assert_eq!(me.board.len(), 1);
}

#[test]
fn test_tick_reports_changed_rooms() {
    let mut registry = RoomRegistry::new(9);
    let waiting = registry.create_room(0);
    let (host, _) = open_room(&mut registry);

    assert!(registry.tick(100).is_empty());
    assert_eq!(registry.next_due(), Some(25_000));

    let changed = registry.tick(25_000);
    assert_eq!(changed, alloc::vec![host.room.clone()]);
    let view = registry.room_view(&host.room, host.peer).unwrap();
    assert_eq!(view.game.unwrap().phase, MatchPhase::Fight);
    assert!(registry.room(&waiting.room).is_some());
}

#[test]
fn test_leave_tears_down_room() {
    let mut registry = RoomRegistry::new(10);
    let (host, guest) = open_room(&mut registry);

    assert_eq!(registry.leave(guest.peer, 0), Some(host.room.clone()));
    assert!(registry.is_empty());
    assert_eq!(
        registry.room_view(&host.room, host.peer),
        Err(GameError::OpponentLeft)
    );
    assert_eq!(
        registry.heartbeat(&host.room, host.peer, 10),
        Err(GameError::OpponentLeft)
    );
    assert_eq!(registry.leave(host.peer, 0), None);
    assert_eq!(registry.next_due(), None);

    // the reason is only kept for a while
    registry.tick(TOMBSTONE_MS);
    assert_eq!(
        registry.room_view(&host.room, host.peer),
        Err(GameError::RoomNotFound)
    );
}

#[test]
fn test_idle_peers_close_their_room() {
    let mut registry = RoomRegistry::new(11).with_idle_timeout(1_000);
    let waiting = registry.create_room(0);
    let (host, guest) = open_room(&mut registry);

    assert_eq!(registry.heartbeat(&host.room, host.peer, 900), Ok(Side::A));
    assert_eq!(registry.heartbeat(&host.room, guest.peer, 900), Ok(Side::B));
    assert_eq!(
        registry.heartbeat(&host.room, PeerToken(0), 900),
        Err(GameError::UnknownPeer)
    );

    // nobody ever joined the waiting room and its host went quiet
    registry.tick(1_000);
    assert!(registry.room(&waiting.room).is_none());
    assert!(registry.room(&host.room).is_some());
    assert_eq!(
        registry.room_view(&waiting.room, waiting.peer),
        Err(GameError::OpponentLeft)
    );

    // the guest stops polling mid-match
    registry.heartbeat(&host.room, host.peer, 1_800).unwrap();
    let changed = registry.tick(1_900);
    assert!(changed.is_empty());
    assert!(registry.is_empty());
    assert_eq!(
        registry.room_view(&host.room, host.peer),
        Err(GameError::OpponentLeft)
    );
    assert_eq!(registry.next_due(), None);
}

#[test]
fn test_finished_room_closes_after_idle_timeout() {
    let timings = PhaseTimings {
        shop_ms: 10,
        fight_ms: 10,
        result_ms: 10,
        tick_ms: 1,
    };
    let mut registry = RoomRegistry::with_timings(12, timings).with_idle_timeout(60_000);
    let (host, guest) = open_room(&mut registry);

    let mut now = 0;
    while let Some(at) = registry.next_due() {
        now = at;
        registry.tick(now);
    }

    let view = registry.room_view(&host.room, host.peer).unwrap();
    let game = view.game.unwrap();
    assert_eq!(game.phase, MatchPhase::End);
    assert_eq!(game.outcome, Some(MatchOutcome::Points));

    // still polling does not keep a finished room alive
    for peer in [host.peer, guest.peer] {
        registry.heartbeat(&host.room, peer, now + 59_000).unwrap();
    }
    registry.tick(now + 59_999);
    assert_eq!(registry.len(), 1);

    registry.tick(now + 60_000);
    assert!(registry.is_empty());
    assert_eq!(
        registry.room_view(&host.room, guest.peer),
        Err(GameError::RoomClosed)
    );
}
