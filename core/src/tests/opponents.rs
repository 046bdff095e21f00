use alloc::vec;

use crate::opponents::*;
use crate::tests::*;
use crate::types::*;

#[test]
fn test_difficulty_profiles() {
    assert_eq!(
        Difficulty::Easy.profile(),
        DifficultyProfile {
            rerolls: 0,
            smart_leveling: false,
            bonus_gold: 0
        }
    );
    assert_eq!(Difficulty::Normal.profile().rerolls, 1);
    assert!(Difficulty::Normal.profile().smart_leveling);
    assert_eq!(Difficulty::Hard.profile().bonus_gold, 1);
    assert_eq!(Difficulty::default(), Difficulty::Normal);
    assert_eq!(Difficulty::Hard.bot_name(), "🤖 Elite Bot");
}

#[test]
fn test_score_offer() {
    let empty = player_with(3, vec![], &[]);
    // 2 * 3 + 7
    assert_eq!(score_offer(&empty, UnitKind::Warrior), 13);

    // second melee unit activates the 2-tier
    let one = player_with(3, vec![unit(1, UnitKind::Warrior)], &[]);
    assert_eq!(score_offer(&one, UnitKind::Warrior), 19);

    // fusion-completing copy and the third melee unit
    let two = player_with(
        3,
        vec![unit(1, UnitKind::Warrior), unit(2, UnitKind::Warrior)],
        &[],
    );
    assert_eq!(score_offer(&two, UnitKind::Warrior), 24);
}

#[test]
fn test_best_offer_prefers_first_on_ties() {
    let player = player_with(
        3,
        vec![],
        &[UnitKind::Archer, UnitKind::Warrior, UnitKind::Tank],
    );
    // archer 13, warrior 13, tank 15
    assert_eq!(best_offer(&player), Some((2, 15)));

    let tied = player_with(3, vec![], &[UnitKind::Archer, UnitKind::Warrior]);
    assert_eq!(best_offer(&tied), Some((0, 13)));

    let empty = player_with(3, vec![], &[]);
    assert_eq!(best_offer(&empty), None);
}

#[test]
fn test_easy_buys_best_offer_without_rerolling() {
    let mut rng = ScriptedRng::new(&[0]);
    let mut player = player_with(
        3,
        vec![],
        &[UnitKind::Archer, UnitKind::Warrior, UnitKind::Tank],
    );

    take_shop_turn(&mut player, &Difficulty::Easy.profile(), 1, &mut rng);

    assert_eq!(player.gold, 0);
    assert_eq!(player.shop_level, 1);
    assert_eq!(player.board.len(), 1);
    assert_eq!(player.board[0].kind, UnitKind::Tank);
}

#[test]
fn test_policy_stops_when_board_is_full() {
    let board = vec![
        unit(1, UnitKind::Tank),
        unit(2, UnitKind::Archer),
        unit(3, UnitKind::Bomb),
        unit(4, UnitKind::Mage),
        unit(5, UnitKind::Healer),
    ];
    let mut rng = ScriptedRng::new(&[0]);
    let mut player = player_with(9, board, &[UnitKind::Warrior]);

    take_shop_turn(&mut player, &Difficulty::Easy.profile(), 1, &mut rng);

    assert_eq!(player.gold, 9);
    assert_eq!(player.board.len(), 5);
}

#[test]
fn test_smart_leveling_keeps_a_buffer_early() {
    let profile = Difficulty::Normal.profile();
    let mut rng = XorShiftRng::seed_from_u64(8);

    let mut short = player_with(6, vec![], &[]);
    assert!(!maybe_level_up(&mut short, &profile, 1, &mut rng));
    assert_eq!(short.shop_level, 1);

    let mut flush = player_with(7, vec![], &[]);
    assert!(maybe_level_up(&mut flush, &profile, 1, &mut rng));
    assert_eq!(flush.shop_level, 2);
    assert_eq!(flush.gold, 3);

    // from round 3 on the buffer is not required
    let mut later = player_with(4, vec![], &[]);
    assert!(maybe_level_up(&mut later, &profile, 3, &mut rng));

    let mut easy = player_with(10, vec![], &[]);
    assert!(!maybe_level_up(
        &mut easy,
        &Difficulty::Easy.profile(),
        5,
        &mut rng
    ));
}

#[test]
fn test_arrange_board_is_guard_first_and_stable() {
    let mut board = vec![
        unit(1, UnitKind::Healer),
        unit(2, UnitKind::Archer),
        unit(3, UnitKind::Warrior),
        unit(4, UnitKind::Mage),
        unit(5, UnitKind::Tank),
        unit(6, UnitKind::Bomb),
    ];

    arrange_board(&mut board);

    let order: Vec<u32> = board.iter().map(|u| u.uid.0).collect();
    assert_eq!(order, vec![5, 3, 4, 6, 2, 1]);
}

#[test]
fn test_normal_rerolls_weak_shop_once() {
    let mut rng = XorShiftRng::seed_from_u64(5);
    // bomb and healer both score 10
    let mut player = player_with(3, vec![], &[UnitKind::Bomb, UnitKind::Healer]);
    assert_eq!(best_offer(&player), Some((0, 10)));

    take_shop_turn(&mut player, &Difficulty::Normal.profile(), 1, &mut rng);

    // one reroll leaves too little gold for a unit
    assert_eq!(player.gold, 2);
    assert_eq!(player.shop.len(), 3);
    assert!(player.board.is_empty());
    assert_eq!(player.shop_level, 1);
}

#[test]
fn test_good_offer_is_bought_without_rerolling() {
    let mut rng = XorShiftRng::seed_from_u64(5);
    let mut player = player_with(3, vec![], &[UnitKind::Warrior, UnitKind::Bomb]);
    let (_, score) = best_offer(&player).unwrap();
    assert!(score >= GOOD_OFFER_SCORE);

    take_shop_turn(&mut player, &Difficulty::Normal.profile(), 1, &mut rng);

    assert_eq!(player.gold, 0);
    assert_eq!(player.board.len(), 1);
    assert_eq!(player.board[0].kind, UnitKind::Warrior);
    assert_eq!(player.shop, vec![ShopOffer::new(UnitKind::Bomb)]);
}

#[test]
fn test_policy_fuses_into_a_full_board() {
    let board = vec![
        unit(1, UnitKind::Archer),
        unit(2, UnitKind::Archer),
        unit(3, UnitKind::Tank),
        unit(4, UnitKind::Bomb),
        unit(5, UnitKind::Healer),
    ];
    let mut rng = XorShiftRng::seed_from_u64(5);
    let mut player = player_with(3, board, &[UnitKind::Archer]);

    take_shop_turn(&mut player, &Difficulty::Normal.profile(), 1, &mut rng);

    assert_eq!(player.gold, 0);
    assert_eq!(player.board.len(), 4);
    assert_eq!(player.count_kind(UnitKind::Archer), 1);
    let kinds: Vec<UnitKind> = player.board.iter().map(|u| u.kind).collect();
    assert_eq!(
        kinds,
        vec![UnitKind::Tank, UnitKind::Bomb, UnitKind::Archer, UnitKind::Healer]
    );
    assert!(player.board[2].upgraded);
}
