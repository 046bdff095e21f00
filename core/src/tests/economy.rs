use alloc::string::ToString;
use alloc::vec;

use crate::economy::*;
use crate::error::GameError;
use crate::state::*;
use crate::tests::*;
use crate::types::*;

// ==========================================
// GOLD RULES
// ==========================================

#[test]
fn test_round_income_ramps_and_caps() {
    assert_eq!(round_income(1), 2);
    assert_eq!(round_income(2), 3);
    assert_eq!(round_income(5), 4);
    assert_eq!(round_income(10), 7);
    assert_eq!(round_income(12), 7);
}

#[test]
fn test_credit_caps_at_max_gold() {
    assert_eq!(credit(9, 2), MAX_GOLD);
    assert_eq!(credit(3, 2), 5);

    let mut player = player_with(8, vec![], &[]);
    player.add_gold(WIN_REWARD);
    player.add_gold(WIN_REWARD);
    assert_eq!(player.gold, MAX_GOLD);
}

#[test]
fn test_shop_level_costs() {
    assert_eq!(shop_level_cost(1), Some(4));
    assert_eq!(shop_level_cost(2), Some(6));
    assert_eq!(shop_level_cost(3), Some(8));
    assert_eq!(shop_level_cost(MAX_SHOP_LEVEL), None);
}

#[test]
fn test_gold_stays_in_bounds() {
    let mut rng = XorShiftRng::seed_from_u64(99);
    let mut player = PlayerState::new(&mut rng);

    for round in 1..=40u32 {
        let _ = player.reroll(&mut rng);
        let _ = player.level_up_shop(&mut rng);
        if let Some(offer) = player.shop.first().copied() {
            let _ = player.buy(offer.kind);
        }
        assert!(
            (0..=MAX_GOLD).contains(&player.gold),
            "gold {}",
            player.gold
        );

        player.add_gold(round_income(round));
        player.add_gold(WIN_REWARD);
        assert!(
            (0..=MAX_GOLD).contains(&player.gold),
            "gold {}",
            player.gold
        );
    }
}

// ==========================================
// PURCHASES
// ==========================================

#[test]
fn test_three_gold_buys_a_warrior() {
    let mut player = player_with(
        3,
        vec![],
        &[UnitKind::Warrior, UnitKind::Tank, UnitKind::Archer],
    );

    let purchase = player.buy(UnitKind::Warrior).unwrap();

    assert_eq!(player.gold, 0);
    assert_eq!(player.board.len(), 1);
    assert_eq!(player.board[0].kind, UnitKind::Warrior);
    assert_eq!(purchase, Purchase::Placed(player.board[0].uid));
    assert_eq!(player.shop.len(), 2);
}

#[test]
fn test_buy_consumes_only_first_matching_offer() {
    let mut player = player_with(
        5,
        vec![],
        &[UnitKind::Tank, UnitKind::Warrior, UnitKind::Warrior],
    );

    player.buy(UnitKind::Warrior).unwrap();

    assert_eq!(
        player.shop,
        vec![ShopOffer::new(UnitKind::Tank), ShopOffer::new(UnitKind::Warrior)]
    );
}

#[test]
fn test_failed_purchase_leaves_state_untouched() {
    let mut player = player_with(2, vec![], &[UnitKind::Warrior]);
    let before = player.clone();

    assert_eq!(
        player.buy(UnitKind::Warrior),
        Err(GameError::NotEnoughGold {
            have: 2,
            need: UNIT_COST
        })
    );
    assert_eq!(player.buy(UnitKind::Mage), Err(GameError::OfferNotFound));
    assert_eq!(player, before);
}

#[test]
fn test_full_board_rejects_non_fusing_purchase() {
    let board = vec![
        unit(1, UnitKind::Tank),
        unit(2, UnitKind::Archer),
        unit(3, UnitKind::Archer),
        unit(4, UnitKind::Bomb),
        unit(5, UnitKind::Healer),
    ];
    let mut player = player_with(9, board, &[UnitKind::Warrior]);
    let before = player.clone();

    let err = player.buy(UnitKind::Warrior).unwrap_err();
    assert_eq!(err, GameError::BoardFull);
    assert_eq!(err.to_string(), "board is full (max 5)");
    assert_eq!(player, before);
}

#[test]
fn test_third_copy_fuses() {
    let board = vec![
        unit(1, UnitKind::Warrior),
        unit(2, UnitKind::Tank),
        unit(3, UnitKind::Warrior),
        unit(4, UnitKind::Tank),
    ];
    let mut player = player_with(3, board, &[UnitKind::Warrior]);

    let purchase = player.buy(UnitKind::Warrior).unwrap();

    // The bought copy and both owned warriors collapse into one fused unit
    assert_eq!(player.board.len(), 3);
    assert_eq!(player.count_kind(UnitKind::Warrior), 1);
    let fused = player.board.last().unwrap();
    assert_eq!(purchase, Purchase::Fused(fused.uid));
    assert!(fused.upgraded);
    assert_eq!(fused.attack, 3 + FUSION_ATTACK_BONUS);
    assert_eq!(fused.health, 7 + FUSION_HEALTH_BONUS);
    assert!(fused.glyph.starts_with(FUSION_MARK));
    assert_eq!(player.board[0].kind, UnitKind::Tank);
    assert_eq!(player.board[1].kind, UnitKind::Tank);
}

#[test]
fn test_full_board_accepts_fusing_copy() {
    let board = vec![
        unit(1, UnitKind::Archer),
        unit(2, UnitKind::Archer),
        unit(3, UnitKind::Tank),
        unit(4, UnitKind::Bomb),
        unit(5, UnitKind::Healer),
    ];
    let mut player = player_with(3, board, &[UnitKind::Archer]);

    assert!(player.has_room_for(UnitKind::Archer));
    assert!(matches!(
        player.buy(UnitKind::Archer),
        Ok(Purchase::Fused(_))
    ));
    // 5 + 1 placed, then three archers become one: -2 from the six-unit board
    assert_eq!(player.board.len(), 4);
    assert_eq!(player.count_kind(UnitKind::Archer), 1);
}

#[test]
fn test_unit_ids_stay_unique_through_fusion() {
    let mut player = player_with(9, vec![], &[UnitKind::Bomb, UnitKind::Bomb, UnitKind::Bomb]);
    for _ in 0..3 {
        player.buy(UnitKind::Bomb).unwrap();
    }

    assert_eq!(player.board.len(), 1);
    // Ids 1..=3 went to the copies, the fused unit gets the next one
    assert_eq!(player.board[0].uid, UnitUid(4));
    assert_eq!(player.gold, 0);
}

// ==========================================
// SHOP ACTIONS
// ==========================================

#[test]
fn test_reroll_costs_one_gold() {
    let mut rng = XorShiftRng::seed_from_u64(5);
    let mut player = player_with(1, vec![], &[]);

    player.reroll(&mut rng).unwrap();
    assert_eq!(player.gold, 0);
    assert_eq!(player.shop.len(), 3);

    let before = player.clone();
    assert!(matches!(
        player.reroll(&mut rng),
        Err(GameError::NotEnoughGold { .. })
    ));
    assert_eq!(player, before);
}

#[test]
fn test_level_up_shop() {
    let mut rng = XorShiftRng::seed_from_u64(5);
    let mut player = player_with(4, vec![], &[]);

    player.level_up_shop(&mut rng).unwrap();
    assert_eq!(player.shop_level, 2);
    assert_eq!(player.gold, 0);
    assert_eq!(player.level_cost(), Some(6));

    player.shop_level = MAX_SHOP_LEVEL;
    player.gold = 10;
    assert_eq!(player.level_up_shop(&mut rng), Err(GameError::ShopMaxLevel));
    assert_eq!(player.gold, 10);
}
