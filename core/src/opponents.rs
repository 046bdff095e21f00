//! Opponent policy
//!
//! A heuristic shopper: optionally levels the shop, rerolls while the best
//! offer looks weak, buys the best offers it can afford, then lines the board
//! up guard-first.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::economy::{MAX_SHOP_LEVEL, REROLL_COST, UNIT_COST};
use crate::rng::GameRng;
use crate::state::{PlayerState, FUSION_COPIES};
use crate::synergy::count_tags;
use crate::types::{BoardUnit, Tag, UnitKind};

/// Score at which the policy stops rerolling
pub const GOOD_OFFER_SCORE: i32 = 12;

/// Opponent strength selected at match start
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Knobs that distinguish difficulties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyProfile {
    /// Rerolls allowed per shop phase
    pub rerolls: u32,
    /// Level the shop when it looks worthwhile
    pub smart_leveling: bool,
    /// Extra gold at match start and on every round income
    pub bonus_gold: i32,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                rerolls: 0,
                smart_leveling: false,
                bonus_gold: 0,
            },
            Difficulty::Normal => DifficultyProfile {
                rerolls: 1,
                smart_leveling: true,
                bonus_gold: 0,
            },
            Difficulty::Hard => DifficultyProfile {
                rerolls: 2,
                smart_leveling: true,
                bonus_gold: 1,
            },
        }
    }

    /// Display name of the bot
    pub fn bot_name(self) -> &'static str {
        match self {
            Difficulty::Easy => "🤖 Practice Bot",
            Difficulty::Normal => "🤖 Tactician Bot",
            Difficulty::Hard => "🤖 Elite Bot",
        }
    }
}

/// How attractive buying `kind` is for `player` right now. Rewards raw
/// stats, a fusion-completing copy and crossing a synergy threshold.
pub fn score_offer(player: &PlayerState, kind: UnitKind) -> i32 {
    let archetype = kind.archetype();
    let mut score = archetype.attack * 2 + archetype.health;

    if player.count_kind(kind) == FUSION_COPIES - 1 {
        score += 8;
    }

    let future = count_tags(&player.board).get(archetype.tag) + 1;
    score += match future {
        2 => 6,
        3 => 3,
        4 => 8,
        _ => 0,
    };
    score
}

/// Index and score of the highest-scoring offer; the first wins ties
pub fn best_offer(player: &PlayerState) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;
    for (i, offer) in player.shop.iter().enumerate() {
        let score = score_offer(player, offer.kind);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best
}

/// Level the shop if the profile allows it and it is affordable
pub fn maybe_level_up<R: GameRng>(
    player: &mut PlayerState,
    profile: &DifficultyProfile,
    round: u32,
    rng: &mut R,
) -> bool {
    if !profile.smart_leveling || player.shop_level >= MAX_SHOP_LEVEL {
        return false;
    }
    let Some(cost) = player.level_cost() else {
        return false;
    };
    if !player.can_afford(cost) {
        return false;
    }
    if round < 3 && player.gold < cost + 3 {
        return false;
    }
    player.level_up_shop(rng).is_ok()
}

/// Run one full shop phase for an AI-controlled player
pub fn take_shop_turn<R: GameRng>(
    player: &mut PlayerState,
    profile: &DifficultyProfile,
    round: u32,
    rng: &mut R,
) {
    if maybe_level_up(player, profile, round, rng) {
        log::debug!("opponent leveled shop to {}", player.shop_level);
    }

    let mut rerolls = profile.rerolls;
    while rerolls > 0 && player.can_afford(REROLL_COST) {
        if best_offer(player).is_some_and(|(_, score)| score >= GOOD_OFFER_SCORE) {
            break;
        }
        if player.reroll(rng).is_err() {
            break;
        }
        rerolls -= 1;
    }

    while player.can_afford(UNIT_COST) && !player.shop.is_empty() {
        let Some((index, _)) = best_offer(player) else {
            break;
        };
        let kind = player.shop[index].kind;
        if !player.has_room_for(kind) {
            break;
        }
        match player.buy(kind) {
            Ok(purchase) => log::debug!("opponent bought {}: {:?}", kind.id(), purchase),
            Err(_) => break,
        }
    }

    arrange_board(&mut player.board);
}

/// Line-up priority; lower goes to the front
pub fn tag_priority(tag: Tag) -> u8 {
    match tag {
        Tag::Guard => 1,
        Tag::Melee => 2,
        Tag::Boom => 3,
        Tag::Ranged => 4,
        Tag::Support => 5,
    }
}

/// Stable sort: guards in front, supports at the back
pub fn arrange_board(board: &mut [BoardUnit]) {
    board.sort_by_key(|unit| tag_priority(unit.tag));
}
