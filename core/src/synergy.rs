//! Tag synergies
//!
//! A board is counted by tag and each tag picks the highest tier its count
//! satisfies. Tiers are not cumulative: four melee units get the four-unit
//! bonus only. Nothing here is cached; callers recompute from the board every
//! time it changes.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::types::{BoardUnit, Tag};

/// Stat modifier granted by an active synergy tier, added to base stats
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct SynergyBonus {
    pub attack: i32,
    pub health: i32,
    pub armor: i32,
    pub crit_pct: u32,
    pub on_death: i32,
    pub area_pct: u32,
    pub heal: i32,
}

impl SynergyBonus {
    pub const NONE: SynergyBonus = SynergyBonus {
        attack: 0,
        health: 0,
        armor: 0,
        crit_pct: 0,
        on_death: 0,
        area_pct: 0,
        heal: 0,
    };
}

/// A (count threshold, bonus) rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynergyTier {
    pub count: u8,
    pub bonus: SynergyBonus,
}

static MELEE_TIERS: [SynergyTier; 2] = [
    SynergyTier {
        count: 2,
        bonus: SynergyBonus {
            attack: 1,
            health: 1,
            ..SynergyBonus::NONE
        },
    },
    SynergyTier {
        count: 4,
        bonus: SynergyBonus {
            attack: 2,
            health: 3,
            ..SynergyBonus::NONE
        },
    },
];

static GUARD_TIERS: [SynergyTier; 2] = [
    SynergyTier {
        count: 2,
        bonus: SynergyBonus {
            health: 2,
            armor: 1,
            ..SynergyBonus::NONE
        },
    },
    SynergyTier {
        count: 4,
        bonus: SynergyBonus {
            health: 5,
            armor: 2,
            ..SynergyBonus::NONE
        },
    },
];

static RANGED_TIERS: [SynergyTier; 2] = [
    SynergyTier {
        count: 2,
        bonus: SynergyBonus {
            attack: 1,
            crit_pct: 8,
            ..SynergyBonus::NONE
        },
    },
    SynergyTier {
        count: 4,
        bonus: SynergyBonus {
            attack: 2,
            crit_pct: 16,
            ..SynergyBonus::NONE
        },
    },
];

static BOOM_TIERS: [SynergyTier; 2] = [
    SynergyTier {
        count: 2,
        bonus: SynergyBonus {
            on_death: 1,
            area_pct: 8,
            ..SynergyBonus::NONE
        },
    },
    SynergyTier {
        count: 4,
        bonus: SynergyBonus {
            on_death: 3,
            area_pct: 16,
            ..SynergyBonus::NONE
        },
    },
];

static SUPPORT_TIERS: [SynergyTier; 2] = [
    SynergyTier {
        count: 2,
        bonus: SynergyBonus {
            heal: 1,
            ..SynergyBonus::NONE
        },
    },
    SynergyTier {
        count: 4,
        bonus: SynergyBonus {
            heal: 3,
            ..SynergyBonus::NONE
        },
    },
];

/// Tiers for a tag, ordered by ascending threshold
pub fn tag_tiers(tag: Tag) -> &'static [SynergyTier] {
    match tag {
        Tag::Melee => &MELEE_TIERS,
        Tag::Guard => &GUARD_TIERS,
        Tag::Ranged => &RANGED_TIERS,
        Tag::Boom => &BOOM_TIERS,
        Tag::Support => &SUPPORT_TIERS,
    }
}

/// Highest tier satisfied by `count`, if any
pub fn active_tier(tag: Tag, count: u8) -> Option<&'static SynergyTier> {
    tag_tiers(tag).iter().rev().find(|tier| count >= tier.count)
}

/// Number of board units per tag
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
pub struct TagCounts([u8; 5]);

impl TagCounts {
    pub fn get(&self, tag: Tag) -> u8 {
        self.0[tag.index()]
    }

    fn add(&mut self, tag: Tag) {
        let slot = &mut self.0[tag.index()];
        *slot = slot.saturating_add(1);
    }
}

pub fn count_tags(board: &[BoardUnit]) -> TagCounts {
    let mut counts = TagCounts::default();
    for unit in board {
        counts.add(unit.tag);
    }
    counts
}

/// Active bonus per tag. Tags without an active tier carry no bonus.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
pub struct SynergyModifiers([Option<SynergyBonus>; 5]);

impl SynergyModifiers {
    pub fn bonus(&self, tag: Tag) -> Option<&SynergyBonus> {
        self.0[tag.index()].as_ref()
    }

    /// Bonus for `tag`, or an all-zero bonus when inactive
    pub fn bonus_or_none(&self, tag: Tag) -> SynergyBonus {
        self.0[tag.index()].unwrap_or(SynergyBonus::NONE)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

pub fn modifiers_from_counts(counts: &TagCounts) -> SynergyModifiers {
    let mut modifiers = SynergyModifiers::default();
    for tag in Tag::ALL {
        modifiers.0[tag.index()] = active_tier(tag, counts.get(tag)).map(|tier| tier.bonus);
    }
    modifiers
}

/// Count the board and derive its modifier set
pub fn build_modifiers(board: &[BoardUnit]) -> SynergyModifiers {
    modifiers_from_counts(&count_tags(board))
}

/// An active synergy, for display
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSynergy {
    pub tag: Tag,
    pub count: u8,
    pub threshold: u8,
    pub bonus: SynergyBonus,
}

pub fn active_synergies(board: &[BoardUnit]) -> Vec<ActiveSynergy> {
    let counts = count_tags(board);
    Tag::ALL
        .into_iter()
        .filter_map(|tag| {
            let count = counts.get(tag);
            active_tier(tag, count).map(|tier| ActiveSynergy {
                tag,
                count,
                threshold: tier.count,
                bonus: tier.bonus,
            })
        })
        .collect()
}
