//! Unit catalog: the purchasable archetypes and the shop tier pools.

use crate::types::{Tag, UnitKind, UnitTraits};

/// Immutable definition of a purchasable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitArchetype {
    pub kind: UnitKind,
    pub glyph: &'static str,
    pub attack: i32,
    pub health: i32,
    pub tag: Tag,
    pub traits: UnitTraits,
}

pub static ARCHETYPES: [UnitArchetype; 6] = [
    UnitArchetype {
        kind: UnitKind::Warrior,
        glyph: "🗡️",
        attack: 3,
        health: 7,
        tag: Tag::Melee,
        traits: UnitTraits::NONE,
    },
    UnitArchetype {
        kind: UnitKind::Tank,
        glyph: "🛡️",
        attack: 2,
        health: 11,
        tag: Tag::Guard,
        traits: UnitTraits {
            armor: 1,
            taunt: true,
            ..UnitTraits::NONE
        },
    },
    UnitArchetype {
        kind: UnitKind::Archer,
        glyph: "🏹",
        attack: 4,
        health: 5,
        tag: Tag::Ranged,
        traits: UnitTraits {
            crit_pct: 20,
            ..UnitTraits::NONE
        },
    },
    UnitArchetype {
        kind: UnitKind::Bomb,
        glyph: "💣",
        attack: 3,
        health: 4,
        tag: Tag::Boom,
        traits: UnitTraits {
            on_death: 2,
            ..UnitTraits::NONE
        },
    },
    UnitArchetype {
        kind: UnitKind::Mage,
        glyph: "🧙",
        attack: 3,
        health: 5,
        tag: Tag::Boom,
        traits: UnitTraits {
            area_pct: 18,
            area_damage: 2,
            ..UnitTraits::NONE
        },
    },
    UnitArchetype {
        kind: UnitKind::Healer,
        glyph: "💉",
        attack: 2,
        health: 6,
        tag: Tag::Support,
        traits: UnitTraits {
            heal: 2,
            ..UnitTraits::NONE
        },
    },
];

/// Archetypes drawable at each shop tier (index 0 = tier 1)
pub const TIER_POOLS: [&[UnitKind]; 4] = [
    &[UnitKind::Warrior, UnitKind::Tank, UnitKind::Archer],
    &[UnitKind::Bomb, UnitKind::Mage, UnitKind::Healer],
    &[UnitKind::Warrior, UnitKind::Archer, UnitKind::Healer],
    &[UnitKind::Mage],
];

impl UnitKind {
    pub fn archetype(self) -> &'static UnitArchetype {
        match self {
            UnitKind::Warrior => &ARCHETYPES[0],
            UnitKind::Tank => &ARCHETYPES[1],
            UnitKind::Archer => &ARCHETYPES[2],
            UnitKind::Bomb => &ARCHETYPES[3],
            UnitKind::Mage => &ARCHETYPES[4],
            UnitKind::Healer => &ARCHETYPES[5],
        }
    }

    pub fn tag(self) -> Tag {
        self.archetype().tag
    }
}

/// Pool for a 1-based tier; out of range tiers fall back to tier 1
pub fn tier_pool(tier: u8) -> &'static [UnitKind] {
    match tier {
        1..=4 => TIER_POOLS[(tier - 1) as usize],
        _ => TIER_POOLS[0],
    }
}
