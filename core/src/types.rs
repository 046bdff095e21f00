use alloc::string::String;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::units::UnitArchetype;

/// Synergy family a unit belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Tag {
    Melee,
    Guard,
    Ranged,
    Boom,
    Support,
}

impl Tag {
    pub const ALL: [Tag; 5] = [Tag::Melee, Tag::Guard, Tag::Ranged, Tag::Boom, Tag::Support];

    pub fn index(self) -> usize {
        match self {
            Tag::Melee => 0,
            Tag::Guard => 1,
            Tag::Ranged => 2,
            Tag::Boom => 3,
            Tag::Support => 4,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Tag::Melee => "🗡️",
            Tag::Guard => "🛡️",
            Tag::Ranged => "🏹",
            Tag::Boom => "💥",
            Tag::Support => "💉",
        }
    }
}

/// Archetype identifier. Serialises to the lower-case id used by clients
/// ("warrior", "tank", ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    Warrior,
    Tank,
    Archer,
    Bomb,
    Mage,
    Healer,
}

impl UnitKind {
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Warrior,
        UnitKind::Tank,
        UnitKind::Archer,
        UnitKind::Bomb,
        UnitKind::Mage,
        UnitKind::Healer,
    ];

    pub fn id(self) -> &'static str {
        match self {
            UnitKind::Warrior => "warrior",
            UnitKind::Tank => "tank",
            UnitKind::Archer => "archer",
            UnitKind::Bomb => "bomb",
            UnitKind::Mage => "mage",
            UnitKind::Healer => "healer",
        }
    }

    /// Parse the lower-case id sent by clients
    pub fn from_id(id: &str) -> Option<UnitKind> {
        UnitKind::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// Special attributes carried by an archetype. Percentages are whole
/// numbers (20 = 20%).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct UnitTraits {
    pub armor: i32,
    pub taunt: bool,
    pub crit_pct: u32,
    pub area_pct: u32,
    pub area_damage: i32,
    pub on_death: i32,
    pub heal: i32,
}

impl UnitTraits {
    pub const NONE: UnitTraits = UnitTraits {
        armor: 0,
        taunt: false,
        crit_pct: 0,
        area_pct: 0,
        area_damage: 0,
        on_death: 0,
        heal: 0,
    };
}

/// Per-player unique identifier of a purchased unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
pub struct UnitUid(pub u32);

/// An owned unit on a player's board
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUnit {
    pub uid: UnitUid,
    pub kind: UnitKind,
    pub glyph: String,
    pub tag: Tag,
    pub attack: i32,
    pub health: i32,
    pub traits: UnitTraits,
    /// Produced by fusing three copies
    pub upgraded: bool,
}

/// Attack bonus of a fused unit over its archetype
pub const FUSION_ATTACK_BONUS: i32 = 2;
/// Health bonus of a fused unit over its archetype
pub const FUSION_HEALTH_BONUS: i32 = 4;
/// Marker prepended to the glyph of a fused unit
pub const FUSION_MARK: &str = "⭐";

impl BoardUnit {
    pub fn from_archetype(uid: UnitUid, archetype: &UnitArchetype) -> Self {
        Self {
            uid,
            kind: archetype.kind,
            glyph: String::from(archetype.glyph),
            tag: archetype.tag,
            attack: archetype.attack,
            health: archetype.health,
            traits: archetype.traits,
            upgraded: false,
        }
    }

    /// The single unit that replaces three copies of `archetype`
    pub fn fused(uid: UnitUid, archetype: &UnitArchetype) -> Self {
        let mut glyph = String::from(FUSION_MARK);
        glyph.push_str(archetype.glyph);
        Self {
            glyph,
            attack: archetype.attack + FUSION_ATTACK_BONUS,
            health: archetype.health + FUSION_HEALTH_BONUS,
            upgraded: true,
            ..Self::from_archetype(uid, archetype)
        }
    }
}

/// An archetype offered for purchase in the current shop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOffer {
    pub kind: UnitKind,
}

impl ShopOffer {
    pub fn new(kind: UnitKind) -> Self {
        Self { kind }
    }

    pub fn archetype(&self) -> &'static UnitArchetype {
        self.kind.archetype()
    }
}
