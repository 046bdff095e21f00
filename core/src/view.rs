//! View types for UI serialization
//!
//! Snapshots of a [`Match`] for presentation layers. A [`MatchView`] shows
//! everything; a [`SeatView`] is what one networked peer may see, with the
//! opponent reduced to public fields.

use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::battle::{Combat, CombatEvent, CombatStatus, CombatUnit, CombatUnitId, Verdict};
use crate::economy::{REROLL_COST, UNIT_COST};
use crate::engine::{Match, MatchMode, MatchOutcome, MatchPhase};
use crate::limits::Side;
use crate::state::{PlayerState, ROUND_LIMIT};
use crate::synergy::{active_synergies, ActiveSynergy};
use crate::types::{BoardUnit, ShopOffer, Tag, UnitKind, UnitUid};

/// View of a unit on the owner's board
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub uid: UnitUid,
    pub kind: UnitKind,
    pub glyph: String,
    pub tag: Tag,
    pub attack: i32,
    pub health: i32,
    pub upgraded: bool,
}

impl From<&BoardUnit> for UnitView {
    fn from(unit: &BoardUnit) -> Self {
        Self {
            uid: unit.uid,
            kind: unit.kind,
            glyph: unit.glyph.clone(),
            tag: unit.tag,
            attack: unit.attack,
            health: unit.health,
            upgraded: unit.upgraded,
        }
    }
}

/// View of a shop offer with its catalog stats
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferView {
    pub kind: UnitKind,
    pub glyph: String,
    pub tag: Tag,
    pub attack: i32,
    pub health: i32,
    pub cost: i32,
}

impl From<&ShopOffer> for OfferView {
    fn from(offer: &ShopOffer) -> Self {
        let archetype = offer.archetype();
        Self {
            kind: offer.kind,
            glyph: String::from(archetype.glyph),
            tag: archetype.tag,
            attack: archetype.attack,
            health: archetype.health,
            cost: UNIT_COST,
        }
    }
}

/// Full view of one player, for the player themselves
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub hp: i32,
    pub gold: i32,
    pub shop_level: u8,
    /// Price of the next shop level, `None` at the top
    pub level_cost: Option<i32>,
    pub board: Vec<UnitView>,
    pub shop: Vec<OfferView>,
    pub synergies: Vec<ActiveSynergy>,
    pub can_reroll: bool,
    pub can_level_up: bool,
}

impl From<&PlayerState> for PlayerView {
    fn from(player: &PlayerState) -> Self {
        let level_cost = player.level_cost();
        Self {
            hp: player.hp,
            gold: player.gold,
            shop_level: player.shop_level,
            level_cost,
            board: player.board.iter().map(UnitView::from).collect(),
            shop: player.shop.iter().map(OfferView::from).collect(),
            synergies: active_synergies(&player.board),
            can_reroll: player.can_afford(REROLL_COST),
            can_level_up: level_cost.is_some_and(|cost| player.can_afford(cost)),
        }
    }
}

/// Board unit as the opponent sees it
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUnitView {
    pub glyph: String,
    pub attack: i32,
    pub health: i32,
}

/// Opponent as a networked peer sees them: HP and board stats only
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayerView {
    pub hp: i32,
    pub board: Vec<PublicUnitView>,
}

impl From<&PlayerState> for PublicPlayerView {
    fn from(player: &PlayerState) -> Self {
        Self {
            hp: player.hp,
            board: player
                .board
                .iter()
                .map(|unit| PublicUnitView {
                    glyph: unit.glyph.clone(),
                    attack: unit.attack,
                    health: unit.health,
                })
                .collect(),
        }
    }
}

/// A combat unit with the stats drawn on screen
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatUnitView {
    pub id: CombatUnitId,
    pub glyph: String,
    pub attack: i32,
    pub health: i32,
    pub max_health: i32,
}

impl From<&CombatUnit> for CombatUnitView {
    fn from(unit: &CombatUnit) -> Self {
        Self {
            id: unit.id,
            glyph: unit.glyph.clone(),
            attack: unit.attack,
            health: unit.health,
            max_health: unit.max_health,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSideView {
    pub units: Vec<CombatUnitView>,
    /// Highlights the unit that attacked last
    pub last_attacker: Option<CombatUnitId>,
    /// Highlights the unit that was hit last
    pub last_hit: Option<CombatUnitId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatView {
    pub status: CombatStatus,
    pub steps: u32,
    pub a: CombatSideView,
    pub b: CombatSideView,
    pub events: Vec<CombatEvent>,
}

impl From<&Combat> for CombatView {
    fn from(combat: &Combat) -> Self {
        let side = |side: Side| CombatSideView {
            units: combat.units(side).iter().map(CombatUnitView::from).collect(),
            last_attacker: combat.last_attacker(side),
            last_hit: combat.last_hit(side),
        };
        Self {
            status: combat.status(),
            steps: combat.steps(),
            a: side(Side::A),
            b: side(Side::B),
            events: combat.events().to_vec(),
        }
    }
}

/// Everything about a match, for a local presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub mode: MatchMode,
    pub phase: MatchPhase,
    pub round: u32,
    pub round_limit: u32,
    pub phase_deadline: Option<u64>,
    pub fast_forward: bool,
    /// Display name of side B in single player mode
    pub opponent_name: Option<String>,
    pub a: PlayerView,
    pub b: PlayerView,
    pub combat: Option<CombatView>,
    pub last_verdict: Option<Verdict>,
    pub outcome: Option<MatchOutcome>,
}

impl MatchView {
    pub fn from_match(game: &Match) -> Self {
        let opponent_name = match game.mode() {
            MatchMode::Solo { difficulty } => Some(String::from(difficulty.bot_name())),
            MatchMode::Versus => None,
        };
        Self {
            mode: game.mode(),
            phase: game.phase(),
            round: game.round(),
            round_limit: ROUND_LIMIT,
            phase_deadline: game.phase_deadline(),
            fast_forward: game.is_fast_forward(),
            opponent_name,
            a: PlayerView::from(game.player(Side::A)),
            b: PlayerView::from(game.player(Side::B)),
            combat: game.combat().map(CombatView::from),
            last_verdict: game.last_verdict().copied(),
            outcome: game.outcome(),
        }
    }
}

/// What one seat of a networked match may see
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub side: Side,
    pub phase: MatchPhase,
    pub round: u32,
    pub phase_deadline: Option<u64>,
    pub me: PlayerView,
    pub opponent: PublicPlayerView,
    pub combat: Option<CombatView>,
    pub last_verdict: Option<Verdict>,
    pub outcome: Option<MatchOutcome>,
}

impl SeatView {
    pub fn for_side(game: &Match, side: Side) -> Self {
        Self {
            side,
            phase: game.phase(),
            round: game.round(),
            phase_deadline: game.phase_deadline(),
            me: PlayerView::from(game.player(side)),
            opponent: PublicPlayerView::from(game.player(side.opponent())),
            combat: game.combat().map(CombatView::from),
            last_verdict: game.last_verdict().copied(),
            outcome: game.outcome(),
        }
    }
}

impl Match {
    pub fn view(&self) -> MatchView {
        MatchView::from_match(self)
    }

    pub fn seat_view(&self, side: Side) -> SeatView {
        SeatView::for_side(self, side)
    }
}
