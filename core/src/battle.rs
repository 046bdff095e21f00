//! Combat engine.
//!
//! Two boards become two lines of [`CombatUnit`]s with synergy modifiers
//! baked in. Each step the front unit of side A attacks, then the front unit
//! of side B (if it is still standing), then deaths are resolved until no new
//! unit falls. A combat moves `Preparing -> Running -> Finished`; once
//! finished every further advance is a no-op.

use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::limits::{LimitReason, Side, MAX_COMBAT_STEPS, MAX_DEATH_PASSES};
use crate::rng::GameRng;
use crate::synergy::{build_modifiers, SynergyModifiers};
use crate::types::{BoardUnit, Tag, UnitKind, UnitUid};

/// Crit chance cap after synergy bonuses
pub const MAX_CRIT_PCT: u32 = 45;
/// Area chance cap after synergy bonuses
pub const MAX_AREA_PCT: u32 = 40;

/// Identifies a unit within one combat
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo, Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct CombatUnitId {
    pub side: Side,
    pub uid: UnitUid,
}

/// Per-battle copy of a board unit with effective stats. Nothing here is
/// written back to the board.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatUnit {
    pub id: CombatUnitId,
    pub kind: UnitKind,
    pub glyph: String,
    pub tag: Tag,
    pub attack: i32,
    pub health: i32,
    pub max_health: i32,
    pub armor: i32,
    pub taunt: bool,
    pub crit_pct: u32,
    pub area_pct: u32,
    pub area_damage: i32,
    pub on_death: i32,
    pub heal: i32,
    pub healed: bool,
    pub removed: bool,
}

impl CombatUnit {
    pub fn from_board_unit(side: Side, unit: &BoardUnit, modifiers: &SynergyModifiers) -> Self {
        let bonus = modifiers.bonus_or_none(unit.tag);
        let traits = &unit.traits;
        let max_health = unit.health + bonus.health;
        Self {
            id: CombatUnitId {
                side,
                uid: unit.uid,
            },
            kind: unit.kind,
            glyph: unit.glyph.clone(),
            tag: unit.tag,
            attack: unit.attack + bonus.attack,
            health: max_health,
            max_health,
            armor: traits.armor + bonus.armor,
            taunt: traits.taunt,
            crit_pct: (traits.crit_pct + bonus.crit_pct).min(MAX_CRIT_PCT),
            area_pct: (traits.area_pct + bonus.area_pct).min(MAX_AREA_PCT),
            area_damage: traits.area_damage,
            on_death: traits.on_death + bonus.on_death,
            heal: traits.heal + bonus.heal,
            healed: false,
            removed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply armor-reduced damage and return the amount taken
    fn take_damage(&mut self, raw: i32) -> i32 {
        let applied = mitigate(raw, self.armor);
        self.health -= applied;
        applied
    }
}

/// Armor reduction with a floor of one point of damage
pub fn mitigate(raw: i32, armor: i32) -> i32 {
    (raw - armor).max(1)
}

/// Lifecycle of a combat instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatStatus {
    Preparing,
    Running,
    Finished,
}

/// Outcome of a finished combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// `None` on a draw
    pub winner: Option<Side>,
    /// HP the loser gives up; 0 on a draw
    pub damage: i32,
    /// Living units per side, indexed by [`Side::index`]
    pub survivors: [u32; 2],
    pub steps: u32,
    /// Set when the combat was cut off rather than ending with an empty side
    pub limit: Option<LimitReason>,
}

impl Verdict {
    fn from_survivors(survivors: [u32; 2], steps: u32, limit: Option<LimitReason>) -> Self {
        let winner = match (survivors[0] > 0, survivors[1] > 0) {
            (true, false) => Some(Side::A),
            (false, true) => Some(Side::B),
            _ => None,
        };
        let damage = match winner {
            Some(_) => survivors[0].abs_diff(survivors[1]).max(1) as i32,
            None => 0,
        };
        Self {
            winner,
            damage,
            survivors,
            steps,
            limit,
        }
    }

    pub fn loser(&self) -> Option<Side> {
        self.winner.map(Side::opponent)
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Events generated during combat for UI playback
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CombatEvent {
    #[serde(rename_all = "camelCase")]
    Heal {
        source: CombatUnitId,
        target: CombatUnitId,
        amount: i32,
        new_health: i32,
    },
    #[serde(rename_all = "camelCase")]
    Attack {
        attacker: CombatUnitId,
        target: CombatUnitId,
        damage: i32,
        crit: bool,
        remaining_hp: i32,
    },
    #[serde(rename_all = "camelCase")]
    AreaHit {
        source: CombatUnitId,
        target: CombatUnitId,
        damage: i32,
        remaining_hp: i32,
    },
    #[serde(rename_all = "camelCase")]
    Explosion {
        source: CombatUnitId,
        target: CombatUnitId,
        damage: i32,
        remaining_hp: i32,
    },
    #[serde(rename_all = "camelCase")]
    UnitDeath { unit: CombatUnitId },
    #[serde(rename_all = "camelCase")]
    LimitReached { reason: LimitReason },
    #[serde(rename_all = "camelCase")]
    CombatEnd { verdict: Verdict },
}

/// A single combat between two boards
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combat {
    /// Lines per side, indexed by [`Side::index`]; index 0 is the front
    units: [Vec<CombatUnit>; 2],
    status: CombatStatus,
    steps: u32,
    last_attacker: [Option<CombatUnitId>; 2],
    last_hit: [Option<CombatUnitId>; 2],
    events: Vec<CombatEvent>,
    verdict: Option<Verdict>,
}

impl Combat {
    /// Build a combat, computing each side's modifiers from its board
    pub fn new(board_a: &[BoardUnit], board_b: &[BoardUnit]) -> Self {
        Self::with_modifiers(
            board_a,
            &build_modifiers(board_a),
            board_b,
            &build_modifiers(board_b),
        )
    }

    pub fn with_modifiers(
        board_a: &[BoardUnit],
        modifiers_a: &SynergyModifiers,
        board_b: &[BoardUnit],
        modifiers_b: &SynergyModifiers,
    ) -> Self {
        let line = |side: Side, board: &[BoardUnit], modifiers: &SynergyModifiers| {
            board
                .iter()
                .map(|unit| CombatUnit::from_board_unit(side, unit, modifiers))
                .collect::<Vec<_>>()
        };
        Self {
            units: [
                line(Side::A, board_a, modifiers_a),
                line(Side::B, board_b, modifiers_b),
            ],
            status: CombatStatus::Preparing,
            steps: 0,
            last_attacker: [None; 2],
            last_hit: [None; 2],
            events: Vec::new(),
            verdict: None,
        }
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == CombatStatus::Finished
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn units(&self, side: Side) -> &[CombatUnit] {
        &self.units[side.index()]
    }

    pub fn living(&self, side: Side) -> u32 {
        self.units[side.index()]
            .iter()
            .filter(|u| u.is_alive())
            .count() as u32
    }

    /// Last unit of `side` that attacked
    pub fn last_attacker(&self, side: Side) -> Option<CombatUnitId> {
        self.last_attacker[side.index()]
    }

    /// Last unit of `side` that was hit by an attack
    pub fn last_hit(&self, side: Side) -> Option<CombatUnitId> {
        self.last_hit[side.index()]
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Apply one-shot heals. Each healer restores its heal value to the
    /// lowest-HP living ally (first one on ties), capped at max HP.
    pub fn prepare(&mut self) {
        if self.status != CombatStatus::Preparing {
            return;
        }
        for side in Side::BOTH {
            let line = &mut self.units[side.index()];
            for i in 0..line.len() {
                if line[i].heal <= 0 || line[i].healed {
                    continue;
                }
                let Some(target) = lowest_health(line) else {
                    continue;
                };
                let amount = line[i].heal;
                let unit = &mut line[target];
                unit.health = (unit.health + amount).min(unit.max_health);
                let event = CombatEvent::Heal {
                    source: line[i].id,
                    target: line[target].id,
                    amount,
                    new_health: line[target].health,
                };
                line[i].healed = true;
                self.events.push(event);
            }
        }
        self.status = CombatStatus::Running;
    }

    /// Run up to `steps` steps, stopping early once finished
    pub fn advance<R: GameRng>(&mut self, steps: u32, rng: &mut R) -> CombatStatus {
        for _ in 0..steps {
            if self.is_finished() {
                break;
            }
            self.step(rng);
        }
        self.status
    }

    /// Run until finished. Terminates within [`MAX_COMBAT_STEPS`] steps.
    pub fn run_to_end<R: GameRng>(&mut self, rng: &mut R) -> Verdict {
        while !self.is_finished() {
            self.step(rng);
        }
        self.finish(None)
    }

    /// Execute a single step
    pub fn step<R: GameRng>(&mut self, rng: &mut R) {
        match self.status {
            CombatStatus::Finished => return,
            CombatStatus::Preparing => self.prepare(),
            CombatStatus::Running => {}
        }

        if self.living(Side::A) == 0 || self.living(Side::B) == 0 {
            self.finish(None);
            return;
        }

        for side in Side::BOTH {
            let front_alive = self.units[side.index()]
                .first()
                .is_some_and(CombatUnit::is_alive);
            if front_alive {
                self.attack(side, rng);
            }
        }

        let settled = self.resolve_deaths();
        self.steps += 1;

        if !settled {
            self.finish(Some(LimitReason::DeathCascade));
        } else if self.living(Side::A) == 0 || self.living(Side::B) == 0 {
            self.finish(None);
        } else if self.steps >= MAX_COMBAT_STEPS {
            self.finish(Some(LimitReason::StepCeiling));
        }
    }

    /// Stop the combat with the board as it stands. Returns the existing
    /// verdict when already finished.
    pub fn force_finish(&mut self, reason: LimitReason) -> Verdict {
        if self.status == CombatStatus::Preparing {
            self.prepare();
        }
        self.finish(Some(reason))
    }

    fn finish(&mut self, limit: Option<LimitReason>) -> Verdict {
        if let Some(verdict) = self.verdict {
            return verdict;
        }
        let survivors = [self.living(Side::A), self.living(Side::B)];
        let limit = if survivors.contains(&0) { None } else { limit };
        if let Some(reason) = limit {
            self.events.push(CombatEvent::LimitReached { reason });
        }
        let verdict = Verdict::from_survivors(survivors, self.steps, limit);
        self.events.push(CombatEvent::CombatEnd { verdict });
        self.verdict = Some(verdict);
        self.status = CombatStatus::Finished;
        log::debug!(
            "combat finished after {} steps: winner {:?}, damage {}",
            verdict.steps,
            verdict.winner,
            verdict.damage
        );
        verdict
    }

    fn attack<R: GameRng>(&mut self, side: Side, rng: &mut R) {
        let attacker = &self.units[side.index()][0];
        let attacker_id = attacker.id;
        let attack = attacker.attack;
        let crit_pct = attacker.crit_pct;
        let area_pct = attacker.area_pct;
        let area_damage = attacker.area_damage;

        let defenders = &mut self.units[side.opponent().index()];
        let Some(target) = pick_target(defenders) else {
            return;
        };

        let crit = rng.roll_percent(crit_pct);
        let raw = if crit { attack * 2 } else { attack };
        let damage = defenders[target].take_damage(raw);
        let target_id = defenders[target].id;
        self.events.push(CombatEvent::Attack {
            attacker: attacker_id,
            target: target_id,
            damage,
            crit,
            remaining_hp: defenders[target].health,
        });
        self.last_attacker[side.index()] = Some(attacker_id);
        self.last_hit[side.opponent().index()] = Some(target_id);

        if area_pct == 0 || !rng.roll_percent(area_pct) {
            return;
        }
        for (i, unit) in defenders.iter_mut().enumerate() {
            if i == target || !unit.is_alive() {
                continue;
            }
            let damage = unit.take_damage(area_damage);
            self.events.push(CombatEvent::AreaHit {
                source: attacker_id,
                target: unit.id,
                damage,
                remaining_hp: unit.health,
            });
        }
    }

    /// Remove fallen units until a pass finds none. Returns `false` when the
    /// pass guard ran out with deaths still pending; those units are dropped
    /// without firing their on-death effects.
    fn resolve_deaths(&mut self) -> bool {
        for _ in 0..MAX_DEATH_PASSES {
            let fell_a = self.resolve_side_deaths(Side::A);
            let fell_b = self.resolve_side_deaths(Side::B);
            if !fell_a && !fell_b {
                return true;
            }
        }

        let pending = self.units.iter().flatten().any(|u| !u.is_alive());
        if !pending {
            return true;
        }
        log::warn!(
            "death cascade still active after {} passes, cutting combat off",
            MAX_DEATH_PASSES
        );
        for line in self.units.iter_mut() {
            line.retain(CombatUnit::is_alive);
        }
        false
    }

    /// One pass over `side`: mark fallen units, fire their on-death damage at
    /// the opposing line, then drop them. Returns whether anyone fell.
    fn resolve_side_deaths(&mut self, side: Side) -> bool {
        let mut fallen = Vec::new();
        for unit in self.units[side.index()].iter_mut() {
            if unit.is_alive() || unit.removed {
                continue;
            }
            unit.removed = true;
            fallen.push((unit.id, unit.on_death));
        }
        if fallen.is_empty() {
            return false;
        }

        for (source, on_death) in fallen {
            self.events.push(CombatEvent::UnitDeath { unit: source });
            if on_death <= 0 {
                continue;
            }
            for unit in self.units[side.opponent().index()].iter_mut() {
                if !unit.is_alive() {
                    continue;
                }
                let damage = unit.take_damage(on_death);
                self.events.push(CombatEvent::Explosion {
                    source,
                    target: unit.id,
                    damage,
                    remaining_hp: unit.health,
                });
            }
        }

        self.units[side.index()].retain(|unit| !unit.removed);
        true
    }
}

/// First living taunt unit, otherwise the first living unit
pub fn pick_target(defenders: &[CombatUnit]) -> Option<usize> {
    defenders
        .iter()
        .position(|u| u.taunt && u.is_alive())
        .or_else(|| defenders.iter().position(CombatUnit::is_alive))
}

fn lowest_health(line: &[CombatUnit]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, unit) in line.iter().enumerate() {
        if !unit.is_alive() {
            continue;
        }
        if best.map_or(true, |b| unit.health < line[b].health) {
            best = Some(i);
        }
    }
    best
}

/// Resolve a full combat between two boards
pub fn resolve_combat<R: GameRng>(
    board_a: &[BoardUnit],
    board_b: &[BoardUnit],
    rng: &mut R,
) -> Combat {
    let mut combat = Combat::new(board_a, board_b);
    combat.prepare();
    combat.run_to_end(rng);
    combat
}
