//! Round state machine.
//!
//! A [`Match`] owns both players, the random source, the current combat and
//! its own timer queue. Phases run `Shop -> Fight -> Result` and loop into
//! the next round's shop until the round limit or a knockout moves the match
//! to `End`. Timers are entries in the match's [`Scheduler`]; the host drives
//! them by calling [`Match::tick`] with the current time. Every phase entry
//! cancels all pending timers first, so a timer can only ever fire into the
//! phase that scheduled it.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::battle::{Combat, Verdict};
use crate::economy::{round_income, DRAW_REWARD, WIN_REWARD};
use crate::error::{GameError, GameResult};
use crate::limits::{LimitReason, Side, FAST_FORWARD_STEPS_PER_TICK, STEPS_PER_TICK};
use crate::opponents::{take_shop_turn, Difficulty};
use crate::record::Outcome;
use crate::rng::XorShiftRng;
use crate::scheduler::{Scheduler, Trigger};
use crate::state::{PlayerState, Purchase, ROUND_LIMIT};
use crate::types::UnitKind;

/// Phase durations in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimings {
    pub shop_ms: u64,
    pub fight_ms: u64,
    pub result_ms: u64,
    /// Interval between combat ticks
    pub tick_ms: u64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            shop_ms: 25_000,
            fight_ms: 20_000,
            result_ms: 5_000,
            tick_ms: 500,
        }
    }
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    Shop,
    Fight,
    Result,
    End,
}

/// Who controls side B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatchMode {
    /// Side B is the opponent policy at the given difficulty
    Solo { difficulty: Difficulty },
    /// Both sides are remote peers
    Versus,
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", content = "side", rename_all = "camelCase")]
pub enum MatchOutcome {
    /// The other side was knocked out
    Victory(Side),
    /// Both sides were knocked out in the same round
    Draw,
    /// The round limit was reached with both sides standing
    Points,
}

impl MatchOutcome {
    /// The outcome as seen from `side`
    pub fn for_side(self, side: Side) -> Outcome {
        match self {
            MatchOutcome::Victory(winner) if winner == side => Outcome::Win,
            MatchOutcome::Victory(_) => Outcome::Loss,
            MatchOutcome::Draw => Outcome::Draw,
            MatchOutcome::Points => Outcome::Points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    mode: MatchMode,
    round: u32,
    phase: MatchPhase,
    /// When the current phase times out; `None` once the match has ended
    phase_deadline: Option<u64>,
    players: [PlayerState; 2],
    combat: Option<Combat>,
    fast_forward: bool,
    last_verdict: Option<Verdict>,
    outcome: Option<MatchOutcome>,
    timings: PhaseTimings,
    rng: XorShiftRng,
    scheduler: Scheduler,
}

impl Match {
    /// Start a match at `now` with default phase timings
    pub fn start(mode: MatchMode, seed: u64, now: u64) -> Self {
        Self::start_with_timings(mode, seed, now, PhaseTimings::default())
    }

    /// Start a single player match against the opponent policy
    pub fn start_solo(difficulty: Difficulty, seed: u64, now: u64) -> Self {
        Self::start(MatchMode::Solo { difficulty }, seed, now)
    }

    pub fn start_with_timings(mode: MatchMode, seed: u64, now: u64, timings: PhaseTimings) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let player_a = PlayerState::new(&mut rng);
        let mut player_b = PlayerState::new(&mut rng);
        if let MatchMode::Solo { difficulty } = mode {
            player_b.add_gold(difficulty.profile().bonus_gold);
        }

        let mut game = Self {
            mode,
            round: 1,
            phase: MatchPhase::Shop,
            phase_deadline: None,
            players: [player_a, player_b],
            combat: None,
            fast_forward: false,
            last_verdict: None,
            outcome: None,
            timings,
            rng,
            scheduler: Scheduler::new(),
        };
        log::info!("match started: {:?}, seed {}", mode, seed);
        game.enter_shop(now);
        game
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn phase_deadline(&self) -> Option<u64> {
        self.phase_deadline
    }

    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side.index()]
    }

    pub fn combat(&self) -> Option<&Combat> {
        self.combat.as_ref()
    }

    pub fn is_fast_forward(&self) -> bool {
        self.fast_forward
    }

    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::End
    }

    /// When the next timer is due, if any
    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    // ==========================================
    // COMMANDS
    // ==========================================

    pub fn buy(&mut self, side: Side, kind: UnitKind) -> GameResult<Purchase> {
        self.ensure_shop()?;
        let purchase = self.players[side.index()].buy(kind)?;
        log::debug!("{:?} bought {}: {:?}", side, kind.id(), purchase);
        Ok(purchase)
    }

    pub fn reroll(&mut self, side: Side) -> GameResult<()> {
        self.ensure_shop()?;
        self.players[side.index()].reroll(&mut self.rng)?;
        log::debug!("{:?} rerolled the shop", side);
        Ok(())
    }

    pub fn level_up_shop(&mut self, side: Side) -> GameResult<()> {
        self.ensure_shop()?;
        let player = &mut self.players[side.index()];
        player.level_up_shop(&mut self.rng)?;
        log::debug!("{:?} leveled shop to {}", side, player.shop_level);
        Ok(())
    }

    /// Let the opponent policy play `side`'s shop phase, as used by headless
    /// simulations. The side gets no bonus gold from the difficulty.
    pub fn autoplay_shop(&mut self, side: Side, difficulty: Difficulty) -> GameResult<()> {
        self.ensure_shop()?;
        take_shop_turn(
            &mut self.players[side.index()],
            &difficulty.profile(),
            self.round,
            &mut self.rng,
        );
        Ok(())
    }

    /// Skip ahead: ends the shop early, fast-forwards a running fight, or
    /// moves on from the result screen.
    pub fn advance_phase(&mut self, now: u64) -> GameResult<()> {
        match self.phase {
            MatchPhase::Shop => self.enter_fight(now),
            MatchPhase::Fight => {
                self.fast_forward = true;
                log::debug!("fight fast-forward enabled");
            }
            MatchPhase::Result => self.end_round(now),
            MatchPhase::End => return Err(GameError::WrongPhase),
        }
        Ok(())
    }

    /// Fire every timer due at or before `now`. Returns how many fired.
    pub fn tick(&mut self, now: u64) -> usize {
        let mut fired = 0;
        while let Some((at, trigger)) = self.scheduler.pop_due(now) {
            fired += 1;
            match trigger {
                Trigger::ShopTimeout if self.phase == MatchPhase::Shop => self.enter_fight(at),
                Trigger::CombatTick if self.phase == MatchPhase::Fight => self.combat_tick(at),
                Trigger::FightTimeout if self.phase == MatchPhase::Fight => {
                    self.finish_combat(at, true)
                }
                Trigger::ResultTimeout if self.phase == MatchPhase::Result => self.end_round(at),
                stale => log::warn!("ignoring {:?} in {:?}", stale, self.phase),
            }
        }
        fired
    }

    /// Stop the match where it stands (e.g. a peer left). Pending timers are
    /// cancelled and no outcome is recorded.
    pub fn abort(&mut self) {
        self.scheduler.cancel_all();
        if self.phase != MatchPhase::End {
            log::info!("match aborted in round {}", self.round);
            self.phase = MatchPhase::End;
            self.phase_deadline = None;
        }
    }

    // ==========================================
    // PHASE TRANSITIONS
    // ==========================================

    fn ensure_shop(&self) -> GameResult<()> {
        if self.phase != MatchPhase::Shop {
            return Err(GameError::WrongPhase);
        }
        Ok(())
    }

    fn enter_shop(&mut self, now: u64) {
        self.scheduler.cancel_all();
        self.phase = MatchPhase::Shop;
        self.phase_deadline = Some(now + self.timings.shop_ms);
        self.combat = None;
        self.fast_forward = false;

        if let MatchMode::Solo { difficulty } = self.mode {
            take_shop_turn(
                &mut self.players[Side::B.index()],
                &difficulty.profile(),
                self.round,
                &mut self.rng,
            );
        }

        self.scheduler
            .schedule(now + self.timings.shop_ms, Trigger::ShopTimeout);
        log::debug!("round {} shop opened", self.round);
    }

    fn enter_fight(&mut self, now: u64) {
        self.scheduler.cancel_all();
        self.phase = MatchPhase::Fight;
        self.phase_deadline = Some(now + self.timings.fight_ms);
        self.fast_forward = false;

        let mut combat = Combat::new(
            &self.players[Side::A.index()].board,
            &self.players[Side::B.index()].board,
        );
        combat.prepare();
        self.combat = Some(combat);

        self.scheduler
            .schedule(now + self.timings.fight_ms, Trigger::FightTimeout);
        self.scheduler
            .schedule(now + self.timings.tick_ms, Trigger::CombatTick);
        log::debug!("round {} fight started", self.round);
    }

    fn combat_tick(&mut self, now: u64) {
        let steps = if self.fast_forward {
            FAST_FORWARD_STEPS_PER_TICK
        } else {
            STEPS_PER_TICK
        };
        let finished = match self.combat.as_mut() {
            Some(combat) => {
                combat.advance(steps, &mut self.rng);
                combat.is_finished()
            }
            None => true,
        };
        if finished {
            self.finish_combat(now, false);
        } else {
            self.scheduler
                .schedule(now + self.timings.tick_ms, Trigger::CombatTick);
        }
    }

    /// Settle the fight and apply HP loss and rewards. Runs once per round:
    /// it leaves the fight phase immediately.
    fn finish_combat(&mut self, now: u64, timed_out: bool) {
        if self.phase != MatchPhase::Fight {
            return;
        }
        let verdict = match self.combat.as_mut() {
            Some(combat) if timed_out => combat.force_finish(LimitReason::PhaseTimeout),
            Some(combat) => combat.force_finish(LimitReason::StepCeiling),
            None => return,
        };

        match (verdict.winner, verdict.loser()) {
            (Some(winner), Some(loser)) => {
                self.players[loser.index()].hp -= verdict.damage;
                self.players[winner.index()].add_gold(WIN_REWARD);
            }
            _ => {
                for player in self.players.iter_mut() {
                    player.add_gold(DRAW_REWARD);
                }
            }
        }
        log::info!(
            "round {} verdict: winner {:?}, damage {}, steps {}",
            self.round,
            verdict.winner,
            verdict.damage,
            verdict.steps
        );
        self.last_verdict = Some(verdict);
        self.enter_result(now);
    }

    fn enter_result(&mut self, now: u64) {
        self.scheduler.cancel_all();
        self.phase = MatchPhase::Result;
        self.phase_deadline = Some(now + self.timings.result_ms);
        self.scheduler
            .schedule(now + self.timings.result_ms, Trigger::ResultTimeout);
    }

    fn end_round(&mut self, now: u64) {
        self.scheduler.cancel_all();
        let knocked_out = self.players.iter().any(PlayerState::is_defeated);
        if knocked_out || self.round >= ROUND_LIMIT {
            self.end_match();
            return;
        }

        let income = round_income(self.round);
        self.round += 1;
        let bonus = match self.mode {
            MatchMode::Solo { difficulty } => difficulty.profile().bonus_gold,
            MatchMode::Versus => 0,
        };
        self.players[Side::A.index()].add_gold(income);
        self.players[Side::B.index()].add_gold(income + bonus);
        for player in self.players.iter_mut() {
            player.refresh_shop(&mut self.rng);
        }
        self.enter_shop(now);
    }

    fn end_match(&mut self) {
        if self.phase == MatchPhase::End {
            return;
        }
        self.scheduler.cancel_all();
        let a_down = self.players[Side::A.index()].is_defeated();
        let b_down = self.players[Side::B.index()].is_defeated();
        let outcome = match (a_down, b_down) {
            (true, true) => MatchOutcome::Draw,
            (true, false) => MatchOutcome::Victory(Side::B),
            (false, true) => MatchOutcome::Victory(Side::A),
            (false, false) => MatchOutcome::Points,
        };
        self.phase = MatchPhase::End;
        self.phase_deadline = None;
        self.outcome = Some(outcome);
        log::info!("match over after round {}: {:?}", self.round, outcome);
    }
}
