mod economy;
mod opponents;
mod rooms;

use alloc::vec::Vec;

use crate::rng::{GameRng, XorShiftRng};
use crate::state::PlayerState;
use crate::types::*;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

/// Replays a fixed list of raw draws, cycling when exhausted
pub(crate) struct ScriptedRng {
    values: Vec<u32>,
    pos: usize,
}

impl ScriptedRng {
    pub(crate) fn new(values: &[u32]) -> Self {
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }
}

impl GameRng for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value
    }
}

fn unit(uid: u32, kind: UnitKind) -> BoardUnit {
    BoardUnit::from_archetype(UnitUid(uid), kind.archetype())
}

/// A plain melee unit with the given stats and on-death damage
fn custom_unit(uid: u32, attack: i32, health: i32, on_death: i32) -> BoardUnit {
    let mut unit = unit(uid, UnitKind::Warrior);
    unit.attack = attack;
    unit.health = health;
    unit.traits.on_death = on_death;
    unit
}

/// A player with a chosen purse, board and shop
fn player_with(gold: i32, board: Vec<BoardUnit>, shop: &[UnitKind]) -> PlayerState {
    let mut player = PlayerState::new(&mut XorShiftRng::seed_from_u64(1));
    player.gold = gold;
    player.next_unit_id = board.iter().map(|u| u.uid.0).max().unwrap_or(0) + 1;
    player.board = board;
    player.shop = shop.iter().copied().map(ShopOffer::new).collect();
    player
}
