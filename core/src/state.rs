use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::economy::{self, MAX_SHOP_LEVEL, REROLL_COST, UNIT_COST};
use crate::error::{GameError, GameResult};
use crate::rng::GameRng;
use crate::shop::generate_offers;
use crate::synergy::{build_modifiers, SynergyModifiers};
use crate::types::*;

/// Number of board slots
pub const BOARD_SIZE: usize = 5;
/// Starting hit points
pub const STARTING_HP: i32 = 20;
/// Starting gold
pub const STARTING_GOLD: i32 = 3;
/// Rounds played before a match ends on points
pub const ROUND_LIMIT: u32 = 12;
/// Copies of one archetype that fuse into an upgraded unit
pub const FUSION_COPIES: usize = 3;

/// What a successful purchase did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Purchase {
    /// The unit was appended to the board
    Placed(UnitUid),
    /// The unit completed three copies; they were replaced by this upgraded unit
    Fused(UnitUid),
}

/// One seat's economy and board
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub hp: i32,
    pub gold: i32,
    /// Index 0 is the front of the line
    pub board: Vec<BoardUnit>,
    pub shop_level: u8,
    pub shop: Vec<ShopOffer>,
    /// Counter for generating unique unit ids
    pub next_unit_id: u32,
}

impl PlayerState {
    pub fn new<R: GameRng>(rng: &mut R) -> Self {
        Self {
            hp: STARTING_HP,
            gold: STARTING_GOLD,
            board: Vec::new(),
            shop_level: 1,
            shop: generate_offers(1, rng),
            next_unit_id: 1,
        }
    }

    /// Generate a unique unit id
    pub fn generate_unit_id(&mut self) -> UnitUid {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        UnitUid(id)
    }

    /// Add gold, respecting the cap
    pub fn add_gold(&mut self, amount: i32) {
        self.gold = economy::credit(self.gold, amount);
    }

    /// Check if player can afford a cost
    pub fn can_afford(&self, cost: i32) -> bool {
        self.gold >= cost
    }

    /// Spend gold. Fails without mutating when the balance is short.
    pub fn spend_gold(&mut self, amount: i32) -> GameResult<()> {
        if !self.can_afford(amount) {
            return Err(GameError::NotEnoughGold {
                have: self.gold,
                need: amount,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Copies of `kind` on the board, fused units included
    pub fn count_kind(&self, kind: UnitKind) -> usize {
        self.board.iter().filter(|u| u.kind == kind).count()
    }

    /// A full board still accepts the copy that completes a fusion
    pub fn has_room_for(&self, kind: UnitKind) -> bool {
        self.board.len() < BOARD_SIZE || self.count_kind(kind) >= FUSION_COPIES - 1
    }

    /// Validate a purchase and return the index of the offer it would consume
    pub fn check_purchase(&self, kind: UnitKind) -> GameResult<usize> {
        let index = self
            .shop
            .iter()
            .position(|offer| offer.kind == kind)
            .ok_or(GameError::OfferNotFound)?;
        if !self.can_afford(UNIT_COST) {
            return Err(GameError::NotEnoughGold {
                have: self.gold,
                need: UNIT_COST,
            });
        }
        if !self.has_room_for(kind) {
            return Err(GameError::BoardFull);
        }
        Ok(index)
    }

    /// Buy the first offer of `kind`, fusing when it completes three copies
    pub fn buy(&mut self, kind: UnitKind) -> GameResult<Purchase> {
        let offer_index = self.check_purchase(kind)?;
        self.spend_gold(UNIT_COST)?;
        let offer = self.shop.remove(offer_index);
        let archetype = offer.archetype();

        let uid = self.generate_unit_id();
        self.board.push(BoardUnit::from_archetype(uid, archetype));

        if self.count_kind(kind) < FUSION_COPIES {
            return Ok(Purchase::Placed(uid));
        }

        let mut removed = 0;
        self.board.retain(|unit| {
            if unit.kind == kind && removed < FUSION_COPIES {
                removed += 1;
                return false;
            }
            true
        });
        let fused_uid = self.generate_unit_id();
        self.board.push(BoardUnit::fused(fused_uid, archetype));
        log::debug!("fused three {} into {:?}", kind.id(), fused_uid);
        Ok(Purchase::Fused(fused_uid))
    }

    /// Redraw every offer at the current shop level
    pub fn refresh_shop<R: GameRng>(&mut self, rng: &mut R) {
        self.shop = generate_offers(self.shop_level, rng);
    }

    /// Pay [`REROLL_COST`] and redraw the shop
    pub fn reroll<R: GameRng>(&mut self, rng: &mut R) -> GameResult<()> {
        self.spend_gold(REROLL_COST)?;
        self.refresh_shop(rng);
        Ok(())
    }

    /// Cost of the next shop level, `None` at the top level
    pub fn level_cost(&self) -> Option<i32> {
        economy::shop_level_cost(self.shop_level)
    }

    /// Pay for the next shop level and redraw the shop at the new level
    pub fn level_up_shop<R: GameRng>(&mut self, rng: &mut R) -> GameResult<()> {
        if self.shop_level >= MAX_SHOP_LEVEL {
            return Err(GameError::ShopMaxLevel);
        }
        let cost = self.level_cost().ok_or(GameError::ShopMaxLevel)?;
        self.spend_gold(cost)?;
        self.shop_level += 1;
        self.refresh_shop(rng);
        Ok(())
    }

    /// Synergy modifiers for the board as it stands now
    pub fn modifiers(&self) -> SynergyModifiers {
        build_modifiers(&self.board)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }
}
