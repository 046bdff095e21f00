//! Shop offer generation.
//!
//! Each offer is drawn independently: roll a tier from the level's odds, then
//! pick uniformly from that tier's pool. Duplicates across offers are allowed.

use alloc::vec::Vec;

use crate::rng::GameRng;
use crate::types::ShopOffer;
use crate::units::tier_pool;

/// Offers presented per shop cycle
pub const SHOP_SIZE: usize = 3;

/// Tier odds in percent per shop level (row 0 = level 1, column 0 = tier 1)
pub static TIER_ODDS: [[u32; 4]; 4] = [
    [80, 18, 2, 0],
    [55, 30, 12, 3],
    [35, 35, 20, 10],
    [25, 30, 25, 20],
];

/// Odds row for a shop level; unknown levels use the level-1 row
pub fn tier_odds(shop_level: u8) -> &'static [u32; 4] {
    match shop_level {
        1..=4 => &TIER_ODDS[(shop_level - 1) as usize],
        _ => &TIER_ODDS[0],
    }
}

/// Roll a 1-based tier for `shop_level`
pub fn roll_tier<R: GameRng>(shop_level: u8, rng: &mut R) -> u8 {
    let roll = rng.gen_range(100) as u32;
    let mut acc = 0;
    for (i, chance) in tier_odds(shop_level).iter().enumerate() {
        acc += chance;
        if roll < acc {
            return (i + 1) as u8;
        }
    }
    1
}

/// Draw a single offer
pub fn draw_offer<R: GameRng>(shop_level: u8, rng: &mut R) -> ShopOffer {
    let pool = tier_pool(roll_tier(shop_level, rng));
    ShopOffer::new(pool[rng.gen_range(pool.len())])
}

/// Draw a full shop cycle of [`SHOP_SIZE`] offers
pub fn generate_offers<R: GameRng>(shop_level: u8, rng: &mut R) -> Vec<ShopOffer> {
    (0..SHOP_SIZE).map(|_| draw_offer(shop_level, rng)).collect()
}
