//! Gold rules: costs, income and combat rewards.
//!
//! All functions here are stateless; `PlayerState` applies them.

/// Gold can never exceed this through income or rewards
pub const MAX_GOLD: i32 = 10;
/// Flat price of any shop offer
pub const UNIT_COST: i32 = 3;
/// Price of redrawing all offers
pub const REROLL_COST: i32 = 1;
/// Gold paid to the combat winner
pub const WIN_REWARD: i32 = 2;
/// Gold paid to each side on a draw
pub const DRAW_REWARD: i32 = 1;
/// Highest shop level
pub const MAX_SHOP_LEVEL: u8 = 4;

/// Cost of raising the shop from `level` to `level + 1`.
/// `None` once the shop is at [`MAX_SHOP_LEVEL`].
pub fn shop_level_cost(level: u8) -> Option<i32> {
    match level {
        1 => Some(4),
        2 => Some(6),
        3 => Some(8),
        _ => None,
    }
}

/// Gold granted at the end of `round`
pub fn round_income(round: u32) -> i32 {
    2 + (round / 2).min(5) as i32
}

/// Add `amount` to `gold`, capped at [`MAX_GOLD`]
pub fn credit(gold: i32, amount: i32) -> i32 {
    (gold + amount).min(MAX_GOLD)
}
