//! Runtime configuration for the relay server.

use std::env;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use emoji_battler_core::{PhaseTimings, DEFAULT_IDLE_MS};

#[derive(Debug)]
pub struct Settings {
    /// Address the HTTP listener binds to.
    pub addr: String,
    /// How long the loop waits for a request before ticking rooms.
    pub poll_interval: Duration,
    /// Seed for room codes, peer tokens and match seeds.
    pub seed: u64,
    pub timings: PhaseTimings,
    /// Milliseconds without a request before a peer counts as disconnected.
    pub idle_ms: u64,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Settings {
    pub fn from_env() -> Self {
        let addr = env::var("EMOJI_BATTLER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let poll_interval = Duration::from_millis(var_or("EMOJI_BATTLER_POLL_MS", 50));

        let clock_seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1);
        let seed = var_or("EMOJI_BATTLER_SEED", clock_seed);

        let defaults = PhaseTimings::default();
        let timings = PhaseTimings {
            shop_ms: var_or("EMOJI_BATTLER_SHOP_MS", defaults.shop_ms),
            fight_ms: var_or("EMOJI_BATTLER_FIGHT_MS", defaults.fight_ms),
            result_ms: var_or("EMOJI_BATTLER_RESULT_MS", defaults.result_ms),
            tick_ms: var_or("EMOJI_BATTLER_TICK_MS", defaults.tick_ms),
        };

        let idle_ms = var_or("EMOJI_BATTLER_IDLE_MS", DEFAULT_IDLE_MS);

        Settings {
            addr,
            poll_interval,
            seed,
            timings,
            idle_ms,
        }
    }
}
