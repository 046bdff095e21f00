//! Emoji Battler relay server.
//!
//! One thread owns the room registry. It waits for a request for at most the
//! poll interval, then ticks every room's timers before handling whatever
//! arrived, so matches keep moving while nobody is talking to the server.

mod config;
mod routes;

use std::time::Instant;

use anyhow::anyhow;
use emoji_battler_core::RoomRegistry;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = config::Settings::from_env();
    let server = tiny_http::Server::http(settings.addr.as_str())
        .map_err(|e| anyhow!("failed to bind {}: {e}", settings.addr))?;
    log::info!("listening on http://{}", settings.addr);
    log::debug!("settings: {:?}", settings);

    let started = Instant::now();
    let mut registry = RoomRegistry::with_timings(settings.seed, settings.timings)
        .with_idle_timeout(settings.idle_ms);

    loop {
        let request = server.recv_timeout(settings.poll_interval)?;
        let now = started.elapsed().as_millis() as u64;

        let changed = registry.tick(now);
        if !changed.is_empty() {
            log::debug!("rooms advanced: {:?}", changed);
        }

        if let Some(request) = request {
            routes::handle(&mut registry, request, now);
        }
    }
}
