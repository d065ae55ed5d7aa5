use std::{env, time::Duration};

// Runtime/host constants (not gameplay tuning).

/// Fixed seed for spawn placement; unset means a fresh random layout each run.
pub fn arena_seed() -> Option<u64> {
    env::var("ARENA_SEED")
        .ok()
        .and_then(|value| value.parse().ok())
}

pub fn snapshot_every_ticks() -> u64 {
    env::var("SNAPSHOT_EVERY_TICKS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|ticks| *ticks > 0)
        .unwrap_or(30)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;

pub const TICK_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const WALL_THICKNESS: f32 = 10.0;
