use crate::types::{Difficulty, GameSpeed, PerformanceRating};

pub const START_CELL: u8 = 1;
pub const FINAL_CELL: u8 = 100;

/// Rolls from this cell or above reflect off the final cell instead of clamping.
pub const BOUNCE_FROM_CELL: u8 = 98;

pub const MIN_HAZARD_SPAN: u8 = 10;
pub const PLACEMENT_ATTEMPTS: u32 = 50;

pub const SNAKE_HEAD_MIN: i32 = 20;
pub const SNAKE_HEAD_MAX: i32 = 99;
pub const LADDER_BOTTOM_MIN: i32 = 5;
pub const LADDER_BOTTOM_MAX: i32 = 84;
pub const LADDER_RISE_MIN: i32 = 10;
pub const LADDER_RISE_MAX: i32 = 39;
pub const LADDER_TOP_MAX: u8 = 99;

pub const EASY_SNAKE_REMOVAL_RATIO: f32 = 0.3;

pub const ROLL_RESOLVE_MS: u64 = 900;
pub const BOT_OPENING_DELAY_MS: u64 = 1_500;
pub const TICK_MS: u64 = 50;

pub const MIN_CUSTOM_SPEED_MS: u64 = 250;
pub const MAX_CUSTOM_SPEED_MS: u64 = 10_000;

pub const MIN_PVB_BOTS: usize = 1;
pub const MAX_PVB_BOTS: usize = 3;
pub const DEFAULT_PVB_BOTS: usize = 1;
pub const MIN_BVB_BOTS: usize = 2;
pub const MAX_BVB_BOTS: usize = 4;
pub const DEFAULT_BVB_BOTS: usize = 2;

pub const HUMAN_PLAYER_NAME: &str = "Player";
pub const BOT_NAMES: [&str; 4] = ["Bot Alpha", "Bot Beta", "Bot Gamma", "Bot Delta"];

/// (snakes, ladders) for a random board. Harder means more snakes, fewer ladders.
pub fn get_hazard_counts(difficulty: Difficulty) -> (usize, usize) {
    match difficulty {
        Difficulty::Easy => (4, 8),
        Difficulty::Medium => (7, 6),
        Difficulty::Hard => (10, 4),
    }
}

pub fn get_speed_delay_ms(speed: GameSpeed) -> u64 {
    match speed {
        GameSpeed::Fast => 1_000,
        GameSpeed::Medium => 2_500,
        GameSpeed::Slow => 5_000,
        GameSpeed::Custom(ms) => ms.clamp(MIN_CUSTOM_SPEED_MS, MAX_CUSTOM_SPEED_MS),
    }
}

/// Steps-per-roll floor for each rating tier, best first. Below the last tier is `Fair`.
pub const PERFORMANCE_TIERS: [(f64, PerformanceRating); 3] = [
    (5.0, PerformanceRating::Outstanding),
    (4.0, PerformanceRating::VeryGood),
    (3.5, PerformanceRating::Good),
];
