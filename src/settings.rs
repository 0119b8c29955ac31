use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    get_speed_delay_ms, BOT_NAMES, DEFAULT_BVB_BOTS, DEFAULT_PVB_BOTS, HUMAN_PLAYER_NAME,
    MAX_BVB_BOTS, MAX_PVB_BOTS, MIN_BVB_BOTS, MIN_PVB_BOTS, ROLL_RESOLVE_MS,
};
use crate::engine::MatchOptions;
use crate::scheduler::SchedulerOptions;
use crate::types::{Difficulty, GameMode, GameSpeed, HazardPolicy, MapDesign, StartPlayer};

/// Settings as they arrive from flags or a settings file, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(
        rename = "pvbBotCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pvb_bot_count: Option<i64>,
    #[serde(
        rename = "bvbBotCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bvb_bot_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(rename = "mapDesign", default, skip_serializing_if = "Option::is_none")]
    pub map_design: Option<String>,
    #[serde(
        rename = "hazardPolicy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hazard_policy: Option<String>,
}

impl RawSettings {
    /// Reads whatever fields of `value` have a usable shape. Numbers are
    /// accepted for speed and map design, numeric strings for bot counts.
    pub fn from_json(value: &Value) -> Self {
        Self {
            difficulty: parse_optional_string(value.get("difficulty")),
            mode: parse_optional_string(value.get("mode")),
            pvb_bot_count: parse_optional_i64(value.get("pvbBotCount")),
            bvb_bot_count: parse_optional_i64(value.get("bvbBotCount")),
            speed: parse_optional_string(value.get("speed")),
            map_design: parse_optional_string(value.get("mapDesign")),
            hazard_policy: parse_optional_string(value.get("hazardPolicy")),
        }
    }

    /// Fields set in `overrides` replace ours.
    pub fn merged_with(mut self, overrides: RawSettings) -> Self {
        if overrides.difficulty.is_some() {
            self.difficulty = overrides.difficulty;
        }
        if overrides.mode.is_some() {
            self.mode = overrides.mode;
        }
        if overrides.pvb_bot_count.is_some() {
            self.pvb_bot_count = overrides.pvb_bot_count;
        }
        if overrides.bvb_bot_count.is_some() {
            self.bvb_bot_count = overrides.bvb_bot_count;
        }
        if overrides.speed.is_some() {
            self.speed = overrides.speed;
        }
        if overrides.map_design.is_some() {
            self.map_design = overrides.map_design;
        }
        if overrides.hazard_policy.is_some() {
            self.hazard_policy = overrides.hazard_policy;
        }
        self
    }
}

fn parse_optional_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_optional_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Validated preferences for the next match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub pvb_bot_count: usize,
    pub bvb_bot_count: usize,
    pub speed: GameSpeed,
    pub map_design: MapDesign,
    pub hazard_policy: HazardPolicy,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            mode: GameMode::default(),
            pvb_bot_count: DEFAULT_PVB_BOTS,
            bvb_bot_count: DEFAULT_BVB_BOTS,
            speed: GameSpeed::default(),
            map_design: MapDesign::default(),
            hazard_policy: HazardPolicy::default(),
        }
    }
}

impl GameSettings {
    /// Each field is validated on its own; a bad value only resets that field.
    pub fn from_raw(raw: &RawSettings) -> Self {
        let defaults = Self::default();
        Self {
            difficulty: raw
                .difficulty
                .as_deref()
                .and_then(Difficulty::parse)
                .unwrap_or(defaults.difficulty),
            mode: raw
                .mode
                .as_deref()
                .and_then(GameMode::parse)
                .unwrap_or(defaults.mode),
            pvb_bot_count: clamp_count(raw.pvb_bot_count, defaults.pvb_bot_count, MIN_PVB_BOTS, MAX_PVB_BOTS),
            bvb_bot_count: clamp_count(raw.bvb_bot_count, defaults.bvb_bot_count, MIN_BVB_BOTS, MAX_BVB_BOTS),
            speed: raw
                .speed
                .as_deref()
                .and_then(GameSpeed::parse)
                .unwrap_or(defaults.speed),
            map_design: raw
                .map_design
                .as_deref()
                .and_then(MapDesign::parse)
                .unwrap_or(defaults.map_design),
            hazard_policy: raw
                .hazard_policy
                .as_deref()
                .and_then(HazardPolicy::parse)
                .unwrap_or(defaults.hazard_policy),
        }
    }

    pub fn to_raw(&self) -> RawSettings {
        RawSettings {
            difficulty: Some(self.difficulty.as_str().to_string()),
            mode: Some(self.mode.as_str().to_string()),
            pvb_bot_count: Some(self.pvb_bot_count as i64),
            bvb_bot_count: Some(self.bvb_bot_count as i64),
            speed: Some(String::from(self.speed)),
            map_design: Some(String::from(self.map_design)),
            hazard_policy: Some(self.hazard_policy.as_str().to_string()),
        }
    }

    pub fn delay_ms(&self) -> u64 {
        get_speed_delay_ms(self.speed)
    }

    pub fn bot_count(&self) -> usize {
        match self.mode {
            GameMode::PlayerVsBot => self.pvb_bot_count,
            GameMode::BotVsBot => self.bvb_bot_count,
        }
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            difficulty: self.difficulty,
            map_design: self.map_design,
            hazard_policy: self.hazard_policy,
            roll_resolve_ms: ROLL_RESOLVE_MS,
        }
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions::new(self.mode, self.speed)
    }

    /// Seats in turn order: the human first in player-vs-bot, then the bots.
    pub fn start_players(&self) -> Vec<StartPlayer> {
        let mut players = Vec::with_capacity(self.bot_count() + 1);
        if self.mode == GameMode::PlayerVsBot {
            players.push(StartPlayer {
                name: HUMAN_PLAYER_NAME.to_string(),
                is_bot: false,
            });
        }
        players.extend(
            BOT_NAMES
                .iter()
                .take(self.bot_count())
                .map(|name| StartPlayer {
                    name: (*name).to_string(),
                    is_bot: true,
                }),
        );
        players
    }
}

fn clamp_count(value: Option<i64>, fallback: usize, min: usize, max: usize) -> usize {
    match value {
        Some(count) => count.clamp(min as i64, max as i64) as usize,
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_raw_settings_give_defaults() {
        let settings = GameSettings::from_raw(&RawSettings::default());
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.map_design, MapDesign::Random);
        assert_eq!(settings.delay_ms(), 2_500);
        assert_eq!(settings.pvb_bot_count, 1);
        assert_eq!(settings.bvb_bot_count, 2);
        assert_eq!(settings.hazard_policy, HazardPolicy::Immediate);
    }

    #[test]
    fn invalid_fields_fall_back_independently() {
        let raw = RawSettings::from_json(&json!({
            "difficulty": "nightmare",
            "mode": "bvb",
            "pvbBotCount": 9,
            "bvbBotCount": "0",
            "speed": 120,
            "mapDesign": "11",
            "hazardPolicy": true,
        }));
        let settings = GameSettings::from_raw(&raw);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.mode, GameMode::BotVsBot);
        assert_eq!(settings.pvb_bot_count, MAX_PVB_BOTS);
        assert_eq!(settings.bvb_bot_count, MIN_BVB_BOTS);
        assert_eq!(settings.speed, GameSpeed::Custom(250));
        assert_eq!(settings.map_design, MapDesign::Random);
        assert_eq!(settings.hazard_policy, HazardPolicy::Immediate);
    }

    #[test]
    fn to_raw_is_accepted_back_unchanged() {
        let settings = GameSettings {
            difficulty: Difficulty::Hard,
            mode: GameMode::BotVsBot,
            pvb_bot_count: 3,
            bvb_bot_count: 4,
            speed: GameSpeed::Custom(3_000),
            map_design: MapDesign::Preset(7),
            hazard_policy: HazardPolicy::Deferred,
        };
        assert_eq!(GameSettings::from_raw(&settings.to_raw()), settings);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let stored = GameSettings::default().to_raw();
        let overrides = RawSettings {
            speed: Some("fast".to_string()),
            ..RawSettings::default()
        };
        let settings = GameSettings::from_raw(&stored.merged_with(overrides));
        assert_eq!(settings.speed, GameSpeed::Fast);
        assert_eq!(settings.difficulty, Difficulty::Medium);
    }

    #[test]
    fn start_players_follow_mode() {
        let pvb = GameSettings {
            pvb_bot_count: 3,
            ..GameSettings::default()
        };
        let players = pvb.start_players();
        assert_eq!(players.len(), 4);
        assert_eq!(players[0].name, "Player");
        assert!(!players[0].is_bot);
        assert!(players[1..].iter().all(|player| player.is_bot));

        let bvb = GameSettings {
            mode: GameMode::BotVsBot,
            bvb_bot_count: 4,
            ..GameSettings::default()
        };
        let names: Vec<String> = bvb.start_players().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bot Alpha", "Bot Beta", "Bot Gamma", "Bot Delta"]);
    }
}
