use serde::Serialize;

use crate::constants::{MAX_CUSTOM_SPEED_MS, MIN_CUSTOM_SPEED_MS};
use crate::maps::PRESET_COUNT;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Which snake/ladder layout a match is played on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum MapDesign {
    #[default]
    Random,
    Default,
    /// Fixed layout `1..=10`.
    Preset(u8),
}

impl MapDesign {
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "random" => Some(Self::Random),
            "default" => Some(Self::Default),
            other => other
                .parse::<u8>()
                .ok()
                .filter(|id| (1..=PRESET_COUNT).contains(id))
                .map(Self::Preset),
        }
    }
}

impl From<MapDesign> for String {
    fn from(value: MapDesign) -> Self {
        match value {
            MapDesign::Random => "random".to_string(),
            MapDesign::Default => "default".to_string(),
            MapDesign::Preset(id) => id.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum GameSpeed {
    Fast,
    #[default]
    Medium,
    Slow,
    /// Explicit delay in milliseconds.
    Custom(u64),
}

impl GameSpeed {
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "fast" => Some(Self::Fast),
            "medium" => Some(Self::Medium),
            "slow" => Some(Self::Slow),
            other => other
                .parse::<u64>()
                .ok()
                .map(|ms| Self::Custom(ms.clamp(MIN_CUSTOM_SPEED_MS, MAX_CUSTOM_SPEED_MS))),
        }
    }
}

impl From<GameSpeed> for String {
    fn from(value: GameSpeed) -> Self {
        match value {
            GameSpeed::Fast => "fast".to_string(),
            GameSpeed::Medium => "medium".to_string(),
            GameSpeed::Slow => "slow".to_string(),
            GameSpeed::Custom(ms) => ms.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum GameMode {
    #[default]
    #[serde(rename = "pvb")]
    PlayerVsBot,
    #[serde(rename = "bvb")]
    BotVsBot,
}

impl GameMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pvb" | "player_vs_bot" => Some(Self::PlayerVsBot),
            "bvb" | "bot_vs_bot" => Some(Self::BotVsBot),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayerVsBot => "pvb",
            Self::BotVsBot => "bvb",
        }
    }
}

/// When a snake or ladder moves the player who landed on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardPolicy {
    /// Applied in the same turn.
    #[default]
    Immediate,
    /// Held as the player's pending effect and applied at the start of their next turn.
    Deferred,
}

impl HazardPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "immediate" => Some(Self::Immediate),
            "deferred" => Some(Self::Deferred),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Deferred => "deferred",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Snake,
    Ladder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Hazard {
    #[serde(rename = "type")]
    pub kind: HazardKind,
    pub from: u8,
    pub to: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Idle,
    Active,
    Paused,
    Finished,
}

#[derive(Clone, Debug)]
pub struct StartPlayer {
    pub name: String,
    pub is_bot: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Player {
    pub name: String,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
    pub position: u8,
    pub finished: bool,
    #[serde(rename = "finishRank")]
    pub finish_rank: Option<u32>,
    #[serde(rename = "pendingEffect")]
    pub pending_effect: Option<Hazard>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub rolls: u32,
    pub steps: u32,
    #[serde(rename = "snakeHits")]
    pub snake_hits: u32,
    #[serde(rename = "ladderClimbs")]
    pub ladder_climbs: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchTotals {
    pub rolls: u32,
    #[serde(rename = "snakeHits")]
    pub snake_hits: u32,
    #[serde(rename = "ladderClimbs")]
    pub ladder_climbs: u32,
}

/// One accepted die roll. `hazard` is the snake or ladder the player landed on,
/// whether it was applied at once or deferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RollRecord {
    #[serde(rename = "playerIndex")]
    pub player_index: usize,
    pub roll: u8,
    pub from: u8,
    pub landed: u8,
    pub hazard: Option<Hazard>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RankUpdate {
    #[serde(rename = "playerIndex")]
    pub player_index: usize,
    pub rank: u32,
    /// Ranked last without rolling because everyone else had finished.
    pub forced: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResolved {
    pub player_index: usize,
    pub roll: u8,
    pub old_position: u8,
    pub pending_applied: Option<Hazard>,
    pub landed: u8,
    pub bounced: bool,
    pub hazard: Option<Hazard>,
    pub hazard_deferred: bool,
    pub new_position: u8,
    pub rank_updates: Vec<RankUpdate>,
    pub next_player_index: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Outstanding,
    VeryGood,
    Good,
    Fair,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingEntry {
    pub place: usize,
    #[serde(rename = "playerIndex")]
    pub player_index: usize,
    pub name: String,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
    pub position: u8,
    pub finished: bool,
    #[serde(rename = "finishRank")]
    pub finish_rank: Option<u32>,
    pub stats: PlayerStats,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    MatchStarted {
        #[serde(rename = "startingPlayer")]
        starting_player: usize,
        snakes: usize,
        ladders: usize,
        policy: HazardPolicy,
    },
    TurnResolved(TurnResolved),
    TurnSkipped {
        #[serde(rename = "playerIndex")]
        player_index: usize,
    },
    PlayerFinished {
        #[serde(rename = "playerIndex")]
        player_index: usize,
        rank: u32,
        forced: bool,
    },
    MatchPaused,
    MatchResumed,
    AutoPlayChanged {
        enabled: bool,
    },
    MatchReset,
    MatchFinished {
        ranking: Vec<RankingEntry>,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    #[serde(rename = "atMs")]
    pub at_ms: u64,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub duration_ms: u64,
    pub winner_index: Option<usize>,
    pub winner_name: Option<String>,
    pub winner_average_steps: f64,
    pub winner_rating: Option<PerformanceRating>,
    pub ranking: Vec<RankingEntry>,
    pub totals: MatchTotals,
    pub timeline: Vec<TimelineEvent>,
}
