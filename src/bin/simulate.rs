use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use snake_ladder_engine::constants::{FINAL_CELL, START_CELL, TICK_MS};
use snake_ladder_engine::engine::{now_ms, RollOutcome};
use snake_ladder_engine::session::GameSession;
use snake_ladder_engine::settings::{GameSettings, RawSettings};
use snake_ladder_engine::types::{
    Difficulty, GameEvent, GameMode, GameSpeed, HazardKind, HazardPolicy, MapDesign, MatchPhase,
    PerformanceRating,
};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Virtual milliseconds after which a match counts as stuck.
const SAFETY_LIMIT_MS: u64 = 24 * 60 * 60 * 1_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs headless bot-vs-bot matches and checks match invariants")]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    bots: Option<i64>,
    #[arg(long)]
    games: Option<u32>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    map: Option<String>,
    #[arg(long)]
    policy: Option<String>,
    #[arg(long)]
    speed: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    settings: GameSettings,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    bots: usize,
    difficulty: Difficulty,
    #[serde(rename = "mapDesign")]
    map_design: MapDesign,
    #[serde(rename = "hazardPolicy")]
    hazard_policy: HazardPolicy,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    rolls: u32,
    #[serde(rename = "snakeHits")]
    snake_hits: u32,
    #[serde(rename = "ladderClimbs")]
    ladder_climbs: u32,
    bounces: u32,
    #[serde(rename = "deferredHazards")]
    deferred_hazards: u32,
    #[serde(rename = "forcedFinishes")]
    forced_finishes: u32,
    winner: Option<String>,
    #[serde(rename = "winnerRating")]
    winner_rating: Option<PerformanceRating>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    #[serde(rename = "atMs")]
    at_ms: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_turn: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "averageRolls")]
    average_rolls: f64,
    #[serde(rename = "winnerCounts")]
    winner_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    turn: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "game_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "bots": scenario.settings.bvb_bot_count,
                "difficulty": scenario.settings.difficulty,
                "mapDesign": scenario.settings.map_design,
                "hazardPolicy": scenario.settings.hazard_policy,
                "delayMs": scenario.settings.delay_ms(),
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({
                    "atMs": anomaly.at_ms,
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();

        emit_log(
            "info",
            "game_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_turn),
            json!({
                "winner": scenario_run.result.winner,
                "durationMs": scenario_run.result.duration_ms,
                "rolls": scenario_run.result.rolls,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(text) => println!("{text}"),
            Err(error) => eprintln!("[simulate] failed to serialize result: {error}"),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "gameCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "averageRolls": summary.average_rolls,
            "winnerCounts": summary.winner_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

/// Plays one auto-played bot-vs-bot match on a virtual clock.
fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut session = GameSession::new(scenario.settings, scenario.seed);
    let delay_ms = scenario.settings.delay_ms();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();

    let mut bounces = 0u32;
    let mut deferred_hazards = 0u32;
    let mut forced_finishes = 0u32;
    let mut match_finished_events = 0u32;
    let mut last_roll_ms: Option<u64> = None;
    let mut now = 0u64;

    if !session.start(now) || !session.toggle_auto_play(now) {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            now,
            "match did not start".to_string(),
        );
    }

    while session.state().phase() == MatchPhase::Active {
        if let Some(outcome) = session.tick(now) {
            if let RollOutcome::Ignored(reason) = outcome {
                push_anomaly(
                    &mut anomalies,
                    &mut anomaly_records,
                    &mut anomaly_seen,
                    now,
                    format!("scheduled roll ignored: {reason:?}"),
                );
            }
            if let Some(last) = last_roll_ms {
                if now - last < delay_ms {
                    push_anomaly(
                        &mut anomalies,
                        &mut anomaly_records,
                        &mut anomaly_seen,
                        now,
                        format!("rolls {}ms apart, expected at least {delay_ms}ms", now - last),
                    );
                }
            }
            last_roll_ms = Some(now);
        }

        for message in collect_position_anomalies(&session) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                now,
                message,
            );
        }
        for event in session.drain_events() {
            match event {
                GameEvent::TurnResolved(turn) => {
                    if turn.bounced {
                        bounces += 1;
                    }
                    if turn.hazard_deferred {
                        deferred_hazards += 1;
                    }
                }
                GameEvent::PlayerFinished { forced: true, .. } => forced_finishes += 1,
                GameEvent::MatchFinished { .. } => match_finished_events += 1,
                _ => {}
            }
        }

        now += TICK_MS;
        if now > SAFETY_LIMIT_MS {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                now,
                "safety limit exceeded".to_string(),
            );
            break;
        }
    }

    for event in session.drain_events() {
        if matches!(event, GameEvent::MatchFinished { .. }) {
            match_finished_events += 1;
        }
    }
    if session.state().phase() == MatchPhase::Finished && match_finished_events != 1 {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            now,
            format!("match finished reported {match_finished_events} times"),
        );
    }
    for message in collect_rank_anomalies(&session) {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            now,
            message,
        );
    }

    let summary = session.summary(now);
    let rolls = session.state().history().len() as u32;
    let stats = session.state().stats();

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            bots: scenario.settings.bvb_bot_count,
            difficulty: scenario.settings.difficulty,
            map_design: scenario.settings.map_design,
            hazard_policy: scenario.settings.hazard_policy,
            duration_ms: summary.as_ref().map(|s| s.duration_ms).unwrap_or(now),
            rolls,
            snake_hits: stats.totals.snake_hits,
            ladder_climbs: stats.totals.ladder_climbs,
            bounces,
            deferred_hazards,
            forced_finishes,
            winner: summary.as_ref().and_then(|s| s.winner_name.clone()),
            winner_rating: summary.as_ref().and_then(|s| s.winner_rating),
            anomalies,
        },
        anomaly_records,
        finished_turn: rolls as u64,
    }
}

fn collect_position_anomalies(session: &GameSession) -> Vec<String> {
    let board = session.state().board();
    let mut anomalies = Vec::new();
    for player in session.state().players() {
        if !(START_CELL..=FINAL_CELL).contains(&player.position) {
            anomalies.push(format!(
                "position out of range: {} at {}",
                player.name, player.position
            ));
        }
        if let Some(pending) = player.pending_effect {
            let matches_board = match pending.kind {
                HazardKind::Snake => board.snake_at(pending.from) == Some(pending.to),
                HazardKind::Ladder => board.ladder_at(pending.from) == Some(pending.to),
            };
            if !matches_board || pending.from != player.position {
                anomalies.push(format!(
                    "pending effect out of place: {} at {} holds {}->{}",
                    player.name, player.position, pending.from, pending.to
                ));
            }
        }
    }
    anomalies
}

fn collect_rank_anomalies(session: &GameSession) -> Vec<String> {
    let players = session.state().players();
    let mut anomalies = Vec::new();
    let mut ranks = Vec::with_capacity(players.len());
    for player in players {
        match player.finish_rank {
            Some(rank) if player.finished => ranks.push(rank),
            _ => anomalies.push(format!("player left unranked: {}", player.name)),
        }
    }
    ranks.sort_unstable();
    let expected: Vec<u32> = (1..=players.len() as u32).collect();
    if anomalies.is_empty() && ranks != expected {
        anomalies.push(format!("ranks are not contiguous: {ranks:?}"));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let overrides = RawSettings {
        mode: Some(GameMode::BotVsBot.as_str().to_string()),
        bvb_bot_count: cli.bots,
        difficulty: cli.difficulty.clone(),
        map_design: cli.map.clone(),
        hazard_policy: cli.policy.clone(),
        speed: cli.speed.clone(),
        ..RawSettings::default()
    };

    let custom = cli.single
        || cli.bots.is_some()
        || cli.games.is_some()
        || cli.difficulty.is_some()
        || cli.map.is_some()
        || cli.policy.is_some();
    if custom {
        let settings = GameSettings::from_raw(&overrides);
        let games = cli.games.unwrap_or(1).clamp(1, 1_000);
        return (0..games)
            .map(|game| Scenario {
                name: format!("custom-bots{}-{}", settings.bvb_bot_count, game + 1),
                settings,
                seed: normalize_seed(seed as u64 + game as u64),
            })
            .collect();
    }

    let base = GameSettings::from_raw(&overrides);
    vec![
        Scenario {
            name: "quick-check-bots2".to_string(),
            settings: GameSettings {
                bvb_bot_count: 2,
                ..base
            },
            seed,
        },
        Scenario {
            name: "deferred-check-bots4".to_string(),
            settings: GameSettings {
                bvb_bot_count: 4,
                difficulty: Difficulty::Hard,
                hazard_policy: HazardPolicy::Deferred,
                ..base
            },
            seed: normalize_seed(seed as u64 + 1),
        },
        Scenario {
            name: "preset-check-bots3".to_string(),
            settings: GameSettings {
                bvb_bot_count: 3,
                difficulty: Difficulty::Easy,
                map_design: MapDesign::Preset(3),
                speed: GameSpeed::Fast,
                ..base
            },
            seed: normalize_seed(seed as u64 + 2),
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    at_ms: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        at_ms,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let mut winner_counts: BTreeMap<String, usize> = BTreeMap::new();
    for scenario in &scenarios {
        let key = scenario.winner.clone().unwrap_or_else(|| "none".to_string());
        *winner_counts.entry(key).or_insert(0) += 1;
    }
    let (average_duration_ms, average_rolls) = if scenario_count == 0 {
        (0, 0.0)
    } else {
        let total_duration: u64 = scenarios.iter().map(|s| s.duration_ms).sum();
        let total_rolls: u64 = scenarios.iter().map(|s| s.rolls as u64).sum();
        (
            total_duration / scenario_count as u64,
            total_rolls as f64 / scenario_count as f64,
        )
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_duration_ms,
        average_rolls,
        winner_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    game: Option<&str>,
    seed: Option<u32>,
    turn: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        game: game.map(|value| value.to_string()),
        seed,
        turn,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[simulate] failed to serialize log line: {error}"),
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
