use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, SecondsFormat, Utc};
use clap::Parser;
use snake_ladder_engine::constants::TICK_MS;
use snake_ladder_engine::engine::{now_ms, IgnoreReason, RollOutcome};
use snake_ladder_engine::session::GameSession;
use snake_ladder_engine::settings::{GameSettings, RawSettings};
use snake_ladder_engine::settings_store::SettingsStore;
use snake_ladder_engine::types::{
    GameEvent, HazardKind, MatchPhase, MatchSummary, Player, RankingEntry, TurnResolved,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

type SharedState = Arc<Mutex<PlayState>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays snakes and ladders in the terminal")]
struct Cli {
    #[arg(long)]
    difficulty: Option<String>,
    /// `pvb` or `bvb`.
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    bots: Option<i64>,
    /// `fast`, `medium`, `slow` or milliseconds.
    #[arg(long)]
    speed: Option<String>,
    /// `random`, `default` or a preset number.
    #[arg(long)]
    map: Option<String>,
    /// `immediate` or `deferred`.
    #[arg(long)]
    policy: Option<String>,
    #[arg(long)]
    seed: Option<u32>,
    /// Store the resulting settings as the new preferences.
    #[arg(long)]
    save: bool,
    /// Forget stored preferences before applying flags.
    #[arg(long)]
    reset_settings: bool,
}

impl Cli {
    fn overrides(&self, base_mode: &str) -> RawSettings {
        let mode = self.mode.clone();
        let effective_mode = mode.as_deref().unwrap_or(base_mode);
        let (pvb_bot_count, bvb_bot_count) = if effective_mode.eq_ignore_ascii_case("bvb") {
            (None, self.bots)
        } else {
            (self.bots, None)
        };
        RawSettings {
            difficulty: self.difficulty.clone(),
            mode,
            pvb_bot_count,
            bvb_bot_count,
            speed: self.speed.clone(),
            map_design: self.map.clone(),
            hazard_policy: self.policy.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Start,
    Roll,
    Pause,
    Resume,
    Auto,
    Reset,
    Rank,
    Board,
    Menu,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Some(Self::Start),
            "roll" | "r" | "" => Some(Self::Roll),
            "pause" | "p" => Some(Self::Pause),
            "resume" | "c" => Some(Self::Resume),
            "auto" | "a" => Some(Self::Auto),
            "reset" => Some(Self::Reset),
            "rank" | "k" => Some(Self::Rank),
            "board" | "b" => Some(Self::Board),
            "menu" | "m" => Some(Self::Menu),
            "help" | "h" | "?" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

struct PlayState {
    session: GameSession,
    summary_shown: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let settings_path = std::env::var("SETTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data/settings.json"));

    let mut store = SettingsStore::new(settings_path);
    if cli.reset_settings {
        if let Err(error) = store.reset_to_default() {
            eprintln!("[play] failed to reset settings: {error}");
        }
    }
    let stored = store.settings().to_raw();
    let base_mode = store.settings().mode.as_str();
    let settings = GameSettings::from_raw(&stored.merged_with(cli.overrides(base_mode)));
    if cli.save {
        match store.save(&settings) {
            Ok(()) => eprintln!("[play] settings saved to {}", store.path().display()),
            Err(error) => eprintln!("[play] failed to save settings: {error}"),
        }
    }

    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    eprintln!(
        "[play] seed {seed}, {} mode, {} difficulty, {} hazards, {}ms between bot rolls",
        settings.mode.as_str(),
        settings.difficulty.as_str(),
        settings.hazard_policy.as_str(),
        settings.delay_ms()
    );

    let state: SharedState = Arc::new(Mutex::new(PlayState {
        session: GameSession::new(settings, seed),
        summary_shown: false,
    }));
    {
        let mut guard = state.lock().await;
        start_match(&mut guard);
    }
    println!("{}", help_text());
    start_tick_loop(state.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                eprintln!("[play] failed to read input: {error}");
                break;
            }
        };
        let Some(command) = Command::parse(&line) else {
            println!("unknown command '{}', type help", line.trim());
            continue;
        };
        if command == Command::Quit {
            break;
        }
        let mut guard = state.lock().await;
        handle_command(&mut guard, command);
    }
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_game(&mut guard);
        }
    });
}

fn tick_game(state: &mut PlayState) {
    if state.session.tick(now_ms()).is_some() {
        flush_events(state);
    }
}

fn start_match(state: &mut PlayState) {
    state.summary_shown = false;
    if state.session.start(now_ms()) {
        flush_events(state);
        print_board(&state.session);
    }
}

fn handle_command(state: &mut PlayState, command: Command) {
    let now = now_ms();
    match command {
        Command::Start => {
            if state.session.state().is_active() {
                println!("a match is already running; use reset or menu");
                return;
            }
            start_match(state);
            return;
        }
        Command::Roll => {
            if let RollOutcome::Ignored(reason) = state.session.request_roll(now) {
                println!("{}", describe_ignore(reason));
            }
        }
        Command::Pause => {
            if !state.session.pause(now) {
                println!("nothing to pause");
            }
        }
        Command::Resume => {
            if !state.session.resume(now) {
                println!("nothing to resume");
            }
        }
        Command::Auto => {
            if !state.session.toggle_auto_play(now) {
                println!("auto play is only available in a running bot-vs-bot match");
            }
        }
        Command::Reset => {
            if state.session.reset(now) {
                state.summary_shown = false;
                flush_events(state);
                print_board(&state.session);
                return;
            }
            println!("no match to reset");
        }
        Command::Rank => {
            print!("{}", render_ranking(&state.session.live_ranking()));
        }
        Command::Board => print_board(&state.session),
        Command::Menu => {
            state.session.return_to_menu();
            state.session.drain_events();
            println!("back at the menu; type start for a new match");
        }
        Command::Help => println!("{}", help_text()),
        Command::Quit => {}
    }
    flush_events(state);
}

fn flush_events(state: &mut PlayState) {
    let events = state.session.drain_events();
    let players = state.session.state().players().to_vec();
    for event in &events {
        if let Some(line) = render_event(event, &players) {
            println!("{line}");
        }
    }
    if state.session.state().phase() == MatchPhase::Finished && !state.summary_shown {
        state.summary_shown = true;
        if let Some(summary) = state.session.summary(now_ms()) {
            print!("{}", render_summary(&summary));
        }
    }
}

fn print_board(session: &GameSession) {
    let board = session.state().board();
    let snakes: Vec<String> = board
        .snakes()
        .map(|(head, tail)| format!("{head}->{tail}"))
        .collect();
    let ladders: Vec<String> = board
        .ladders()
        .map(|(bottom, top)| format!("{bottom}->{top}"))
        .collect();
    println!("snakes:  {}", snakes.join(" "));
    println!("ladders: {}", ladders.join(" "));
}

fn player_name(players: &[Player], index: usize) -> &str {
    players
        .get(index)
        .map(|player| player.name.as_str())
        .unwrap_or("?")
}

fn render_event(event: &GameEvent, players: &[Player]) -> Option<String> {
    let line = match event {
        GameEvent::MatchStarted {
            starting_player, ..
        } => format!(
            "[{}] match started, {} rolls first",
            Local::now().format("%H:%M:%S"),
            player_name(players, *starting_player)
        ),
        GameEvent::TurnResolved(turn) => render_turn(turn, players),
        GameEvent::TurnSkipped { player_index } => {
            format!("{} has finished, skipping", player_name(players, *player_index))
        }
        GameEvent::PlayerFinished {
            player_index,
            rank,
            forced,
        } => {
            if *forced {
                format!("{} is last and takes place {rank}", player_name(players, *player_index))
            } else {
                format!("{} reached 100 in place {rank}!", player_name(players, *player_index))
            }
        }
        GameEvent::MatchPaused => "paused".to_string(),
        GameEvent::MatchResumed => "resumed".to_string(),
        GameEvent::AutoPlayChanged { enabled } => {
            format!("auto play {}", if *enabled { "on" } else { "off" })
        }
        GameEvent::MatchReset => "match reset".to_string(),
        GameEvent::MatchFinished { .. } => return None,
    };
    Some(line)
}

fn render_turn(turn: &TurnResolved, players: &[Player]) -> String {
    let name = player_name(players, turn.player_index);
    let mut line = format!("{name} rolled {}", turn.roll);
    if let Some(pending) = turn.pending_applied {
        line.push_str(&format!(" (first {}->{})", pending.from, pending.to));
    }
    line.push_str(&format!(": {} -> {}", turn.old_position, turn.landed));
    if turn.bounced {
        line.push_str(" bounced");
    }
    if let Some(hazard) = turn.hazard {
        let kind = match hazard.kind {
            HazardKind::Snake => "snake",
            HazardKind::Ladder => "ladder",
        };
        if turn.hazard_deferred {
            line.push_str(&format!(", {kind} to {} next turn", hazard.to));
        } else {
            line.push_str(&format!(", {kind} to {}", hazard.to));
        }
    }
    if let Some(next) = turn.next_player_index {
        line.push_str(&format!(" | next: {}", player_name(players, next)));
    }
    line
}

fn render_ranking(ranking: &[RankingEntry]) -> String {
    let mut text = String::new();
    for entry in ranking {
        let status = match entry.finish_rank {
            Some(rank) => format!("finished #{rank}"),
            None => format!("on {}", entry.position),
        };
        text.push_str(&format!(
            "{:>2}. {:<10} {:<14} rolls {:>3}  snakes {:>2}  ladders {:>2}\n",
            entry.place,
            entry.name,
            status,
            entry.stats.rolls,
            entry.stats.snake_hits,
            entry.stats.ladder_climbs
        ));
    }
    text
}

fn render_summary(summary: &MatchSummary) -> String {
    let mut text = format!(
        "=== match over at {} ({:.1}s, {} rolls) ===\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        summary.duration_ms as f64 / 1_000.0,
        summary.totals.rolls
    );
    if let Some(name) = &summary.winner_name {
        text.push_str(&format!(
            "winner: {name}, {:.2} steps per roll",
            summary.winner_average_steps
        ));
        if let Some(rating) = summary.winner_rating {
            text.push_str(&format!(" ({rating:?})"));
        }
        text.push('\n');
    }
    text.push_str(&render_ranking(&summary.ranking));
    text.push_str("type start for another match, or quit\n");
    text
}

fn describe_ignore(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::NotActive => "no match running; type start",
        IgnoreReason::Paused => "paused; type resume",
        IgnoreReason::Resolving => "still moving, wait a moment",
        IgnoreReason::InvalidDie => "invalid die",
        IgnoreReason::AutomaticTurn => "a bot is rolling this turn",
    }
}

fn help_text() -> &'static str {
    "commands: [r]oll (or enter), [p]ause, resume ([c]), [a]uto, reset, ran[k], [b]oard, [m]enu, [s]tart, [q]uit"
}
