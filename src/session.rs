use crate::engine::{IgnoreReason, MatchState, RollOutcome};
use crate::scheduler::TurnScheduler;
use crate::settings::GameSettings;
use crate::types::{GameEvent, GameMode, MatchSummary, RankingEntry};

/// A match plus the scheduler that drives its bots. Every command resyncs
/// the schedule, so callers only need to call [`GameSession::tick`] regularly.
pub struct GameSession {
    settings: GameSettings,
    scheduler: TurnScheduler,
    state: MatchState,
}

impl GameSession {
    pub fn new(settings: GameSettings, seed: u32) -> Self {
        Self {
            scheduler: TurnScheduler::new(settings.scheduler_options()),
            state: MatchState::new(settings.match_options(), seed),
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn mode(&self) -> GameMode {
        self.scheduler.options().mode
    }

    /// Speed changes apply to the next scheduled roll; everything else waits
    /// for the next `start`.
    pub fn apply_settings(&mut self, settings: GameSettings, now_ms: u64) {
        self.settings = settings;
        self.scheduler.set_speed(settings.speed);
        self.scheduler.sync(&mut self.state, now_ms);
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        self.state.options = self.settings.match_options();
        self.scheduler = TurnScheduler::new(self.settings.scheduler_options());
        let board = self.state.generate_board();
        let started = self
            .state
            .start_match(self.settings.start_players(), board, now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        started
    }

    /// Roll button: the human's turn in player-vs-bot, or the current bot in
    /// bot-vs-bot while auto-play is off.
    pub fn request_roll(&mut self, now_ms: u64) -> RollOutcome {
        if let Some(reason) = self.manual_roll_blocked() {
            return RollOutcome::Ignored(reason);
        }
        let outcome = self.state.roll_random(now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        outcome
    }

    /// Same as `request_roll` with a die value supplied by the caller.
    pub fn roll_with(&mut self, die: u8, now_ms: u64) -> RollOutcome {
        if let Some(reason) = self.manual_roll_blocked() {
            return RollOutcome::Ignored(reason);
        }
        let outcome = self.state.roll(die, now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        outcome
    }

    fn manual_roll_blocked(&self) -> Option<IgnoreReason> {
        if !self.state.is_active() {
            return None;
        }
        self.scheduler
            .wants_auto_roll(&self.state)
            .then_some(IgnoreReason::AutomaticTurn)
    }

    /// Performs the scheduled bot roll once it is due.
    pub fn tick(&mut self, now_ms: u64) -> Option<RollOutcome> {
        let outcome = match self.scheduler.poll_due(&mut self.state, now_ms) {
            Some(_) => Some(self.state.roll_random(now_ms)),
            None => None,
        };
        self.scheduler.sync(&mut self.state, now_ms);
        outcome
    }

    /// When the next automatic roll will happen, if one is scheduled.
    pub fn next_roll_at(&self) -> Option<u64> {
        self.state.scheduled_roll().map(|roll| roll.due_at_ms)
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        let changed = self.state.pause(now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        changed
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        let changed = self.state.resume(now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        changed
    }

    /// Bot-vs-bot only.
    pub fn toggle_auto_play(&mut self, now_ms: u64) -> bool {
        if self.mode() != GameMode::BotVsBot {
            return false;
        }
        let enabled = !self.state.auto_play();
        let changed = self.state.set_auto_play(enabled, now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        changed
    }

    pub fn reset(&mut self, now_ms: u64) -> bool {
        let changed = self.state.reset(now_ms);
        self.scheduler.sync(&mut self.state, now_ms);
        changed
    }

    pub fn return_to_menu(&mut self) {
        self.state.return_to_menu();
    }

    pub fn live_ranking(&self) -> Vec<RankingEntry> {
        self.state.live_ranking()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn summary(&self, now_ms: u64) -> Option<MatchSummary> {
        self.state.build_summary(now_ms)
    }
}
