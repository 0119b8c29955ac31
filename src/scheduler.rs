use crate::constants::{get_speed_delay_ms, BOT_OPENING_DELAY_MS};
use crate::engine::{MatchState, ScheduledRoll};
use crate::types::{GameMode, GameSpeed, MatchPhase};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerOptions {
    pub mode: GameMode,
    pub delay_ms: u64,
    /// Delay before a bot's very first roll in player-vs-bot.
    pub opening_delay_ms: u64,
}

impl SchedulerOptions {
    pub fn new(mode: GameMode, speed: GameSpeed) -> Self {
        Self {
            mode,
            delay_ms: get_speed_delay_ms(speed),
            opening_delay_ms: BOT_OPENING_DELAY_MS,
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::new(GameMode::default(), GameSpeed::default())
    }
}

/// Decides when bots roll. It only manages the match's scheduled-roll handle;
/// the caller performs the roll once [`TurnScheduler::poll_due`] hands it out.
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    options: SchedulerOptions,
}

impl TurnScheduler {
    pub fn new(options: SchedulerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    pub fn set_speed(&mut self, speed: GameSpeed) {
        self.options.delay_ms = get_speed_delay_ms(speed);
    }

    /// Bots roll by themselves in player-vs-bot, and in bot-vs-bot only while
    /// auto-play is on.
    pub fn wants_auto_roll(&self, state: &MatchState) -> bool {
        if state.phase() != MatchPhase::Active {
            return false;
        }
        let Some(player) = state.current_player() else {
            return false;
        };
        if !player.is_bot {
            return false;
        }
        match self.options.mode {
            GameMode::PlayerVsBot => true,
            GameMode::BotVsBot => state.auto_play(),
        }
    }

    /// Reconciles the schedule with the match after any transition: keeps a
    /// valid handle, replaces one aimed at the wrong player, drops it when no
    /// automatic roll is wanted. Never leaves more than one outstanding.
    pub fn sync(&self, state: &mut MatchState, now_ms: u64) -> Option<ScheduledRoll> {
        if !self.wants_auto_roll(state) {
            state.cancel_scheduled_roll();
            return None;
        }
        if let Some(existing) = state.scheduled_roll() {
            if existing.player_index == state.current_player_index() {
                return Some(existing);
            }
            state.cancel_scheduled_roll();
        }

        let opening = self.options.mode == GameMode::PlayerVsBot && state.history().is_empty();
        let delay = if opening {
            self.options.opening_delay_ms
        } else {
            self.options.delay_ms
        };
        let due_at_ms = now_ms
            .saturating_add(delay)
            .max(state.resolving_until_ms());
        state.schedule_roll(due_at_ms)
    }

    pub fn poll_due(&self, state: &mut MatchState, now_ms: u64) -> Option<ScheduledRoll> {
        state.take_due_roll(now_ms)
    }
}
