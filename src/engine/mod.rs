use crate::board::{generate_board, Board};
use crate::constants::{FINAL_CELL, ROLL_RESOLVE_MS, START_CELL};
use crate::movement::resolve;
use crate::ranking::rank;
use crate::rng::Rng;
use crate::types::{
    Difficulty, GameEvent, HazardPolicy, MapDesign, MatchPhase, MatchSummary, Player,
    RankingEntry, RollRecord, StartPlayer, TimelineEvent, TurnResolved,
};

mod finish_system;
mod stats;
mod utils;

pub use self::stats::{performance_rating, MatchStats};
pub use self::utils::now_ms;

use self::utils::{describe_hazard, next_index};

#[derive(Clone, Debug)]
pub struct MatchOptions {
    pub difficulty: Difficulty,
    pub map_design: MapDesign,
    pub hazard_policy: HazardPolicy,
    /// Rolls arriving sooner than this after an accepted roll are ignored.
    pub roll_resolve_ms: u64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            map_design: MapDesign::default(),
            hazard_policy: HazardPolicy::default(),
            roll_resolve_ms: ROLL_RESOLVE_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    NotActive,
    Paused,
    Resolving,
    InvalidDie,
    /// Manual roll on a turn the scheduler rolls for.
    AutomaticTurn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RollOutcome {
    Ignored(IgnoreReason),
    /// The current player had already finished; the turn moved on without a move.
    Skipped { player_index: usize },
    Resolved(TurnResolved),
}

impl RollOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Handle for the one automatic roll a match may have outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledRoll {
    pub id: u64,
    pub player_index: usize,
    pub due_at_ms: u64,
}

/// Everything about one match. Only one roll is processed at a time and every
/// transition out of `Active` drops the outstanding scheduled roll.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub options: MatchOptions,

    board: Board,
    rng: Rng,
    players: Vec<Player>,
    current_player_index: usize,
    phase: MatchPhase,
    auto_play: bool,
    history: Vec<RollRecord>,
    events: Vec<GameEvent>,
    timeline: Vec<TimelineEvent>,

    started_at_ms: u64,
    finished_at_ms: Option<u64>,
    resolving_until_ms: u64,
    scheduled_roll: Option<ScheduledRoll>,
    next_schedule_id: u64,
}

impl MatchState {
    pub fn new(options: MatchOptions, seed: u32) -> Self {
        Self {
            options,
            board: Board::empty(),
            rng: Rng::new(seed),
            players: Vec::new(),
            current_player_index: 0,
            phase: MatchPhase::Idle,
            auto_play: false,
            history: Vec::new(),
            events: Vec::new(),
            timeline: Vec::new(),
            started_at_ms: 0,
            finished_at_ms: None,
            resolving_until_ms: 0,
            scheduled_roll: None,
            next_schedule_id: 1,
        }
    }

    /// A fresh board for the configured difficulty and map design.
    pub fn generate_board(&mut self) -> Board {
        let seed = self.rng.derive_seed();
        generate_board(self.options.difficulty, self.options.map_design, seed)
    }

    pub fn start_match(&mut self, players: Vec<StartPlayer>, board: Board, now_ms: u64) -> bool {
        self.cancel_scheduled_roll();
        if players.is_empty() {
            return false;
        }
        self.players = players
            .into_iter()
            .map(|start| Player {
                name: start.name,
                is_bot: start.is_bot,
                position: START_CELL,
                finished: false,
                finish_rank: None,
                pending_effect: None,
            })
            .collect();
        self.board = board;
        self.begin(now_ms);
        true
    }

    /// Puts every player back on the start cell with a new board and a new
    /// starting player.
    pub fn reset(&mut self, now_ms: u64) -> bool {
        if self.phase == MatchPhase::Idle || self.players.is_empty() {
            return false;
        }
        self.cancel_scheduled_roll();
        self.events.push(GameEvent::MatchReset);
        for player in &mut self.players {
            player.position = START_CELL;
            player.finished = false;
            player.finish_rank = None;
            player.pending_effect = None;
        }
        self.board = self.generate_board();
        self.begin(now_ms);
        true
    }

    pub fn return_to_menu(&mut self) {
        self.cancel_scheduled_roll();
        self.players.clear();
        self.board = Board::empty();
        self.history.clear();
        self.events.clear();
        self.timeline.clear();
        self.started_at_ms = 0;
        self.resolving_until_ms = 0;
        self.auto_play = false;
        self.current_player_index = 0;
        self.finished_at_ms = None;
        self.phase = MatchPhase::Idle;
    }

    fn begin(&mut self, now_ms: u64) {
        self.history.clear();
        self.timeline.clear();
        self.started_at_ms = now_ms;
        self.finished_at_ms = None;
        self.resolving_until_ms = 0;
        self.auto_play = false;
        self.current_player_index = self.rng.pick_index(self.players.len());
        self.phase = MatchPhase::Active;

        self.events.push(GameEvent::MatchStarted {
            starting_player: self.current_player_index,
            snakes: self.board.snake_count(),
            ladders: self.board.ladder_count(),
            policy: self.options.hazard_policy,
        });
        self.push_timeline(
            now_ms,
            format!(
                "match started: {} snakes, {} ladders, {} rolls first",
                self.board.snake_count(),
                self.board.ladder_count(),
                self.players[self.current_player_index].name
            ),
        );
    }

    /// Rolls a die from the match generator. Used for bots and for humans who
    /// don't bring their own dice.
    pub fn roll_die(&mut self) -> u8 {
        self.rng.die()
    }

    /// Moves the current player by `die`.
    ///
    /// Calls outside an unpaused active match, with a face outside 1..=6, or
    /// while the previous roll is still resolving change nothing.
    pub fn roll(&mut self, die: u8, now_ms: u64) -> RollOutcome {
        if let Some(reason) = self.roll_blocked(now_ms) {
            return RollOutcome::Ignored(reason);
        }
        if !(1..=6).contains(&die) {
            return RollOutcome::Ignored(IgnoreReason::InvalidDie);
        }
        self.apply_roll(die, now_ms)
    }

    /// Rolls the match die for the current player. The die is only drawn once
    /// the roll is accepted, so ignored calls leave the dice sequence alone.
    pub fn roll_random(&mut self, now_ms: u64) -> RollOutcome {
        if let Some(reason) = self.roll_blocked(now_ms) {
            return RollOutcome::Ignored(reason);
        }
        let die = self.rng.die();
        self.apply_roll(die, now_ms)
    }

    /// Why a roll at `now_ms` would be ignored, die value aside.
    pub fn roll_blocked(&self, now_ms: u64) -> Option<IgnoreReason> {
        match self.phase {
            MatchPhase::Active => {}
            MatchPhase::Paused => return Some(IgnoreReason::Paused),
            MatchPhase::Idle | MatchPhase::Finished => return Some(IgnoreReason::NotActive),
        }
        if now_ms < self.resolving_until_ms {
            return Some(IgnoreReason::Resolving);
        }
        None
    }

    fn apply_roll(&mut self, die: u8, now_ms: u64) -> RollOutcome {
        self.cancel_scheduled_roll();

        let index = self.current_player_index;
        if self.players[index].finished {
            self.events.push(GameEvent::TurnSkipped {
                player_index: index,
            });
            self.push_timeline(
                now_ms,
                format!("{} already finished, turn skipped", self.players[index].name),
            );
            self.advance_to_next_unfinished(now_ms);
            return RollOutcome::Skipped {
                player_index: index,
            };
        }

        let old_position = self.players[index].position;
        let pending_applied = self.players[index].pending_effect.take();
        if let Some(pending) = pending_applied {
            self.players[index].position = pending.to;
            self.push_timeline(
                now_ms,
                format!(
                    "{} takes the waiting {}",
                    self.players[index].name,
                    describe_hazard(&pending)
                ),
            );
        }

        let from = self.players[index].position;
        let movement = resolve(from, die, &self.board);
        let hazard_deferred =
            movement.hazard.is_some() && self.options.hazard_policy == HazardPolicy::Deferred;
        let new_position = if hazard_deferred {
            self.players[index].pending_effect = movement.hazard;
            movement.landed
        } else {
            movement.final_position()
        };
        self.players[index].position = new_position;
        self.history.push(RollRecord {
            player_index: index,
            roll: die,
            from,
            landed: movement.landed,
            hazard: movement.hazard,
        });
        self.resolving_until_ms = now_ms.saturating_add(self.options.roll_resolve_ms);

        let mut label = format!(
            "{} rolled {}: {} -> {}",
            self.players[index].name, die, from, movement.landed
        );
        if movement.bounced {
            label.push_str(" (bounced off 100)");
        }
        if let Some(hazard) = movement.hazard {
            let suffix = if hazard_deferred { ", waits a round" } else { "" };
            label.push_str(&format!(", {}{}", describe_hazard(&hazard), suffix));
        }
        self.push_timeline(now_ms, label);

        // Turn resolution goes ahead of any finish events it causes.
        let event_slot = self.events.len();
        let rank_updates = if new_position == FINAL_CELL {
            self.handle_player_finish(index, now_ms)
        } else {
            self.advance_to_next_unfinished(now_ms);
            Vec::new()
        };
        let next_player_index = match self.phase {
            MatchPhase::Active | MatchPhase::Paused => Some(self.current_player_index),
            MatchPhase::Idle | MatchPhase::Finished => None,
        };

        let resolved = TurnResolved {
            player_index: index,
            roll: die,
            old_position,
            pending_applied,
            landed: movement.landed,
            bounced: movement.bounced,
            hazard: movement.hazard,
            hazard_deferred,
            new_position,
            rank_updates,
            next_player_index,
        };
        self.events
            .insert(event_slot, GameEvent::TurnResolved(resolved.clone()));
        RollOutcome::Resolved(resolved)
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.phase != MatchPhase::Active {
            return false;
        }
        self.cancel_scheduled_roll();
        self.phase = MatchPhase::Paused;
        self.events.push(GameEvent::MatchPaused);
        self.push_timeline(now_ms, "match paused".to_string());
        true
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.phase != MatchPhase::Paused {
            return false;
        }
        self.phase = MatchPhase::Active;
        self.events.push(GameEvent::MatchResumed);
        self.push_timeline(now_ms, "match resumed".to_string());
        true
    }

    /// Turning auto-play off drops any roll already scheduled.
    pub fn set_auto_play(&mut self, enabled: bool, now_ms: u64) -> bool {
        if self.auto_play == enabled {
            return false;
        }
        if enabled && !self.is_active() {
            return false;
        }
        self.auto_play = enabled;
        if !enabled {
            self.cancel_scheduled_roll();
        }
        self.events.push(GameEvent::AutoPlayChanged { enabled });
        self.push_timeline(
            now_ms,
            format!("auto play {}", if enabled { "on" } else { "off" }),
        );
        true
    }

    /// Registers the automatic roll for the current player. Refused when one
    /// is already outstanding or the match is not accepting rolls.
    pub fn schedule_roll(&mut self, due_at_ms: u64) -> Option<ScheduledRoll> {
        if self.phase != MatchPhase::Active || self.scheduled_roll.is_some() {
            return None;
        }
        let scheduled = ScheduledRoll {
            id: self.next_schedule_id,
            player_index: self.current_player_index,
            due_at_ms,
        };
        self.next_schedule_id += 1;
        self.scheduled_roll = Some(scheduled);
        Some(scheduled)
    }

    pub fn cancel_scheduled_roll(&mut self) -> Option<ScheduledRoll> {
        self.scheduled_roll.take()
    }

    pub fn scheduled_roll(&self) -> Option<ScheduledRoll> {
        self.scheduled_roll
    }

    /// Claims the scheduled roll once it is due. A handle whose player is no
    /// longer on turn is discarded instead of returned.
    pub fn take_due_roll(&mut self, now_ms: u64) -> Option<ScheduledRoll> {
        let due = self.scheduled_roll.filter(|roll| roll.due_at_ms <= now_ms)?;
        self.scheduled_roll = None;
        if self.phase != MatchPhase::Active || due.player_index != self.current_player_index {
            return None;
        }
        Some(due)
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// A match is in progress, paused or not.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, MatchPhase::Active | MatchPhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == MatchPhase::Paused
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> Option<&Player> {
        if !self.is_active() {
            return None;
        }
        self.players.get(self.current_player_index)
    }

    pub fn history(&self) -> &[RollRecord] {
        &self.history
    }

    pub fn timeline(&self) -> &[TimelineEvent] {
        &self.timeline
    }

    pub fn resolving_until_ms(&self) -> u64 {
        self.resolving_until_ms
    }

    pub fn stats(&self) -> MatchStats {
        MatchStats::from_history(self.players.len(), &self.history)
    }

    pub fn live_ranking(&self) -> Vec<RankingEntry> {
        rank(&self.players, &self.stats().players)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_summary(&self, now_ms: u64) -> Option<MatchSummary> {
        if self.phase == MatchPhase::Idle || self.players.is_empty() {
            return None;
        }
        let stats = self.stats();
        let ranking = rank(&self.players, &stats.players);
        let winner = ranking.first().filter(|entry| entry.finished);
        let end_ms = self.finished_at_ms.unwrap_or(now_ms);

        Some(MatchSummary {
            duration_ms: end_ms.saturating_sub(self.started_at_ms),
            winner_index: winner.map(|entry| entry.player_index),
            winner_name: winner.map(|entry| entry.name.clone()),
            winner_average_steps: winner
                .map(|entry| MatchStats::average_steps(&entry.stats))
                .unwrap_or(0.0),
            winner_rating: winner.and_then(|entry| performance_rating(&entry.stats)),
            totals: stats.totals,
            ranking,
            timeline: self.timeline.clone(),
        })
    }

    fn push_timeline(&mut self, now_ms: u64, label: String) {
        self.timeline.push(TimelineEvent {
            at_ms: now_ms.saturating_sub(self.started_at_ms),
            label,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::board::Board;
    use crate::engine::{IgnoreReason, MatchOptions, MatchState, RollOutcome};
    use crate::types::{
        GameEvent, Hazard, HazardKind, HazardPolicy, MapDesign, MatchPhase, StartPlayer,
    };

    fn make_players(count: usize) -> Vec<StartPlayer> {
        (0..count)
            .map(|idx| StartPlayer {
                name: format!("P{}", idx + 1),
                is_bot: true,
            })
            .collect()
    }

    fn options(policy: HazardPolicy) -> MatchOptions {
        MatchOptions {
            hazard_policy: policy,
            roll_resolve_ms: 0,
            ..MatchOptions::default()
        }
    }

    /// Started match on `board` with player 0 to move.
    fn started(count: usize, board: Board, policy: HazardPolicy) -> MatchState {
        let mut engine = MatchState::new(options(policy), 7);
        assert!(engine.start_match(make_players(count), board, 0));
        engine.current_player_index = 0;
        engine.drain_events();
        engine
    }

    fn resolved(outcome: RollOutcome) -> crate::types::TurnResolved {
        match outcome {
            RollOutcome::Resolved(turn) => turn,
            other => panic!("expected resolved roll, got {other:?}"),
        }
    }

    #[test]
    fn start_match_puts_everyone_on_start_and_picks_a_starter() {
        for seed in 0..50u32 {
            let mut engine = MatchState::new(MatchOptions::default(), seed);
            assert_eq!(engine.phase(), MatchPhase::Idle);
            let board = engine.generate_board();
            assert!(engine.start_match(make_players(4), board, 1_000));
            assert_eq!(engine.phase(), MatchPhase::Active);
            assert!(engine.current_player_index() < 4);
            assert!(engine
                .players()
                .iter()
                .all(|p| p.position == 1 && !p.finished && p.finish_rank.is_none()));
            assert!(matches!(
                engine.drain_events().first(),
                Some(GameEvent::MatchStarted { .. })
            ));
        }
    }

    #[test]
    fn start_match_without_players_stays_idle() {
        let mut engine = MatchState::new(MatchOptions::default(), 1);
        assert!(!engine.start_match(Vec::new(), Board::empty(), 0));
        assert_eq!(engine.phase(), MatchPhase::Idle);
        assert_eq!(
            engine.roll(3, 0),
            RollOutcome::Ignored(IgnoreReason::NotActive)
        );
    }

    #[test]
    fn plain_roll_moves_and_passes_the_turn() {
        let mut engine = started(3, Board::empty(), HazardPolicy::Immediate);
        let turn = resolved(engine.roll(4, 10));
        assert_eq!(turn.player_index, 0);
        assert_eq!(turn.old_position, 1);
        assert_eq!(turn.new_position, 5);
        assert_eq!(turn.next_player_index, Some(1));
        assert_eq!(engine.current_player_index(), 1);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn turn_order_wraps() {
        let mut engine = started(2, Board::empty(), HazardPolicy::Immediate);
        engine.roll(1, 0);
        engine.roll(1, 0);
        assert_eq!(engine.current_player_index(), 0);
    }

    #[test]
    fn invalid_calls_are_no_ops() {
        let mut engine = MatchState::new(
            MatchOptions {
                roll_resolve_ms: 900,
                ..MatchOptions::default()
            },
            3,
        );
        assert!(engine.start_match(make_players(2), Board::empty(), 0));
        assert_eq!(
            engine.roll(0, 0),
            RollOutcome::Ignored(IgnoreReason::InvalidDie)
        );
        assert_eq!(
            engine.roll(7, 0),
            RollOutcome::Ignored(IgnoreReason::InvalidDie)
        );
        assert!(!engine.roll(3, 0).is_ignored());
        let current = engine.current_player_index();
        assert_eq!(
            engine.roll(3, 899),
            RollOutcome::Ignored(IgnoreReason::Resolving)
        );
        assert_eq!(engine.current_player_index(), current);
        assert!(engine.pause(900));
        assert_eq!(
            engine.roll(3, 1_000),
            RollOutcome::Ignored(IgnoreReason::Paused)
        );
        assert!(engine.resume(1_000));
        assert!(!engine.roll(3, 1_000).is_ignored());
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn immediate_policy_takes_the_snake_in_the_same_turn() {
        let mut engine = started(2, Board::from_pairs(&[(16, 6)], &[]), HazardPolicy::Immediate);
        engine.players[0].position = 10;
        let turn = resolved(engine.roll(6, 0));
        assert_eq!(turn.landed, 16);
        assert_eq!(
            turn.hazard,
            Some(Hazard {
                kind: HazardKind::Snake,
                from: 16,
                to: 6
            })
        );
        assert!(!turn.hazard_deferred);
        assert_eq!(turn.new_position, 6);
        assert_eq!(engine.players()[0].position, 6);
        assert_eq!(engine.players()[0].pending_effect, None);
        assert_eq!(engine.stats().players[0].snake_hits, 1);
    }

    #[test]
    fn deferred_policy_rests_on_the_snake_for_a_round() {
        let mut engine = started(2, Board::from_pairs(&[(16, 6)], &[]), HazardPolicy::Deferred);
        engine.players[0].position = 10;
        let turn = resolved(engine.roll(6, 0));
        assert!(turn.hazard_deferred);
        assert_eq!(turn.new_position, 16);
        assert_eq!(engine.players()[0].position, 16);
        assert_eq!(
            engine.players()[0].pending_effect.map(|hazard| hazard.to),
            Some(6)
        );

        resolved(engine.roll(2, 0));
        assert_eq!(engine.players()[0].position, 16);

        let next = resolved(engine.roll(3, 0));
        assert_eq!(next.old_position, 16);
        assert_eq!(next.pending_applied.map(|hazard| hazard.to), Some(6));
        assert_eq!(next.new_position, 9);
        assert_eq!(engine.players()[0].pending_effect, None);
    }

    #[test]
    fn pause_and_resume_leave_pending_effect_alone() {
        let mut engine = started(2, Board::from_pairs(&[], &[(5, 30)]), HazardPolicy::Deferred);
        resolved(engine.roll(4, 0));
        assert!(engine.pause(10));
        assert!(!engine.pause(11));
        assert!(engine.resume(12));
        assert!(!engine.resume(13));
        assert_eq!(engine.current_player_index(), 1);
        assert_eq!(engine.players()[0].position, 5);
        assert_eq!(
            engine.players()[0].pending_effect.map(|hazard| hazard.to),
            Some(30)
        );
    }

    #[test]
    fn third_finisher_gets_rank_three() {
        let mut engine = started(4, Board::empty(), HazardPolicy::Immediate);
        for (index, rank) in [(1usize, 1u32), (2, 2)] {
            engine.players[index].position = 100;
            engine.players[index].finished = true;
            engine.players[index].finish_rank = Some(rank);
        }
        engine.players[0].position = 96;
        let turn = resolved(engine.roll(4, 0));
        assert_eq!(turn.rank_updates.len(), 2);
        assert_eq!(turn.rank_updates[0].player_index, 0);
        assert_eq!(turn.rank_updates[0].rank, 3);
        assert!(!turn.rank_updates[0].forced);
        assert_eq!(turn.rank_updates[1].player_index, 3);
        assert_eq!(turn.rank_updates[1].rank, 4);
        assert!(turn.rank_updates[1].forced);
        assert_eq!(engine.phase(), MatchPhase::Finished);
    }

    #[test]
    fn last_player_is_finished_without_rolling() {
        let mut engine = started(3, Board::empty(), HazardPolicy::Immediate);
        engine.players[0].position = 95;
        let first = resolved(engine.roll(5, 0));
        assert_eq!(first.rank_updates.len(), 1);
        assert_eq!(first.next_player_index, Some(1));
        assert_eq!(engine.phase(), MatchPhase::Active);

        engine.players[1].position = 98;
        let second = resolved(engine.roll(2, 0));
        assert_eq!(second.next_player_index, None);
        assert_eq!(engine.phase(), MatchPhase::Finished);

        let third = &engine.players()[2];
        assert!(third.finished);
        assert_eq!(third.finish_rank, Some(3));
        assert_eq!(third.position, 1);
        assert_eq!(
            engine
                .history()
                .iter()
                .filter(|record| record.player_index == 2)
                .count(),
            0
        );

        let events = engine.drain_events();
        let finished_events = events
            .iter()
            .filter(|event| matches!(event, GameEvent::MatchFinished { .. }))
            .count();
        assert_eq!(finished_events, 1);
        let resolved_at = events
            .iter()
            .rposition(|event| matches!(event, GameEvent::TurnResolved(_)))
            .expect("turn resolved event");
        let finished_at = events
            .iter()
            .position(|event| matches!(event, GameEvent::MatchFinished { .. }))
            .expect("match finished event");
        assert!(resolved_at < finished_at);

        assert_eq!(
            engine.roll(3, 0),
            RollOutcome::Ignored(IgnoreReason::NotActive)
        );
    }

    #[test]
    fn finished_players_are_skipped_when_passing_the_turn() {
        let mut engine = started(3, Board::empty(), HazardPolicy::Immediate);
        engine.players[1].position = 100;
        engine.players[1].finished = true;
        engine.players[1].finish_rank = Some(1);
        resolved(engine.roll(2, 0));
        assert_eq!(engine.current_player_index(), 2);
    }

    #[test]
    fn stale_roll_for_a_finished_player_only_advances() {
        let mut engine = started(3, Board::empty(), HazardPolicy::Immediate);
        engine.players[0].position = 100;
        engine.players[0].finished = true;
        engine.players[0].finish_rank = Some(1);
        assert_eq!(
            engine.roll(5, 0),
            RollOutcome::Skipped { player_index: 0 }
        );
        assert_eq!(engine.current_player_index(), 1);
        assert_eq!(engine.players()[0].position, 100);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn reset_clears_progress_and_scheduled_roll() {
        let mut engine = started(3, Board::empty(), HazardPolicy::Immediate);
        engine.players[0].position = 97;
        resolved(engine.roll(3, 0));
        assert!(engine.players()[0].finished);
        assert!(engine.set_auto_play(true, 0));
        assert!(engine.schedule_roll(2_500).is_some());

        assert!(engine.reset(5_000));
        assert_eq!(engine.phase(), MatchPhase::Active);
        assert_eq!(engine.scheduled_roll(), None);
        assert!(!engine.auto_play());
        assert!(engine.history().is_empty());
        assert!(engine.players().iter().all(|p| p.position == 1
            && !p.finished
            && p.finish_rank.is_none()
            && p.pending_effect.is_none()));
        let events = engine.drain_events();
        assert!(matches!(events[events.len() - 2], GameEvent::MatchReset));
        assert!(matches!(
            events[events.len() - 1],
            GameEvent::MatchStarted { .. }
        ));
    }

    #[test]
    fn schedule_handle_is_unique_and_dropped_on_pause() {
        let mut engine = started(2, Board::empty(), HazardPolicy::Immediate);
        let first = engine.schedule_roll(1_000).expect("first schedule");
        assert_eq!(engine.schedule_roll(1_000), None);
        assert_eq!(engine.take_due_roll(999), None);
        assert_eq!(engine.scheduled_roll(), Some(first));
        assert!(engine.pause(500));
        assert_eq!(engine.scheduled_roll(), None);
        assert_eq!(engine.schedule_roll(1_000), None);
        assert!(engine.resume(600));
        let second = engine.schedule_roll(1_600).expect("second schedule");
        assert_ne!(first.id, second.id);
        assert_eq!(engine.take_due_roll(1_600), Some(second));
        assert_eq!(engine.scheduled_roll(), None);
    }

    #[test]
    fn due_roll_for_a_player_no_longer_on_turn_is_discarded() {
        let mut engine = started(2, Board::empty(), HazardPolicy::Immediate);
        engine.schedule_roll(1_000);
        engine.current_player_index = 1;
        assert_eq!(engine.take_due_roll(1_000), None);
        assert_eq!(engine.scheduled_roll(), None);
    }

    #[test]
    fn auto_play_needs_a_live_match_and_turning_it_off_cancels() {
        let mut engine = MatchState::new(options(HazardPolicy::Immediate), 5);
        assert!(!engine.set_auto_play(true, 0));
        assert!(engine.start_match(make_players(2), Board::empty(), 0));
        assert!(engine.set_auto_play(true, 0));
        assert!(!engine.set_auto_play(true, 0));
        engine.schedule_roll(100);
        assert!(engine.set_auto_play(false, 50));
        assert_eq!(engine.scheduled_roll(), None);
    }

    #[test]
    fn same_seed_produces_same_match() {
        let play = |seed: u32| {
            let mut engine = MatchState::new(
                MatchOptions {
                    map_design: MapDesign::Random,
                    roll_resolve_ms: 0,
                    ..MatchOptions::default()
                },
                seed,
            );
            let board = engine.generate_board();
            engine.start_match(make_players(4), board, 0);
            let mut guard = 0;
            while engine.phase() == MatchPhase::Active && guard < 10_000 {
                let die = engine.roll_die();
                engine.roll(die, guard);
                guard += 1;
            }
            engine.history().to_vec()
        };
        assert_eq!(play(424_242), play(424_242));
    }

    #[test]
    fn random_matches_always_end_with_contiguous_ranks() {
        for seed in 0..200u32 {
            let policy = if seed % 2 == 0 {
                HazardPolicy::Immediate
            } else {
                HazardPolicy::Deferred
            };
            let mut engine = MatchState::new(options(policy), seed);
            let board = engine.generate_board();
            let count = 2 + (seed as usize % 4);
            engine.start_match(make_players(count), board, 0);

            let mut guard = 0u64;
            while engine.phase() == MatchPhase::Active {
                let die = engine.roll_die();
                engine.roll(die, guard);
                for player in engine.players() {
                    assert!((1..=100).contains(&player.position));
                }
                guard += 1;
                assert!(guard < 100_000, "seed {seed} did not finish");
            }

            let mut ranks: Vec<u32> = engine
                .players()
                .iter()
                .map(|p| p.finish_rank.expect("every player ranked"))
                .collect();
            ranks.sort_unstable();
            assert_eq!(ranks, (1..=count as u32).collect::<Vec<_>>());
            assert_eq!(engine.live_ranking()[0].finish_rank, Some(1));
        }
    }

    #[test]
    fn turn_never_lands_on_a_finished_player_in_play() {
        for seed in 0..100u32 {
            let mut engine = MatchState::new(options(HazardPolicy::Immediate), seed);
            let board = engine.generate_board();
            engine.start_match(make_players(4), board, 0);

            let mut now = 0u64;
            while engine.phase() == MatchPhase::Active {
                if let Some(player) = engine.current_player() {
                    assert!(!player.finished, "seed {seed}: finished player on turn");
                }
                let outcome = engine.roll_random(now);
                assert!(!matches!(outcome, RollOutcome::Skipped { .. }));
                now += 1;
                assert!(now < 100_000, "seed {seed} did not finish");
            }
            assert!(!engine
                .drain_events()
                .iter()
                .any(|event| matches!(event, GameEvent::TurnSkipped { .. })));
        }
    }

    #[test]
    fn summary_reports_winner_and_derived_totals() {
        let mut engine = started(2, Board::from_pairs(&[(40, 20)], &[(8, 30)]), HazardPolicy::Immediate);
        resolved(engine.roll(6, 100)); // P1 7
        resolved(engine.roll(6, 200)); // P2 7
        resolved(engine.roll(1, 300)); // P1 8 -> 30
        engine.players[1].position = 95;
        resolved(engine.roll(5, 400)); // P2 100
        assert_eq!(engine.phase(), MatchPhase::Finished);

        let summary = engine.build_summary(10_000).expect("summary");
        assert_eq!(summary.duration_ms, 400);
        assert_eq!(summary.winner_index, Some(1));
        assert_eq!(summary.winner_name.as_deref(), Some("P2"));
        assert_eq!(summary.totals.rolls, 4);
        assert_eq!(summary.totals.ladder_climbs, 1);
        assert_eq!(summary.ranking[1].stats.steps, 7);
        assert!((summary.winner_average_steps - 5.5).abs() < 1e-9);
        assert!(!summary.timeline.is_empty());
    }

    #[test]
    fn return_to_menu_discards_players() {
        let mut engine = started(2, Board::empty(), HazardPolicy::Immediate);
        engine.schedule_roll(10);
        engine.return_to_menu();
        assert_eq!(engine.phase(), MatchPhase::Idle);
        assert!(engine.players().is_empty());
        assert_eq!(engine.scheduled_roll(), None);
        assert!(engine.live_ranking().is_empty());
        assert!(engine.build_summary(0).is_none());
        assert!(!engine.reset(0));
        assert!(engine.drain_events().is_empty());
        assert!(engine.timeline().is_empty());
    }

    #[test]
    fn return_to_menu_drops_undrained_events() {
        let mut engine = started(2, Board::empty(), HazardPolicy::Immediate);
        resolved(engine.roll(3, 0));
        assert!(!engine.timeline().is_empty());

        engine.return_to_menu();
        assert!(engine.drain_events().is_empty());
        assert!(engine.timeline().is_empty());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn ignored_random_rolls_leave_the_dice_sequence_alone() {
        let mut plain = started(2, Board::empty(), HazardPolicy::Immediate);
        let mut interrupted = plain.clone();
        interrupted.options.roll_resolve_ms = 500;

        let first = resolved(interrupted.roll_random(0)).roll;
        assert_eq!(
            interrupted.roll_random(100),
            RollOutcome::Ignored(IgnoreReason::Resolving)
        );
        assert!(interrupted.pause(200));
        assert_eq!(
            interrupted.roll_random(300),
            RollOutcome::Ignored(IgnoreReason::Paused)
        );
        assert!(interrupted.resume(400));

        let mut expected = vec![resolved(plain.roll_random(0)).roll];
        let mut actual = vec![first];
        for step in 1..6u64 {
            expected.push(resolved(plain.roll_random(step * 1_000)).roll);
            actual.push(resolved(interrupted.roll_random(step * 1_000)).roll);
        }
        assert_eq!(actual, expected);
    }
}
