use super::*;
use crate::types::RankUpdate;

impl MatchState {
    /// Ranks `index`, who just reached the final cell, and decides what
    /// happens to the rest of the match.
    pub(super) fn handle_player_finish(&mut self, index: usize, now_ms: u64) -> Vec<RankUpdate> {
        let mut updates = Vec::new();
        if !self.players[index].finished {
            updates.push(self.assign_finish_rank(index, false, now_ms));
        }

        let unfinished: Vec<usize> = (0..self.players.len())
            .filter(|&idx| !self.players[idx].finished)
            .collect();
        match unfinished.as_slice() {
            [] => self.finish_match(now_ms),
            [last] => {
                // A single runner left gets last place without playing alone.
                updates.push(self.assign_finish_rank(*last, true, now_ms));
                self.finish_match(now_ms);
            }
            _ => self.advance_to_next_unfinished(now_ms),
        }
        updates
    }

    /// Hands the turn to the next player who has not finished, wrapping around.
    /// Ends the match if there is nobody left. Since finished players are
    /// never handed the turn, the finished-player branch in `roll` is only a
    /// fallback.
    pub(super) fn advance_to_next_unfinished(&mut self, now_ms: u64) {
        let len = self.players.len();
        let mut index = self.current_player_index;
        for _ in 0..len {
            index = next_index(index, len);
            if !self.players[index].finished {
                self.current_player_index = index;
                return;
            }
        }
        self.push_timeline(now_ms, "every player has finished".to_string());
        self.finish_match(now_ms);
    }

    pub(super) fn finish_match(&mut self, now_ms: u64) {
        if self.phase == MatchPhase::Finished {
            return;
        }
        self.cancel_scheduled_roll();
        self.phase = MatchPhase::Finished;
        self.finished_at_ms = Some(now_ms);
        self.auto_play = false;

        let ranking = self.live_ranking();
        if let Some(winner) = ranking.first() {
            self.push_timeline(now_ms, format!("match finished, {} wins", winner.name));
        }
        self.events.push(GameEvent::MatchFinished { ranking });
    }

    fn assign_finish_rank(&mut self, index: usize, forced: bool, now_ms: u64) -> RankUpdate {
        let rank = self.finished_count() as u32 + 1;
        let player = &mut self.players[index];
        player.finished = true;
        player.finish_rank = Some(rank);
        let label = if forced {
            format!("{} is the last one left and takes place {rank}", player.name)
        } else {
            format!("{} reached 100 in place {rank}", player.name)
        };

        self.events.push(GameEvent::PlayerFinished {
            player_index: index,
            rank,
            forced,
        });
        self.push_timeline(now_ms, label);
        RankUpdate {
            player_index: index,
            rank,
            forced,
        }
    }

    fn finished_count(&self) -> usize {
        self.players.iter().filter(|player| player.finished).count()
    }
}
